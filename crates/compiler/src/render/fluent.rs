//! 블록 문법 렌더러
//!
//! ```text
//! <match **>
//!   @type s3
//!   @id out_s3
//!   s3_bucket logs
//!   <buffer tag,time>
//!     @type file
//!   </buffer>
//! </match>
//! ```
//!
//! - 여는 줄: `<{directive}>` 또는 `<{directive} {tag}>`
//! - 의사 파라미터 `@type`, `@id`, `@label` 순서
//! - 일반 파라미터는 키 사전순, 값이 비어 있으면 키만 출력
//! - 중첩 섹션은 한 단계 더 들여쓰기, 기존 순서 유지
//! - 닫는 줄: `</{directive}>`

use std::io::{self, Write};

use logweave_core::{Directive, LogweaveError, RenderError};

use super::{Renderer, record_render};

/// 형식 이름
pub const FORMAT_NAME: &str = "fluent";

/// 블록 문법 렌더러
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluentRenderer {
    indent: usize,
}

impl FluentRenderer {
    /// 단계당 `indent`칸 들여쓰는 렌더러를 생성합니다.
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    fn write_directive(
        &self,
        directive: &dyn Directive,
        depth: usize,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let pad = " ".repeat(self.indent * depth);
        let inner = " ".repeat(self.indent * (depth + 1));
        let meta = directive.meta();

        match &meta.tag {
            Some(tag) => writeln!(out, "{pad}<{} {tag}>", meta.directive)?,
            None => writeln!(out, "{pad}<{}>", meta.directive)?,
        }

        let pseudo = [
            ("@type", &meta.plugin_type),
            ("@id", &meta.id),
            ("@label", &meta.label),
        ];
        for (key, value) in pseudo {
            if let Some(value) = value {
                writeln!(out, "{inner}{key} {value}")?;
            }
        }

        for (key, value) in directive.params() {
            if value.is_empty() {
                writeln!(out, "{inner}{key}")?;
            } else {
                writeln!(out, "{inner}{key} {value}")?;
            }
        }

        for section in directive.sections() {
            self.write_directive(section.as_ref(), depth + 1, out)?;
        }

        writeln!(out, "{pad}</{}>", meta.directive)
    }
}

impl Default for FluentRenderer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Renderer for FluentRenderer {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn render(
        &self,
        directives: &[Box<dyn Directive>],
        out: &mut dyn Write,
    ) -> Result<(), LogweaveError> {
        for directive in directives {
            self.write_directive(directive.as_ref(), 0, out)
                .map_err(RenderError::Write)?;
        }
        out.flush().map_err(RenderError::Write)?;
        record_render(FORMAT_NAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logweave_core::{GenericDirective, PluginMeta};
    use pretty_assertions::assert_eq;

    fn render(directives: Vec<Box<dyn Directive>>) -> String {
        FluentRenderer::default()
            .render_to_string(&directives)
            .unwrap()
    }

    #[test]
    fn pseudo_params_precede_sorted_params() {
        let directive = GenericDirective::new(
            PluginMeta::new("match")
                .with_tag("**")
                .with_label("@abc")
                .with_id("x_file")
                .with_type("file"),
        )
        .with_param("zeta", "1")
        .with_param("alpha", "2")
        .boxed();

        assert_eq!(
            render(vec![directive]),
            "<match **>\n  @type file\n  @id x_file\n  @label @abc\n  alpha 2\n  zeta 1\n</match>\n"
        );
    }

    #[test]
    fn empty_value_renders_key_only() {
        let directive = GenericDirective::new(PluginMeta::new("assume_role_credentials"))
            .with_param("role_arn", "")
            .boxed();
        assert_eq!(
            render(vec![directive]),
            "<assume_role_credentials>\n  role_arn\n</assume_role_credentials>\n"
        );
    }

    #[test]
    fn nested_sections_indent_one_level() {
        let inner = GenericDirective::new(PluginMeta::new("parse").with_type("json")).boxed();
        let outer = GenericDirective::new(PluginMeta::new("filter").with_tag("**"))
            .with_section(inner)
            .boxed();
        assert_eq!(
            render(vec![outer]),
            "<filter **>\n  <parse>\n    @type json\n  </parse>\n</filter>\n"
        );
    }

    #[test]
    fn zero_indent_is_flush_left() {
        let inner = GenericDirective::new(PluginMeta::new("server"))
            .with_param("host", "a")
            .boxed();
        let outer = GenericDirective::new(PluginMeta::new("match").with_tag("**"))
            .with_section(inner)
            .boxed();
        let text = FluentRenderer::new(0).render_to_string(&[outer]).unwrap();
        assert_eq!(text, "<match **>\n<server>\nhost a\n</server>\n</match>\n");
    }

    #[test]
    fn empty_document_renders_nothing() {
        assert_eq!(render(Vec::new()), "");
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_render_error() {
        let directive = GenericDirective::new(PluginMeta::new("source")).boxed();
        let err = FluentRenderer::default()
            .render(&[directive], &mut FailingSink)
            .unwrap_err();
        assert!(matches!(
            err,
            LogweaveError::Render(RenderError::Write(_))
        ));
    }
}
