//! JSON 렌더러
//!
//! 최상위 Directive 순서를 배열로, 각 노드를 다음 형태의 객체로 직렬화합니다.
//!
//! ```json
//! { "directive": "match", "type": "null", "tag": "**", "id": "x_null",
//!   "params": { "k": "v" }, "sections": [] }
//! ```
//!
//! 비어 있는 메타데이터, 파라미터, 섹션 키는 생략됩니다.

use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use logweave_core::{Directive, LogweaveError, Params, PluginMeta, RenderError};

use super::{Renderer, record_render};

/// 형식 이름
pub const FORMAT_NAME: &str = "json";

/// JSON 렌더러 (`indent`가 0이면 한 줄)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonRenderer {
    indent: usize,
}

impl JsonRenderer {
    /// 단계당 `indent`칸 들여쓰는 렌더러를 생성합니다. 0이면 한 줄로 출력합니다.
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new(2)
    }
}

#[derive(Serialize)]
struct Node<'a> {
    #[serde(flatten)]
    meta: &'a PluginMeta,
    #[serde(skip_serializing_if = "Params::is_empty")]
    params: &'a Params,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sections: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    fn from_directive(directive: &'a dyn Directive) -> Self {
        Self {
            meta: directive.meta(),
            params: directive.params(),
            sections: directive
                .sections()
                .iter()
                .map(|section| Node::from_directive(section.as_ref()))
                .collect(),
        }
    }
}

impl Renderer for JsonRenderer {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn render(
        &self,
        directives: &[Box<dyn Directive>],
        out: &mut dyn Write,
    ) -> Result<(), LogweaveError> {
        let nodes: Vec<Node<'_>> = directives
            .iter()
            .map(|d| Node::from_directive(d.as_ref()))
            .collect();

        if self.indent == 0 {
            serde_json::to_writer(&mut *out, &nodes).map_err(RenderError::Serialize)?;
        } else {
            let indent = vec![b' '; self.indent];
            let mut serializer =
                Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(&indent));
            nodes
                .serialize(&mut serializer)
                .map_err(RenderError::Serialize)?;
        }
        writeln!(out).map_err(RenderError::Write)?;
        out.flush().map_err(RenderError::Write)?;
        record_render(FORMAT_NAME);
        Ok(())
    }
}
