//! 렌더러 — Directive 트리를 텍스트 문서로 직렬화
//!
//! - [`FluentRenderer`]: 엔진이 읽는 블록 문법 텍스트
//! - [`JsonRenderer`]: 같은 트리의 JSON 표현 (디버깅, 외부 도구 연동)
//!
//! 렌더링은 트리를 변경하지 않으며, 같은 트리는 항상 바이트 단위로 같은 문서가 됩니다.

pub mod fluent;
pub mod json;

pub use fluent::FluentRenderer;
pub use json::JsonRenderer;

use std::io;

use logweave_core::metrics as m;
use logweave_core::{Directive, LogweaveError, RenderError};

/// 출력 형식별 렌더러
pub trait Renderer {
    /// 메트릭 레이블 등에 쓰이는 형식 이름
    fn format_name(&self) -> &'static str;

    /// 최상위 Directive 순서를 싱크에 기록합니다.
    fn render(
        &self,
        directives: &[Box<dyn Directive>],
        out: &mut dyn io::Write,
    ) -> Result<(), LogweaveError>;

    /// 문자열로 렌더링합니다.
    fn render_to_string(&self, directives: &[Box<dyn Directive>]) -> Result<String, LogweaveError> {
        let mut buf = Vec::new();
        self.render(directives, &mut buf)?;
        String::from_utf8(buf).map_err(|_| RenderError::InvalidUtf8.into())
    }
}

fn record_render(format: &'static str) {
    metrics::counter!(m::COMPILER_RENDERS_TOTAL, m::LABEL_FORMAT => format).increment(1);
}

/// 설정의 형식 이름으로 렌더러를 선택합니다 (`fluent`, `json`).
pub fn renderer_for(format: &str, indent: usize) -> Option<Box<dyn Renderer>> {
    match format {
        fluent::FORMAT_NAME => Some(Box::new(FluentRenderer::new(indent))),
        json::FORMAT_NAME => Some(Box::new(JsonRenderer::new(indent))),
        _ => None,
    }
}
