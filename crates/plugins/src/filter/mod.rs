//! 필터 플러그인 — 라벨 블록 안에서 출력 전에 적용되는 처리 단계
//!
//! - [`StdoutFilter`]: 레코드를 표준 출력으로 흘려보내는 디버그 필터
//! - [`ParserFilter`]: 지정 키의 값을 `<parse>` 섹션 규칙으로 파싱
//! - [`DetectExceptionsFilter`]: 여러 줄 예외 스택을 한 레코드로 합침

pub mod detect_exceptions;
pub mod parser;
pub mod stdout;

pub use detect_exceptions::DetectExceptionsFilter;
pub use parser::{ParseSection, ParserFilter};
pub use stdout::StdoutFilter;
