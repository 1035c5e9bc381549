//! 입력 플러그인 — `<source>` 블록
//!
//! 문서의 첫 번째 최상위 블록이 되는 로그 수집 지점입니다.

pub mod tail;

pub use tail::TailInput;
