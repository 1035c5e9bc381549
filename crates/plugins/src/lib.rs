#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`input`]: 입력 플러그인 (`<source>`)
//! - [`filter`]: 필터 플러그인 및 parse 섹션
//! - [`output`]: 출력 플러그인, buffer 섹션, S3 자격 증명
//! - [`spec`]: 매니페스트용 태그 열거형

pub mod filter;
pub mod input;
pub mod output;
pub mod spec;

// --- 주요 타입 re-export ---

// 입력
pub use input::TailInput;

// 필터
pub use filter::{DetectExceptionsFilter, ParseSection, ParserFilter, StdoutFilter};

// 출력
pub use output::{
    AssumeRoleCredentials, Buffer, FileOutput, ForwardOutput, ForwardServer,
    InstanceProfileCredentials, LogzEndpoint, LogzOutput, NullOutput, S3Credentials, S3Output,
    SharedCredentials,
};

// 태그 열거형
pub use spec::{FilterSpec, InputSpec, OutputSpec};

/// 플러그인 `@id`를 만듭니다 (`{id}_{plugin_type}`).
///
/// 호출자 id가 비어 있으면 플러그인 타입만 사용합니다.
pub fn plugin_id(id: &str, plugin_type: &str) -> String {
    if id.is_empty() {
        plugin_type.to_owned()
    } else {
        format!("{id}_{plugin_type}")
    }
}
