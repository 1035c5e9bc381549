//! 출력 플러그인 — 라벨 블록의 마지막 단계인 `<match **>` 블록
//!
//! - [`NullOutput`]: 레코드를 버림
//! - [`FileOutput`]: 로컬 파일에 기록
//! - [`S3Output`]: 오브젝트 스토리지에 업로드 ([`S3Credentials`] 중 정확히 하나 필요)
//! - [`ForwardOutput`]: 다른 수집기로 전달
//! - [`LogzOutput`]: logz.io 리스너로 전송
//!
//! 버퍼링이 필요한 출력은 [`Buffer`] 섹션을 중첩으로 가집니다.

pub mod buffer;
pub mod file;
pub mod forward;
pub mod logz;
pub mod null;
pub mod s3;

pub use buffer::Buffer;
pub use file::FileOutput;
pub use forward::{ForwardOutput, ForwardServer};
pub use logz::{LogzEndpoint, LogzOutput};
pub use null::NullOutput;
pub use s3::{
    AssumeRoleCredentials, InstanceProfileCredentials, S3Credentials, S3Output, SharedCredentials,
};

use logweave_core::PluginMeta;

use crate::plugin_id;

/// 모든 태그를 받는 출력 블록 메타데이터
fn match_all(plugin_type: &str, id: &str) -> PluginMeta {
    PluginMeta::new("match")
        .with_tag("**")
        .with_type(plugin_type)
        .with_id(plugin_id(id, plugin_type))
}
