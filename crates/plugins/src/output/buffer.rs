//! `<buffer>` 섹션 — 출력 플러그인의 청크 버퍼링 설정
//!
//! ```text
//! <buffer tag,time>
//!   @type file
//!   path /buffers/{output id}.*.buffer
//!   retry_forever true
//!   timekey 10m
//!   timekey_wait 10m
//! </buffer>
//! ```
//!
//! 경로 기본값은 소유 출력의 `@id`에서 계산되므로 필드 테이블 밖에서 채웁니다.

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, PluginMeta, SecretResolver, ensure_single_line,
};

/// 청크 키 기본값
const DEFAULT_CHUNK_KEYS: &str = "tag,time";

/// 버퍼 타입 기본값
const DEFAULT_BUFFER_TYPE: &str = "file";

/// 버퍼 섹션 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Buffer {
    /// 청크 키 (여는 태그 식별자, 기본값 `tag,time`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tags: String,
    /// 버퍼 타입 (기본값 `file`)
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub buffer_type: String,
    /// 버퍼 파일 경로 (기본값 `/buffers/{output id}.*.buffer`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// 무한 재시도 (기본값 `true`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_forever: Option<bool>,
    /// 시간 청크 크기 (기본값 `10m`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timekey: String,
    /// 시간 청크 플러시 대기 (기본값 `10m`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timekey_wait: String,
    /// 시간 청크를 UTC로 계산
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timekey_use_utc: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub chunk_limit_size: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub total_limit_size: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub flush_mode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub flush_interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flush_thread_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_limit_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_max_times: Option<u32>,
}

impl Parameters for Buffer {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("path", |c: &Self| ParamValue::Str(&c.path)).omit_empty(),
        Field::new("retry_forever", |c: &Self| {
            ParamValue::opt_bool(c.retry_forever)
        })
        .with_default("true"),
        Field::new("timekey", |c: &Self| ParamValue::Str(&c.timekey)).with_default("10m"),
        Field::new("timekey_wait", |c: &Self| ParamValue::Str(&c.timekey_wait))
            .with_default("10m"),
        Field::new("timekey_use_utc", |c: &Self| {
            ParamValue::opt_bool(c.timekey_use_utc)
        }),
        Field::new("chunk_limit_size", |c: &Self| {
            ParamValue::Str(&c.chunk_limit_size)
        })
        .omit_empty(),
        Field::new("total_limit_size", |c: &Self| {
            ParamValue::Str(&c.total_limit_size)
        })
        .omit_empty(),
        Field::new("flush_mode", |c: &Self| ParamValue::Str(&c.flush_mode)).omit_empty(),
        Field::new("flush_interval", |c: &Self| ParamValue::Str(&c.flush_interval)).omit_empty(),
        Field::new("flush_thread_count", |c: &Self| {
            ParamValue::opt_int(c.flush_thread_count)
        }),
        Field::new("queue_limit_length", |c: &Self| {
            ParamValue::opt_int(c.queue_limit_length)
        }),
        Field::new("retry_max_times", |c: &Self| {
            ParamValue::opt_int(c.retry_max_times)
        }),
    ];
}

impl DirectiveConverter for Buffer {
    /// `id`는 이 버퍼를 소유한 출력의 `@id`입니다.
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        ensure_single_line("tags", &self.tags)?;
        let chunk_keys = if self.tags.is_empty() {
            DEFAULT_CHUNK_KEYS
        } else {
            self.tags.as_str()
        };
        let buffer_type = if self.buffer_type.is_empty() {
            DEFAULT_BUFFER_TYPE
        } else {
            self.buffer_type.as_str()
        };

        let meta = PluginMeta::new("buffer")
            .with_tag(chunk_keys)
            .with_type(buffer_type);
        let mut directive = GenericDirective::flat(meta, self, resolver)?;
        if self.path.is_empty() {
            directive = directive.with_param("path", format!("/buffers/{id}.*.buffer"));
        }
        Ok(directive.boxed())
    }
}
