//! logz.io 출력 — 버퍼링된 HTTPS 리스너 전송
//!
//! 중첩 `endpoint` 블록은 섹션이 아니라 `endpoint_url` 파라미터 하나로 합쳐집니다.
//!
//! ```text
//! <match **>
//!   @type logzio_buffered
//!   @id {id}_logzio_buffered
//!   endpoint_url https://listener.logz.io:8071?token={token}
//!   output_include_tags true
//!   <buffer tag,time>
//!     ...
//!   </buffer>
//! </match>
//! ```

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, Secret, SecretResolver, ValidationError, ensure_single_line,
};

use super::{Buffer, match_all};
use crate::plugin_id;

/// 플러그인 타입 이름
pub const LOGZ_TYPE: &str = "logzio_buffered";

/// 리스너 URL 기본값
const DEFAULT_URL: &str = "https://listener.logz.io";

/// 리스너 포트 기본값
const DEFAULT_PORT: u16 = 8071;

/// logz.io 출력 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogzOutput {
    /// 리스너 주소와 계정 토큰
    pub endpoint: LogzEndpoint,
    /// 레코드에 `@timestamp` 추가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_include_time: Option<bool>,
    /// 레코드에 `fluentd_tags` 추가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_include_tags: Option<bool>,
    /// 유휴 HTTP 연결 유지 시간 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_idle_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// 재시도 간격 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_sleep: Option<u32>,
    /// 느린 플러시 경고 기준 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_flush_log_threshold: Option<u32>,
    /// 요청 본문 gzip 압축
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip: Option<bool>,
    /// 버퍼 섹션
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<Buffer>,
}

/// 리스너 엔드포인트
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogzEndpoint {
    /// 리스너 URL (기본값 `https://listener.logz.io`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// 리스너 포트 (기본값 `8071`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// 계정 토큰 (필수)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Secret>,
    /// 로그 타입 (`type` 쿼리 파라미터)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log_type: String,
}

impl LogzEndpoint {
    /// `{url}:{port}?token={token}[&type={log_type}]` 형태로 합칩니다.
    ///
    /// 토큰은 리졸버를 거치므로 마운트 모드에서는 마운트 토큰이 그대로 들어갑니다.
    pub fn to_url(&self, resolver: &dyn SecretResolver) -> Result<String, LogweaveError> {
        let Some(token) = &self.token else {
            return Err(ValidationError::MissingField {
                plugin: LOGZ_TYPE.to_owned(),
                field: "endpoint.token".to_owned(),
            }
            .into());
        };
        let token = resolver.resolve(token)?;
        let url = if self.url.is_empty() {
            DEFAULT_URL
        } else {
            self.url.as_str()
        };
        let port = self.port.unwrap_or(DEFAULT_PORT);

        let mut endpoint = format!("{url}:{port}?token={token}");
        if !self.log_type.is_empty() {
            endpoint.push_str("&type=");
            endpoint.push_str(&self.log_type);
        }
        ensure_single_line("endpoint_url", &endpoint)?;
        Ok(endpoint)
    }
}

impl Parameters for LogzOutput {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("output_include_time", |c: &Self| {
            ParamValue::opt_bool(c.output_include_time)
        }),
        Field::new("output_include_tags", |c: &Self| {
            ParamValue::opt_bool(c.output_include_tags)
        }),
        Field::new("http_idle_timeout", |c: &Self| {
            ParamValue::opt_int(c.http_idle_timeout)
        }),
        Field::new("retry_count", |c: &Self| ParamValue::opt_int(c.retry_count)),
        Field::new("retry_sleep", |c: &Self| ParamValue::opt_int(c.retry_sleep)),
        Field::new("slow_flush_log_threshold", |c: &Self| {
            ParamValue::opt_int(c.slow_flush_log_threshold)
        }),
        Field::new("gzip", |c: &Self| ParamValue::opt_bool(c.gzip)),
    ];
}

impl DirectiveConverter for LogzOutput {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        let endpoint_url = self.endpoint.to_url(resolver)?;
        let mut directive = GenericDirective::flat(match_all(LOGZ_TYPE, id), self, resolver)?
            .with_param("endpoint_url", endpoint_url);
        if let Some(buffer) = &self.buffer {
            directive.push_section(buffer.to_directive(resolver, &plugin_id(id, LOGZ_TYPE))?);
        }
        Ok(directive.boxed())
    }
}
