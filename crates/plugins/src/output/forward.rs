//! forward 출력 — 다른 수집기 노드로 이벤트를 전달합니다.
//!
//! 대상 서버마다 `<server>` 섹션이 선언 순서대로 붙습니다.

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, PluginMeta, Secret, SecretResolver, ValidationError,
};

use super::{Buffer, match_all};
use crate::plugin_id;

/// 플러그인 타입 이름
pub const FORWARD_TYPE: &str = "forward";

/// forward 출력 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForwardOutput {
    /// 대상 서버 목록 (최소 하나)
    pub servers: Vec<ForwardServer>,
    /// 전송 방식 (tcp, tls)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transport: String,
    /// 수신 확인 응답 대기
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_ack_response: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub send_timeout: String,
    /// 버퍼 섹션
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<Buffer>,
}

impl ForwardOutput {
    /// 대상 서버 하나를 뒤에 추가합니다.
    pub fn with_server(mut self, server: ForwardServer) -> Self {
        self.servers.push(server);
        self
    }
}

impl Parameters for ForwardOutput {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("transport", |c: &Self| ParamValue::Str(&c.transport)).omit_empty(),
        Field::new("require_ack_response", |c: &Self| {
            ParamValue::opt_bool(c.require_ack_response)
        }),
        Field::new("send_timeout", |c: &Self| ParamValue::Str(&c.send_timeout)).omit_empty(),
    ];
}

impl DirectiveConverter for ForwardOutput {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        if self.servers.is_empty() {
            return Err(ValidationError::MissingField {
                plugin: FORWARD_TYPE.to_owned(),
                field: "servers".to_owned(),
            }
            .into());
        }

        let mut directive =
            GenericDirective::flat(match_all(FORWARD_TYPE, id), self, resolver)?;
        for server in &self.servers {
            directive.push_section(server.to_directive(resolver, id)?);
        }
        if let Some(buffer) = &self.buffer {
            directive.push_section(buffer.to_directive(resolver, &plugin_id(id, FORWARD_TYPE))?);
        }
        Ok(directive.boxed())
    }
}

/// `<server>` 섹션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForwardServer {
    /// 서버 호스트 (필수)
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// 부하 분산 가중치
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// 대기 서버 여부
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standby: Option<bool>,
    /// 서버별 공유 키
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_key: Option<Secret>,
}

impl ForwardServer {
    /// 호스트와 포트로 서버를 생성합니다.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
            ..Self::default()
        }
    }
}

impl Parameters for ForwardServer {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("host", |c: &Self| ParamValue::Str(&c.host)),
        Field::new("port", |c: &Self| ParamValue::opt_int(c.port)),
        Field::new("name", |c: &Self| ParamValue::Str(&c.name)).omit_empty(),
        Field::new("weight", |c: &Self| ParamValue::opt_int(c.weight)),
        Field::new("standby", |c: &Self| ParamValue::opt_bool(c.standby)),
        Field::new("shared_key", |c: &Self| ParamValue::opt_secret(&c.shared_key)),
    ];
}

impl DirectiveConverter for ForwardServer {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        _id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        if self.host.is_empty() {
            return Err(ValidationError::MissingField {
                plugin: FORWARD_TYPE.to_owned(),
                field: "servers[].host".to_owned(),
            }
            .into());
        }
        Ok(GenericDirective::flat(PluginMeta::new("server"), self, resolver)?.boxed())
    }
}
