//! s3 출력 — 오브젝트 스토리지 업로드
//!
//! 자격 증명 방식은 세 가지 중 정확히 하나여야 합니다.
//!
//! - `assume_role_credentials`
//! - `instance_profile_credentials`
//! - `shared_credentials`
//!
//! 선언형(YAML) 명세는 세 옵션을 각각 가지며, 변환 시 한 번 검증되어
//! [`S3Credentials`] 열거형이 됩니다. 코드에서 직접 만들 때는
//! [`S3Output::new`]에 열거형을 넘기므로 잘못된 조합을 만들 수 없습니다.
//!
//! ```text
//! <match **>
//!   @type s3
//!   @id {id}_s3
//!   s3_bucket logging-amazon-s3
//!   <buffer tag,time>
//!     ...
//!   </buffer>
//!   <assume_role_credentials>
//!     role_arn ...
//!     role_session_name ...
//!   </assume_role_credentials>
//! </match>
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, PluginMeta, Secret, SecretResolver, ValidationError,
};

use super::{Buffer, match_all};
use crate::plugin_id;

/// 플러그인 타입 이름
pub const S3_TYPE: &str = "s3";

const ASSUME_ROLE: &str = "assume_role_credentials";
const INSTANCE_PROFILE: &str = "instance_profile_credentials";
const SHARED: &str = "shared_credentials";

/// s3 출력 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3Output {
    /// 오브젝트 경로 접두어
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// 버킷 이름 (필수)
    pub s3_bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub s3_region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub s3_endpoint: String,
    /// 오브젝트 키 형식
    #[serde(skip_serializing_if = "String::is_empty")]
    pub s3_object_key_format: String,
    /// 저장 형식 (gzip, lzo, json, text)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub store_as: String,
    /// 정적 액세스 키 (역할 위임 시 기반 자격 증명으로도 사용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_key_id: Option<Secret>,
    /// 정적 시크릿 키
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_sec_key: Option<Secret>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assume_role_credentials: Option<AssumeRoleCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_profile_credentials: Option<InstanceProfileCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_credentials: Option<SharedCredentials>,
    /// 버퍼 섹션
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<Buffer>,
}

impl S3Output {
    /// 버킷과 자격 증명 방식으로 출력을 생성합니다.
    pub fn new(s3_bucket: impl Into<String>, credentials: S3Credentials) -> Self {
        let mut output = Self {
            s3_bucket: s3_bucket.into(),
            ..Self::default()
        };
        output.set_credentials(credentials);
        output
    }

    /// 자격 증명 방식을 교체합니다. 기존 방식은 모두 지워집니다.
    pub fn set_credentials(&mut self, credentials: S3Credentials) {
        self.assume_role_credentials = None;
        self.instance_profile_credentials = None;
        self.shared_credentials = None;
        match credentials {
            S3Credentials::AssumeRole(c) => self.assume_role_credentials = Some(c),
            S3Credentials::InstanceProfile(c) => self.instance_profile_credentials = Some(c),
            S3Credentials::Shared(c) => self.shared_credentials = Some(c),
        }
    }

    /// 버퍼 섹션을 설정합니다.
    pub fn with_buffer(mut self, buffer: Buffer) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// 선언된 자격 증명 옵션을 검증하여 하나의 방식으로 만듭니다.
    pub fn credentials(&self) -> Result<S3Credentials, ValidationError> {
        let set: Vec<&str> = [
            (ASSUME_ROLE, self.assume_role_credentials.is_some()),
            (INSTANCE_PROFILE, self.instance_profile_credentials.is_some()),
            (SHARED, self.shared_credentials.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        if set.len() > 1 {
            return Err(ValidationError::ExclusiveGroupConflict {
                plugin: S3_TYPE.to_owned(),
                options: set.into_iter().map(str::to_owned).collect(),
            });
        }

        match (
            &self.assume_role_credentials,
            &self.instance_profile_credentials,
            &self.shared_credentials,
        ) {
            (Some(c), None, None) => Ok(S3Credentials::AssumeRole(c.clone())),
            (None, Some(c), None) => Ok(S3Credentials::InstanceProfile(c.clone())),
            (None, None, Some(c)) => Ok(S3Credentials::Shared(c.clone())),
            _ => Err(ValidationError::ExclusiveGroupUnset {
                plugin: S3_TYPE.to_owned(),
                options: [ASSUME_ROLE, INSTANCE_PROFILE, SHARED]
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            }),
        }
    }
}

impl Parameters for S3Output {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("path", |c: &Self| ParamValue::Str(&c.path)).omit_empty(),
        Field::new("s3_bucket", |c: &Self| ParamValue::Str(&c.s3_bucket)),
        Field::new("s3_region", |c: &Self| ParamValue::Str(&c.s3_region)).omit_empty(),
        Field::new("s3_endpoint", |c: &Self| ParamValue::Str(&c.s3_endpoint)).omit_empty(),
        Field::new("s3_object_key_format", |c: &Self| {
            ParamValue::Str(&c.s3_object_key_format)
        })
        .omit_empty(),
        Field::new("store_as", |c: &Self| ParamValue::Str(&c.store_as)).omit_empty(),
        Field::new("aws_key_id", |c: &Self| ParamValue::opt_secret(&c.aws_key_id)),
        Field::new("aws_sec_key", |c: &Self| ParamValue::opt_secret(&c.aws_sec_key)),
    ];
}

impl DirectiveConverter for S3Output {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        let credentials = self.credentials()?;
        if self.s3_bucket.is_empty() {
            return Err(ValidationError::MissingField {
                plugin: S3_TYPE.to_owned(),
                field: "s3_bucket".to_owned(),
            }
            .into());
        }
        debug!(id, credentials = credentials.section_name(), "converting s3 output");

        let mut directive = GenericDirective::flat(match_all(S3_TYPE, id), self, resolver)?;
        if let Some(buffer) = &self.buffer {
            directive.push_section(buffer.to_directive(resolver, &plugin_id(id, S3_TYPE))?);
        }
        directive.push_section(credentials.to_directive(resolver, id)?);
        Ok(directive.boxed())
    }
}

/// 검증된 자격 증명 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S3Credentials {
    /// STS 역할 위임
    AssumeRole(AssumeRoleCredentials),
    /// EC2 인스턴스 프로파일
    InstanceProfile(InstanceProfileCredentials),
    /// 공유 자격 증명 파일
    Shared(SharedCredentials),
}

impl S3Credentials {
    /// 중첩 섹션 이름
    pub fn section_name(&self) -> &'static str {
        match self {
            Self::AssumeRole(_) => ASSUME_ROLE,
            Self::InstanceProfile(_) => INSTANCE_PROFILE,
            Self::Shared(_) => SHARED,
        }
    }
}

impl DirectiveConverter for S3Credentials {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        _id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        let meta = PluginMeta::new(self.section_name());
        let directive = match self {
            Self::AssumeRole(c) => GenericDirective::flat(meta, c, resolver)?,
            Self::InstanceProfile(c) => GenericDirective::flat(meta, c, resolver)?,
            Self::Shared(c) => GenericDirective::flat(meta, c, resolver)?,
        };
        Ok(directive.boxed())
    }
}

/// `<assume_role_credentials>` 섹션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssumeRoleCredentials {
    /// 위임받을 역할 ARN
    pub role_arn: String,
    /// 세션 이름
    pub role_session_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub external_id: String,
}

impl Parameters for AssumeRoleCredentials {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("role_arn", |c: &Self| ParamValue::Str(&c.role_arn)),
        Field::new("role_session_name", |c: &Self| {
            ParamValue::Str(&c.role_session_name)
        }),
        Field::new("policy", |c: &Self| ParamValue::Str(&c.policy)).omit_empty(),
        Field::new("duration_seconds", |c: &Self| {
            ParamValue::opt_int(c.duration_seconds)
        }),
        Field::new("external_id", |c: &Self| ParamValue::Str(&c.external_id)).omit_empty(),
    ];
}

/// `<instance_profile_credentials>` 섹션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceProfileCredentials {
    /// 메타데이터 서비스 주소
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub http_open_timeout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub http_read_timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl Parameters for InstanceProfileCredentials {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("ip_address", |c: &Self| ParamValue::Str(&c.ip_address)).omit_empty(),
        Field::new("port", |c: &Self| ParamValue::opt_int(c.port)),
        Field::new("http_open_timeout", |c: &Self| {
            ParamValue::Str(&c.http_open_timeout)
        })
        .omit_empty(),
        Field::new("http_read_timeout", |c: &Self| {
            ParamValue::Str(&c.http_read_timeout)
        })
        .omit_empty(),
        Field::new("retries", |c: &Self| ParamValue::opt_int(c.retries)),
    ];
}

/// `<shared_credentials>` 섹션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharedCredentials {
    /// 자격 증명 파일 경로
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// 프로파일 이름
    #[serde(skip_serializing_if = "String::is_empty")]
    pub profile_name: String,
}

impl Parameters for SharedCredentials {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("path", |c: &Self| ParamValue::Str(&c.path)).omit_empty(),
        Field::new("profile_name", |c: &Self| ParamValue::Str(&c.profile_name)).omit_empty(),
    ];
}
