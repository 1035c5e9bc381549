//! 시크릿 리졸버 — 시크릿 참조를 설정 값 또는 파일 경로 토큰으로 해석
//!
//! 플러그인 명세의 민감한 필드(키, 토큰, 비밀번호)는 [`Secret`]으로 선언됩니다.
//! 변환 시점에 주입된 [`SecretResolver`]가 이를 실제 값으로 바꿉니다.
//! 전역 조회는 하지 않으므로 변환 함수는 명시적 의존성에 대해 순수합니다.
//!
//! # 해석 규칙
//! - `value`: 인라인 값 그대로 사용
//! - `value_from`: 저장소 조회 후 [`SecretMode`]에 따라 값 또는 마운트 경로 반환
//! - `mount_from`: 항상 마운트 경로 토큰 반환 (엔진이 파일을 읽음)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SecretConfig;
use crate::error::SecretError;

/// 시크릿 저장소 내 위치 (이름 + 키)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeyRef {
    /// 시크릿 이름
    pub name: String,
    /// 시크릿 내 키
    pub key: String,
}

impl SecretKeyRef {
    /// 새 참조를 생성합니다.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    fn validate(&self) -> Result<(), SecretError> {
        if self.name.is_empty() || self.key.is_empty() {
            return Err(SecretError::Malformed {
                reason: "secret name and key must not be empty".to_owned(),
            });
        }
        if self.name.contains('/') || self.key.contains('/') {
            return Err(SecretError::Malformed {
                reason: format!(
                    "secret reference '{}/{}' must not contain '/'",
                    self.name, self.key
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SecretKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.key)
    }
}

/// 선언적 시크릿 값
///
/// 세 가지 소스 중 정확히 하나만 설정되어야 합니다.
///
/// ```yaml
/// aws_key_id:
///   value_from:
///     name: s3-credentials
///     key: access-key
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// 인라인 값
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 저장소에서 값을 읽어 삽입
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<SecretKeyRef>,
    /// 저장소 항목을 파일로 마운트하고 경로를 삽입
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_from: Option<SecretKeyRef>,
}

/// 검증된 시크릿 소스
enum SecretSource<'a> {
    Inline(&'a str),
    ValueFrom(&'a SecretKeyRef),
    MountFrom(&'a SecretKeyRef),
}

impl Secret {
    /// 인라인 시크릿
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// 저장소 값 참조
    pub fn value_from(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            value_from: Some(SecretKeyRef::new(name, key)),
            ..Self::default()
        }
    }

    /// 마운트 경로 참조
    pub fn mount_from(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            mount_from: Some(SecretKeyRef::new(name, key)),
            ..Self::default()
        }
    }

    fn source(&self) -> Result<SecretSource<'_>, SecretError> {
        match (&self.value, &self.value_from, &self.mount_from) {
            (Some(value), None, None) => Ok(SecretSource::Inline(value)),
            (None, Some(reference), None) => {
                reference.validate()?;
                Ok(SecretSource::ValueFrom(reference))
            }
            (None, None, Some(reference)) => {
                reference.validate()?;
                Ok(SecretSource::MountFrom(reference))
            }
            (None, None, None) => Err(SecretError::Malformed {
                reason: "one of value, value_from or mount_from must be set".to_owned(),
            }),
            _ => Err(SecretError::Malformed {
                reason: "only one of value, value_from or mount_from can be set".to_owned(),
            }),
        }
    }
}

/// 저장소 참조 해석 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretMode {
    /// 값을 설정 문서에 직접 삽입
    Inline,
    /// 마운트 경로를 삽입 (기본값)
    #[default]
    Mount,
}

impl fmt::Display for SecretMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Mount => write!(f, "mount"),
        }
    }
}

impl FromStr for SecretMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(Self::Inline),
            "mount" => Ok(Self::Mount),
            other => Err(format!("unknown secret mode '{other}'")),
        }
    }
}

/// 시크릿 참조를 설정 값으로 해석하는 능력
///
/// 모든 변환 호출에 주입됩니다. 조회는 블로킹 호출이며
/// 재시도와 타임아웃은 호출자 책임입니다.
pub trait SecretResolver: Send + Sync {
    /// 시크릿을 설정 문서에 들어갈 문자열로 해석합니다.
    fn resolve(&self, secret: &Secret) -> Result<String, SecretError>;
}

/// 인라인 값만 허용하는 리졸버
///
/// 저장소 참조는 모두 `NotFound`로 실패합니다. 테스트와 오프라인 렌더링용입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSecretResolver;

impl SecretResolver for NoopSecretResolver {
    fn resolve(&self, secret: &Secret) -> Result<String, SecretError> {
        match secret.source()? {
            SecretSource::Inline(value) => Ok(value.to_owned()),
            SecretSource::ValueFrom(reference) | SecretSource::MountFrom(reference) => {
                Err(SecretError::NotFound {
                    name: reference.name.clone(),
                    key: reference.key.clone(),
                })
            }
        }
    }
}

/// 호출자가 채운 저장소 스냅샷 기반 리졸버
///
/// 실제 시크릿 백엔드는 외부 협력자이며, 호출자는 빌드 전에
/// 필요한 항목을 조회하여 이 리졸버에 넣습니다.
#[derive(Debug, Clone)]
pub struct StoreSecretResolver {
    /// (이름, 키) -> 값
    store: BTreeMap<(String, String), String>,
    /// 저장소 참조 해석 방식
    mode: SecretMode,
    /// 마운트 루트 경로
    mount_path: String,
}

impl StoreSecretResolver {
    /// 빈 저장소로 리졸버를 생성합니다.
    pub fn new(mode: SecretMode, mount_path: impl Into<String>) -> Self {
        Self {
            store: BTreeMap::new(),
            mode,
            mount_path: mount_path.into(),
        }
    }

    /// 설정의 `[secret]` 섹션으로 리졸버를 생성합니다.
    pub fn from_config(config: &SecretConfig) -> Self {
        Self::new(config.mode, config.mount_path.clone())
    }

    /// 저장소 항목을 추가합니다.
    pub fn with_secret(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(name, key, value);
        self
    }

    /// 저장소 항목을 추가합니다.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.store.insert((name.into(), key.into()), value.into());
    }

    /// 저장된 항목 수
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// 저장소가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn lookup(&self, reference: &SecretKeyRef) -> Result<&str, SecretError> {
        self.store
            .get(&(reference.name.clone(), reference.key.clone()))
            .map(String::as_str)
            .ok_or_else(|| SecretError::NotFound {
                name: reference.name.clone(),
                key: reference.key.clone(),
            })
    }

    fn mount_token(&self, reference: &SecretKeyRef) -> String {
        format!(
            "{}/{}-{}",
            self.mount_path.trim_end_matches('/'),
            reference.name,
            reference.key
        )
    }
}

impl SecretResolver for StoreSecretResolver {
    fn resolve(&self, secret: &Secret) -> Result<String, SecretError> {
        match secret.source()? {
            SecretSource::Inline(value) => Ok(value.to_owned()),
            SecretSource::ValueFrom(reference) => {
                let value = self.lookup(reference)?;
                match self.mode {
                    SecretMode::Inline => Ok(value.to_owned()),
                    SecretMode::Mount => Ok(self.mount_token(reference)),
                }
            }
            SecretSource::MountFrom(reference) => {
                self.lookup(reference)?;
                Ok(self.mount_token(reference))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(mode: SecretMode) -> StoreSecretResolver {
        StoreSecretResolver::new(mode, "/fluentd/etc/secret/").with_secret(
            "aws",
            "access-key",
            "AKIAEXAMPLE",
        )
    }

    #[test]
    fn inline_value_is_returned_verbatim() {
        let resolver = store(SecretMode::Mount);
        let value = resolver.resolve(&Secret::inline("plain")).unwrap();
        assert_eq!(value, "plain");
    }

    #[test]
    fn value_from_inline_mode_returns_value() {
        let resolver = store(SecretMode::Inline);
        let value = resolver
            .resolve(&Secret::value_from("aws", "access-key"))
            .unwrap();
        assert_eq!(value, "AKIAEXAMPLE");
    }

    #[test]
    fn value_from_mount_mode_returns_path_token() {
        let resolver = store(SecretMode::Mount);
        let value = resolver
            .resolve(&Secret::value_from("aws", "access-key"))
            .unwrap();
        assert_eq!(value, "/fluentd/etc/secret/aws-access-key");
    }

    #[test]
    fn mount_from_ignores_mode() {
        let resolver = store(SecretMode::Inline);
        let value = resolver
            .resolve(&Secret::mount_from("aws", "access-key"))
            .unwrap();
        assert_eq!(value, "/fluentd/etc/secret/aws-access-key");
    }

    #[test]
    fn missing_reference_is_not_found() {
        let resolver = store(SecretMode::Inline);
        let err = resolver
            .resolve(&Secret::value_from("aws", "secret-key"))
            .unwrap_err();
        assert_eq!(
            err,
            SecretError::NotFound {
                name: "aws".to_owned(),
                key: "secret-key".to_owned(),
            }
        );
    }

    #[test]
    fn empty_secret_is_malformed() {
        let resolver = store(SecretMode::Inline);
        let err = resolver.resolve(&Secret::default()).unwrap_err();
        assert!(matches!(err, SecretError::Malformed { .. }));
    }

    #[test]
    fn two_sources_are_malformed() {
        let secret = Secret {
            value: Some("x".to_owned()),
            value_from: Some(SecretKeyRef::new("aws", "access-key")),
            mount_from: None,
        };
        let err = store(SecretMode::Inline).resolve(&secret).unwrap_err();
        assert!(matches!(err, SecretError::Malformed { .. }));
    }

    #[test]
    fn slash_in_reference_is_malformed() {
        let err = store(SecretMode::Mount)
            .resolve(&Secret::mount_from("../etc", "passwd"))
            .unwrap_err();
        assert!(matches!(err, SecretError::Malformed { .. }));
    }

    #[test]
    fn noop_resolver_rejects_references() {
        let err = NoopSecretResolver
            .resolve(&Secret::value_from("aws", "access-key"))
            .unwrap_err();
        assert!(matches!(err, SecretError::NotFound { .. }));
        assert_eq!(NoopSecretResolver.resolve(&Secret::inline("v")).unwrap(), "v");
    }

    #[test]
    fn secret_mode_parses() {
        assert_eq!("inline".parse::<SecretMode>().unwrap(), SecretMode::Inline);
        assert_eq!("mount".parse::<SecretMode>().unwrap(), SecretMode::Mount);
        assert!("vault".parse::<SecretMode>().is_err());
    }
}
