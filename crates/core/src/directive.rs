//! Directive 모델 — 출력 트리의 노드 추상화
//!
//! 출력 문서는 [`Directive`] 트리입니다. 각 노드는 메타데이터([`PluginMeta`]),
//! 정렬된 파라미터, 순서가 유지되는 중첩 섹션이라는 세 가지 능력만 노출합니다.
//! 공유 기반 상태 없이 각 변형(일반 노드, 라우터, 라우트, 매치 조건 등)이
//! 독립적으로 trait을 구현합니다.
//!
//! 새 플러그인 종류는 [`DirectiveConverter`]만 구현하면 됩니다.
//! 별도의 등록 단계는 없습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LogweaveError;
use crate::params::{ParameterMapper, Parameters, Params};
use crate::secret::SecretResolver;

/// 블록 렌더링과 엔진 디스패치 방식을 결정하는 메타데이터
///
/// ```text
/// <{directive} {tag|label}>
///   @type {plugin_type}
///   @id {id}
///   @label {label}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMeta {
    /// 섹션 종류 (source, filter, match, label, parse, route, buffer, store 등)
    pub directive: String,
    /// 플러그인 타입 이름 (`@type`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,
    /// 여는 태그의 식별자 (매치 태그 또는 라벨 블록 이름)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// 고유 ID (`@id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 대상 라벨 (`@label`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PluginMeta {
    /// 섹션 종류만 가진 메타데이터를 생성합니다.
    pub fn new(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            ..Self::default()
        }
    }

    /// `@type`을 설정합니다.
    pub fn with_type(mut self, plugin_type: impl Into<String>) -> Self {
        self.plugin_type = Some(plugin_type.into());
        self
    }

    /// 여는 태그 식별자를 설정합니다.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// `@id`를 설정합니다.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// `@label`을 설정합니다.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for PluginMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.directive)?;
        if let Some(tag) = &self.tag {
            write!(f, " {tag}")?;
        }
        write!(f, ">")?;
        if let Some(plugin_type) = &self.plugin_type {
            write!(f, " @type {plugin_type}")?;
        }
        Ok(())
    }
}

/// 출력 트리의 노드
///
/// `Send + Sync`이므로 호출자는 독립된 컴파일을 별도 워커에서 실행할 수 있습니다.
pub trait Directive: fmt::Debug + Send + Sync {
    /// 메타데이터
    fn meta(&self) -> &PluginMeta;

    /// 정렬된 파라미터 (키 유일)
    fn params(&self) -> &Params;

    /// 중첩 섹션 (선언 순서 유지)
    fn sections(&self) -> &[Box<dyn Directive>];
}

/// 플러그인 명세를 Directive 서브트리로 변환하는 유일한 연산
///
/// `id`는 호출자가 부여하는 고유 식별자로, 보통 `{id}_{type}` 형태의 `@id`가 됩니다.
pub trait DirectiveConverter {
    /// 명세를 Directive로 변환합니다.
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError>;
}

/// 메타데이터 + 파라미터 + 중첩 섹션을 그대로 담는 일반 노드
#[derive(Debug, Default)]
pub struct GenericDirective {
    meta: PluginMeta,
    params: Params,
    sections: Vec<Box<dyn Directive>>,
}

impl GenericDirective {
    /// 파라미터 없는 노드를 생성합니다.
    pub fn new(meta: PluginMeta) -> Self {
        Self {
            meta,
            params: Params::new(),
            sections: Vec::new(),
        }
    }

    /// 명세의 필드 테이블을 평탄화한 파라미터로 노드를 생성합니다.
    pub fn flat<T: Parameters>(
        meta: PluginMeta,
        spec: &T,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, LogweaveError> {
        let params = ParameterMapper::new(resolver).map(spec)?;
        Ok(Self::new(meta).with_params(params))
    }

    /// 파라미터를 교체합니다.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// 파라미터 하나를 추가합니다.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// 중첩 섹션을 뒤에 추가합니다.
    pub fn with_section(mut self, section: Box<dyn Directive>) -> Self {
        self.sections.push(section);
        self
    }

    /// 중첩 섹션을 뒤에 추가합니다.
    pub fn push_section(&mut self, section: Box<dyn Directive>) {
        self.sections.push(section);
    }

    /// 트레잇 객체로 변환합니다.
    pub fn boxed(self) -> Box<dyn Directive> {
        Box::new(self)
    }
}

impl Directive for GenericDirective {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn sections(&self) -> &[Box<dyn Directive>] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Field, ParamValue};
    use crate::secret::NoopSecretResolver;

    struct PathSpec {
        path: String,
    }

    impl Parameters for PathSpec {
        const FIELDS: &'static [Field<Self>] =
            &[Field::new("path", |c: &Self| ParamValue::Str(&c.path))];
    }

    #[test]
    fn flat_directive_maps_params() {
        let directive = GenericDirective::flat(
            PluginMeta::new("source").with_type("tail"),
            &PathSpec {
                path: "/var/log/app.log".to_owned(),
            },
            &NoopSecretResolver,
        )
        .unwrap();
        assert_eq!(directive.meta().directive, "source");
        assert_eq!(directive.params()["path"], "/var/log/app.log");
        assert!(directive.sections().is_empty());
    }

    #[test]
    fn sections_keep_insertion_order() {
        let parent = GenericDirective::new(PluginMeta::new("match"))
            .with_section(GenericDirective::new(PluginMeta::new("zeta")).boxed())
            .with_section(GenericDirective::new(PluginMeta::new("alpha")).boxed());
        let names: Vec<&str> = parent
            .sections()
            .iter()
            .map(|s| s.meta().directive.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn meta_display_shows_tag_and_type() {
        let meta = PluginMeta::new("match").with_tag("**").with_type("null");
        assert_eq!(meta.to_string(), "<match **> @type null");
    }
}
