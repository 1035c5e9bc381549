//! tail 입력 — 파일 끝을 따라가며 새 줄을 읽습니다.
//!
//! ```text
//! <source>
//!   @type tail
//!   @id {id}_tail
//!   path /var/log/containers/*.log
//! </source>
//! ```

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, PluginMeta, SecretResolver, ValidationError,
};

use crate::plugin_id;

/// 플러그인 타입 이름
pub const TAIL_TYPE: &str = "tail";

/// tail 입력 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TailInput {
    /// 읽을 파일 경로 (glob 허용)
    pub path: String,
    /// 읽기 위치를 기록할 파일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_file: Option<String>,
    /// 처음 발견한 파일을 처음부터 읽을지 여부
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_from_head: Option<bool>,
    /// 수집한 이벤트에 붙일 태그
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl TailInput {
    /// 경로만 지정한 tail 입력을 생성합니다.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Parameters for TailInput {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("path", |c: &Self| ParamValue::Str(&c.path)),
        Field::new("pos_file", |c: &Self| ParamValue::opt_str(&c.pos_file)).omit_empty(),
        Field::new("read_from_head", |c: &Self| {
            ParamValue::opt_bool(c.read_from_head)
        }),
        Field::new("tag", |c: &Self| ParamValue::opt_str(&c.tag)).omit_empty(),
    ];
}

impl DirectiveConverter for TailInput {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        if self.path.is_empty() {
            return Err(ValidationError::MissingField {
                plugin: TAIL_TYPE.to_owned(),
                field: "path".to_owned(),
            }
            .into());
        }

        let meta = PluginMeta::new("source")
            .with_type(TAIL_TYPE)
            .with_id(plugin_id(id, TAIL_TYPE));
        Ok(GenericDirective::flat(meta, self, resolver)?.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logweave_core::NoopSecretResolver;

    #[test]
    fn tail_becomes_source_block() {
        let directive = TailInput::new("input.log")
            .to_directive(&NoopSecretResolver, "test")
            .unwrap();

        let meta = directive.meta();
        assert_eq!(meta.directive, "source");
        assert_eq!(meta.plugin_type.as_deref(), Some("tail"));
        assert_eq!(meta.id.as_deref(), Some("test_tail"));
        assert!(meta.tag.is_none());
        assert_eq!(directive.params().len(), 1);
        assert_eq!(directive.params()["path"], "input.log");
        assert!(directive.sections().is_empty());
    }

    #[test]
    fn optional_fields_are_emitted_when_set() {
        let tail = TailInput {
            pos_file: Some("/var/log/tail.pos".to_owned()),
            read_from_head: Some(false),
            tag: Some("kubernetes.*".to_owned()),
            ..TailInput::new("/var/log/containers/*.log")
        };
        let directive = tail.to_directive(&NoopSecretResolver, "in").unwrap();

        let keys: Vec<&str> = directive.params().keys().map(String::as_str).collect();
        assert_eq!(keys, ["path", "pos_file", "read_from_head", "tag"]);
        assert_eq!(directive.params()["read_from_head"], "false");
    }

    #[test]
    fn empty_path_is_missing_field() {
        let err = TailInput::default()
            .to_directive(&NoopSecretResolver, "test")
            .unwrap_err();
        assert!(matches!(
            err,
            LogweaveError::Validation(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn unknown_yaml_field_is_rejected() {
        let result: Result<TailInput, _> = serde_yaml::from_str("path: a.log\npaht: b.log\n");
        assert!(result.is_err());
    }
}
