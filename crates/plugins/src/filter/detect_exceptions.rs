//! detect_exceptions — 여러 줄로 나뉜 예외 스택 트레이스를 한 레코드로 합칩니다.
//!
//! 태그 접두어를 떼어낸 뒤 다시 내보내므로 `<filter>`가 아닌 `<match kubernetes.**>` 블록입니다.

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, PluginMeta, SecretResolver,
};

use crate::plugin_id;

/// 플러그인 타입 이름
pub const DETECT_EXCEPTIONS_TYPE: &str = "detect_exceptions";

/// 매치 태그
const DETECT_EXCEPTIONS_TAG: &str = "kubernetes.**";

/// detect_exceptions 명세
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectExceptionsFilter {
    /// 제거할 태그 접두어 (기본값 `kubernetes`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remove_tag_prefix: String,
    /// 예외 메시지를 담은 필드 (비어 있으면 레코드 전체)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// 감지할 언어 목록
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// 미완성 예외를 내보내기까지의 대기 시간 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiline_flush_interval: Option<f64>,
    /// 한 예외에 합칠 최대 줄 수
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    /// 한 예외에 합칠 최대 바이트 수
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u32>,
    /// 스트림 구분 필드
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stream: String,
}

impl Parameters for DetectExceptionsFilter {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("remove_tag_prefix", |c: &Self| {
            ParamValue::Str(&c.remove_tag_prefix)
        })
        .with_default("kubernetes"),
        Field::new("message", |c: &Self| ParamValue::Str(&c.message)).omit_empty(),
        Field::new("languages", |c: &Self| ParamValue::List(&c.languages)).omit_empty(),
        Field::new("multiline_flush_interval", |c: &Self| {
            ParamValue::opt_float(c.multiline_flush_interval)
        })
        .omit_empty(),
        Field::new("max_lines", |c: &Self| ParamValue::opt_int(c.max_lines)).omit_empty(),
        Field::new("max_bytes", |c: &Self| ParamValue::opt_int(c.max_bytes)).omit_empty(),
        Field::new("stream", |c: &Self| ParamValue::Str(&c.stream)).omit_empty(),
    ];
}

impl DirectiveConverter for DetectExceptionsFilter {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        let meta = PluginMeta::new("match")
            .with_tag(DETECT_EXCEPTIONS_TAG)
            .with_type(DETECT_EXCEPTIONS_TYPE)
            .with_id(plugin_id(id, DETECT_EXCEPTIONS_TYPE));
        Ok(GenericDirective::flat(meta, self, resolver)?.boxed())
    }
}
