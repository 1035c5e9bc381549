//! parser 필터 — 레코드의 한 키를 파싱하여 구조화된 필드로 바꿉니다.
//!
//! ```text
//! <filter **>
//!   @type parser
//!   @id {id}_parser
//!   key_name log
//!   <parse>
//!     @type json
//!   </parse>
//! </filter>
//! ```
//!
//! 파싱 규칙은 선언 순서대로 중첩 `<parse>` 섹션이 됩니다.

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, PluginMeta, SecretResolver, ValidationError,
};

use crate::plugin_id;

/// 플러그인 타입 이름
pub const PARSER_TYPE: &str = "parser";

/// parser 필터 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserFilter {
    /// 파싱할 필드 이름 (기본값 `log`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_name: String,
    /// 원본 이벤트 시간 유지
    pub reserve_time: bool,
    /// 원본 키-값 유지
    pub reserve_data: bool,
    /// 파싱 후 `key_name` 필드 제거
    pub remove_key_name_field: bool,
    /// 잘못된 문자열 시퀀스를 안전한 문자로 치환
    pub replace_invalid_sequence: bool,
    /// 파싱된 키 앞에 붙일 접두어
    #[serde(skip_serializing_if = "String::is_empty")]
    pub inject_key_prefix: String,
    /// 파싱 결과를 담을 해시 필드
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hash_value_field: String,
    /// 파싱 실패 레코드를 에러 스트림으로 보냄
    pub emit_invalid_record_to_error: bool,
    /// `<parse>` 섹션 목록
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parsers: Vec<ParseSection>,
}

impl ParserFilter {
    /// 파싱 규칙 하나를 뒤에 추가합니다.
    pub fn with_parser(mut self, parser: ParseSection) -> Self {
        self.parsers.push(parser);
        self
    }
}

impl Parameters for ParserFilter {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("key_name", |c: &Self| ParamValue::Str(&c.key_name)).with_default("log"),
        Field::new("reserve_time", |c: &Self| ParamValue::Bool(c.reserve_time)).omit_empty(),
        Field::new("reserve_data", |c: &Self| ParamValue::Bool(c.reserve_data)).omit_empty(),
        Field::new("remove_key_name_field", |c: &Self| {
            ParamValue::Bool(c.remove_key_name_field)
        })
        .omit_empty(),
        Field::new("replace_invalid_sequence", |c: &Self| {
            ParamValue::Bool(c.replace_invalid_sequence)
        })
        .omit_empty(),
        Field::new("inject_key_prefix", |c: &Self| {
            ParamValue::Str(&c.inject_key_prefix)
        })
        .omit_empty(),
        Field::new("hash_value_field", |c: &Self| ParamValue::Str(&c.hash_value_field))
            .omit_empty(),
        Field::new("emit_invalid_record_to_error", |c: &Self| {
            ParamValue::Bool(c.emit_invalid_record_to_error)
        })
        .omit_empty(),
    ];
}

impl DirectiveConverter for ParserFilter {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        let meta = PluginMeta::new("filter")
            .with_tag("**")
            .with_type(PARSER_TYPE)
            .with_id(plugin_id(id, PARSER_TYPE));
        let mut directive = GenericDirective::flat(meta, self, resolver)?;
        for parser in &self.parsers {
            directive.push_section(parser.to_directive(resolver, id)?);
        }
        Ok(directive.boxed())
    }
}

/// `<parse>` 섹션 명세
///
/// `type`은 `@type` 의사 파라미터로만 나가며 일반 파라미터에는 포함되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSection {
    /// 파서 타입 (regexp, json, none 등)
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub parse_type: String,
    /// 정규식 (regexp 파서)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expression: String,
    /// 시간 필드 이름
    #[serde(skip_serializing_if = "String::is_empty")]
    pub time_key: String,
    /// null로 취급할 값 패턴
    #[serde(skip_serializing_if = "String::is_empty")]
    pub null_value_pattern: String,
    /// 빈 문자열을 null로 취급
    pub null_empty_string: bool,
    /// 시간 필드가 없으면 현재 시간 사용
    pub estimate_current_event: bool,
    /// 시간 필드를 레코드에 유지
    pub keep_time_key: bool,
    /// 필드 타입 변환 규칙 (`field:type,...`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub types: String,
    /// 시간 형식
    #[serde(skip_serializing_if = "String::is_empty")]
    pub time_format: String,
    /// 시간 값 타입 (float, unixtime, string)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub time_type: String,
    /// 로컬 시간으로 해석 (`utc`와 배타적)
    pub local_time: bool,
    /// UTC로 해석 (`local_time`과 배타적)
    pub utc: bool,
    /// 시간대
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
}

impl ParseSection {
    /// 파서 타입만 지정한 섹션을 생성합니다.
    pub fn new(parse_type: impl Into<String>) -> Self {
        Self {
            parse_type: parse_type.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.local_time && self.utc {
            return Err(ValidationError::ExclusiveGroupConflict {
                plugin: "parse".to_owned(),
                options: vec!["local_time".to_owned(), "utc".to_owned()],
            });
        }
        Ok(())
    }
}

impl Parameters for ParseSection {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("expression", |c: &Self| ParamValue::Str(&c.expression)).omit_empty(),
        Field::new("time_key", |c: &Self| ParamValue::Str(&c.time_key)).omit_empty(),
        Field::new("null_value_pattern", |c: &Self| {
            ParamValue::Str(&c.null_value_pattern)
        })
        .omit_empty(),
        Field::new("null_empty_string", |c: &Self| {
            ParamValue::Bool(c.null_empty_string)
        })
        .omit_empty(),
        Field::new("estimate_current_event", |c: &Self| {
            ParamValue::Bool(c.estimate_current_event)
        })
        .omit_empty(),
        Field::new("keep_time_key", |c: &Self| ParamValue::Bool(c.keep_time_key)).omit_empty(),
        Field::new("types", |c: &Self| ParamValue::Str(&c.types)).omit_empty(),
        Field::new("time_format", |c: &Self| ParamValue::Str(&c.time_format)).omit_empty(),
        Field::new("time_type", |c: &Self| ParamValue::Str(&c.time_type)).omit_empty(),
        Field::new("local_time", |c: &Self| ParamValue::Bool(c.local_time)).omit_empty(),
        Field::new("utc", |c: &Self| ParamValue::Bool(c.utc)).omit_empty(),
        Field::new("timezone", |c: &Self| ParamValue::Str(&c.timezone)).omit_empty(),
    ];
}

impl DirectiveConverter for ParseSection {
    /// 섹션은 고유 `@id`를 갖지 않으므로 `id`는 사용하지 않습니다.
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        _id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        self.validate()?;

        let mut meta = PluginMeta::new("parse");
        if !self.parse_type.is_empty() {
            meta = meta.with_type(self.parse_type.as_str());
        }
        Ok(GenericDirective::flat(meta, self, resolver)?.boxed())
    }
}
