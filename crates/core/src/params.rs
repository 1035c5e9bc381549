//! 파라미터 매퍼 — 타입 있는 플러그인 명세를 정렬된 문자열 맵으로 변환
//!
//! 리플렉션 대신 타입별 선언적 필드 테이블([`Parameters::FIELDS`])을 사용합니다.
//! 각 [`Field`]는 파라미터 이름, 접근자, 기본값, 빈 값 생략 여부를 가집니다.
//!
//! # 매핑 규칙 (필드 테이블 순서대로)
//! 1. 값이 지정되지 않았고(`Unset` 또는 빈 문자열) 기본값이 있으면 기본값 삽입
//! 2. 0값이고 `omit_empty`이면 생략
//! 3. `Unset`이면 생략
//! 4. 시크릿은 [`SecretResolver`]로 해석하여 삽입
//! 5. 나머지는 정규 문자열 표현으로 삽입
//!
//! 블록 문법은 줄 단위이므로 줄바꿈(`\n`, `\r`)이 들어간 문자열과 시크릿 값은
//! 표현할 수 없으며 [`ConversionError`]가 됩니다.
//!
//! 중첩 구조 필드(parse 섹션, buffer 등)는 테이블에 넣지 않고
//! 각 변환기가 별도의 중첩 Directive로 만듭니다.
//!
//! # 사용 예시
//! ```ignore
//! impl Parameters for TailInput {
//!     const FIELDS: &'static [Field<Self>] =
//!         &[Field::new("path", |c: &Self| ParamValue::Str(&c.path))];
//! }
//!
//! let params = ParameterMapper::new(&resolver).map(&tail)?;
//! ```

use std::collections::BTreeMap;

use crate::error::{ConversionError, LogweaveError};
use crate::secret::{Secret, SecretResolver};

/// 정렬된 파라미터 맵 (키는 사전순)
pub type Params = BTreeMap<String, String>;

/// 필드 접근자가 돌려주는 타입 있는 값
#[derive(Debug, Clone, Copy)]
pub enum ParamValue<'a> {
    /// 값이 지정되지 않음
    Unset,
    /// 문자열
    Str(&'a str),
    /// 불리언
    Bool(bool),
    /// 정수
    Int(i64),
    /// 실수
    Float(f64),
    /// 문자열 목록 (JSON 배열로 표현)
    List(&'a [String]),
    /// 시크릿 참조
    Secret(&'a Secret),
}

impl<'a> ParamValue<'a> {
    /// `Option<String>` 필드용 헬퍼
    pub fn opt_str(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Self::Unset, Self::Str)
    }

    /// `Option<bool>` 필드용 헬퍼
    pub fn opt_bool(value: Option<bool>) -> Self {
        value.map_or(Self::Unset, Self::Bool)
    }

    /// 정수형 `Option` 필드용 헬퍼
    pub fn opt_int<I: Into<i64>>(value: Option<I>) -> Self {
        value.map_or(Self::Unset, |v| Self::Int(v.into()))
    }

    /// `Option<f64>` 필드용 헬퍼
    pub fn opt_float(value: Option<f64>) -> Self {
        value.map_or(Self::Unset, Self::Float)
    }

    /// `Option<Secret>` 필드용 헬퍼
    pub fn opt_secret(value: &'a Option<Secret>) -> Self {
        value.as_ref().map_or(Self::Unset, Self::Secret)
    }

    /// 값이 명시되지 않았는지 여부 (기본값 적용 기준)
    ///
    /// 빈 문자열은 미지정으로 봅니다. `Some(false)` 같은 명시적 0값은 지정된 값입니다.
    pub fn is_unspecified(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 0값 여부 (생략 규칙 판단 기준)
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Str(s) => s.is_empty(),
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::List(items) => items.is_empty(),
            Self::Secret(_) => false,
        }
    }
}

/// 필드 테이블의 한 항목
pub struct Field<T> {
    name: &'static str,
    get: for<'a> fn(&'a T) -> ParamValue<'a>,
    default: Option<&'static str>,
    omit_empty: bool,
}

impl<T> Field<T> {
    /// 새 필드를 선언합니다.
    pub const fn new(name: &'static str, get: for<'a> fn(&'a T) -> ParamValue<'a>) -> Self {
        Self {
            name,
            get,
            default: None,
            omit_empty: false,
        }
    }

    /// 0값일 때 사용할 기본값을 지정합니다.
    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// 0값이면 파라미터를 생략합니다.
    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// 파라미터 이름
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 선언된 기본값
    pub fn default_value(&self) -> Option<&'static str> {
        self.default
    }
}

/// 필드 테이블을 가진 플러그인 명세 타입
pub trait Parameters: Sized + 'static {
    /// 파라미터로 평탄화되는 필드 목록
    const FIELDS: &'static [Field<Self>];
}

/// 필드 테이블과 시크릿 리졸버로 파라미터 맵을 만드는 매퍼
pub struct ParameterMapper<'r> {
    resolver: &'r dyn SecretResolver,
}

impl<'r> ParameterMapper<'r> {
    /// 새 매퍼를 생성합니다.
    pub fn new(resolver: &'r dyn SecretResolver) -> Self {
        Self { resolver }
    }

    /// 명세를 정렬된 파라미터 맵으로 변환합니다.
    pub fn map<T: Parameters>(&self, spec: &T) -> Result<Params, LogweaveError> {
        let mut params = Params::new();
        for field in T::FIELDS {
            let value = (field.get)(spec);
            let rendered = match field.default {
                Some(default) if value.is_unspecified() => Some(default.to_owned()),
                _ if value.is_zero()
                    && (field.omit_empty || matches!(value, ParamValue::Unset)) =>
                {
                    None
                }
                _ => Some(self.stringify(field.name, value)?),
            };

            if let Some(rendered) = rendered
                && params.insert(field.name.to_owned(), rendered).is_some()
            {
                return Err(ConversionError {
                    field: field.name.to_owned(),
                    reason: "declared more than once in field table".to_owned(),
                }
                .into());
            }
        }
        Ok(params)
    }

    fn stringify(&self, name: &str, value: ParamValue<'_>) -> Result<String, LogweaveError> {
        match value {
            ParamValue::Unset => Ok(String::new()),
            ParamValue::Str(s) => {
                ensure_single_line(name, s)?;
                Ok(s.to_owned())
            }
            ParamValue::Bool(b) => Ok(b.to_string()),
            ParamValue::Int(i) => Ok(i.to_string()),
            ParamValue::Float(f) if !f.is_finite() => Err(ConversionError {
                field: name.to_owned(),
                reason: format!("{f} has no configuration representation"),
            }
            .into()),
            ParamValue::Float(f) => Ok(f.to_string()),
            ParamValue::List(items) => serde_json::to_string(items).map_err(|e| {
                LogweaveError::from(ConversionError {
                    field: name.to_owned(),
                    reason: e.to_string(),
                })
            }),
            ParamValue::Secret(secret) => {
                let value = self.resolver.resolve(secret)?;
                ensure_single_line(name, &value)?;
                Ok(value)
            }
        }
    }
}

/// 값이 한 줄인지 확인합니다.
///
/// 줄바꿈이 있으면 렌더링된 문서에 다른 Directive가 끼어들 수 있습니다.
pub fn ensure_single_line(field: &str, value: &str) -> Result<(), ConversionError> {
    if value.contains(['\n', '\r']) {
        return Err(ConversionError {
            field: field.to_owned(),
            reason: "value must not contain line breaks".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::{NoopSecretResolver, SecretMode, StoreSecretResolver};

    #[derive(Default)]
    struct Sample {
        zeta: String,
        alpha: Option<String>,
        flag: bool,
        retries: Option<u32>,
        ratio: Option<f64>,
        languages: Vec<String>,
        token: Option<Secret>,
    }

    impl Parameters for Sample {
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("zeta", |c: &Self| ParamValue::Str(&c.zeta)),
            Field::new("alpha", |c: &Self| ParamValue::opt_str(&c.alpha)).with_default("a"),
            Field::new("flag", |c: &Self| ParamValue::Bool(c.flag)).omit_empty(),
            Field::new("retries", |c: &Self| ParamValue::opt_int(c.retries)),
            Field::new("ratio", |c: &Self| ParamValue::opt_float(c.ratio)).omit_empty(),
            Field::new("languages", |c: &Self| ParamValue::List(&c.languages)).omit_empty(),
            Field::new("token", |c: &Self| ParamValue::opt_secret(&c.token)),
        ];
    }

    struct Duplicated {
        path: String,
    }

    impl Parameters for Duplicated {
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("path", |c: &Self| ParamValue::Str(&c.path)),
            Field::new("path", |c: &Self| ParamValue::Str(&c.path)),
        ];
    }

    #[test]
    fn zero_values_follow_default_and_omit_rules() {
        let params = ParameterMapper::new(&NoopSecretResolver)
            .map(&Sample::default())
            .unwrap();
        // zeta는 omit_empty가 아니므로 빈 값으로 남음
        assert_eq!(params.get("zeta").map(String::as_str), Some(""));
        assert_eq!(params.get("alpha").map(String::as_str), Some("a"));
        assert!(!params.contains_key("flag"));
        assert!(!params.contains_key("retries"));
        assert!(!params.contains_key("ratio"));
        assert!(!params.contains_key("languages"));
        assert!(!params.contains_key("token"));
    }

    #[test]
    fn set_values_are_stringified() {
        let sample = Sample {
            zeta: "z".to_owned(),
            alpha: Some("explicit".to_owned()),
            flag: true,
            retries: Some(3),
            ratio: Some(0.1),
            languages: vec!["java".to_owned(), "python".to_owned()],
            token: Some(Secret::inline("s3cr3t")),
        };
        let params = ParameterMapper::new(&NoopSecretResolver)
            .map(&sample)
            .unwrap();
        assert_eq!(params["alpha"], "explicit");
        assert_eq!(params["flag"], "true");
        assert_eq!(params["retries"], "3");
        assert_eq!(params["ratio"], "0.1");
        assert_eq!(params["languages"], r#"["java","python"]"#);
        assert_eq!(params["token"], "s3cr3t");
    }

    #[test]
    fn explicit_false_is_not_replaced_by_default() {
        struct Retry {
            retry_forever: Option<bool>,
        }

        impl Parameters for Retry {
            const FIELDS: &'static [Field<Self>] = &[Field::new("retry_forever", |c: &Self| {
                ParamValue::opt_bool(c.retry_forever)
            })
            .with_default("true")];
        }

        let mapper = ParameterMapper::new(&NoopSecretResolver);
        let unset = mapper.map(&Retry { retry_forever: None }).unwrap();
        assert_eq!(unset["retry_forever"], "true");
        let explicit = mapper
            .map(&Retry {
                retry_forever: Some(false),
            })
            .unwrap();
        assert_eq!(explicit["retry_forever"], "false");
    }

    #[test]
    fn keys_iterate_in_lexicographic_order() {
        let sample = Sample {
            zeta: "z".to_owned(),
            flag: true,
            ..Default::default()
        };
        let params = ParameterMapper::new(&NoopSecretResolver)
            .map(&sample)
            .unwrap();
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "flag", "zeta"]);
    }

    #[test]
    fn non_finite_float_is_conversion_error() {
        let sample = Sample {
            ratio: Some(f64::NAN),
            ..Default::default()
        };
        let err = ParameterMapper::new(&NoopSecretResolver)
            .map(&sample)
            .unwrap_err();
        assert!(matches!(err, LogweaveError::Conversion(ref e) if e.field == "ratio"));
    }

    #[test]
    fn secret_goes_through_resolver() {
        let resolver = StoreSecretResolver::new(SecretMode::Mount, "/secret")
            .with_secret("api", "token", "xyz");
        let sample = Sample {
            token: Some(Secret::value_from("api", "token")),
            ..Default::default()
        };
        let params = ParameterMapper::new(&resolver).map(&sample).unwrap();
        assert_eq!(params["token"], "/secret/api-token");
    }

    #[test]
    fn missing_secret_aborts_mapping() {
        let sample = Sample {
            token: Some(Secret::value_from("api", "token")),
            ..Default::default()
        };
        let err = ParameterMapper::new(&NoopSecretResolver)
            .map(&sample)
            .unwrap_err();
        assert!(matches!(err, LogweaveError::Secret(_)));
    }

    #[test]
    fn line_breaks_in_values_are_conversion_errors() {
        let mapper = ParameterMapper::new(&NoopSecretResolver);
        for zeta in ["in.log\n</source>\n<source>", "a\rb"] {
            let err = mapper
                .map(&Sample {
                    zeta: zeta.to_owned(),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(matches!(err, LogweaveError::Conversion(ref e) if e.field == "zeta"));
        }
    }

    #[test]
    fn line_breaks_in_resolved_secrets_are_conversion_errors() {
        let resolver = StoreSecretResolver::new(SecretMode::Inline, "/secret")
            .with_secret("api", "token", "x\n@type exec");
        let sample = Sample {
            token: Some(Secret::value_from("api", "token")),
            ..Default::default()
        };
        let err = ParameterMapper::new(&resolver).map(&sample).unwrap_err();
        assert!(matches!(err, LogweaveError::Conversion(ref e) if e.field == "token"));
    }

    #[test]
    fn list_items_with_line_breaks_stay_escaped() {
        let sample = Sample {
            languages: vec!["a\nb".to_owned()],
            ..Default::default()
        };
        let params = ParameterMapper::new(&NoopSecretResolver)
            .map(&sample)
            .unwrap();
        assert_eq!(params["languages"], r#"["a\nb"]"#);
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let err = ParameterMapper::new(&NoopSecretResolver)
            .map(&Duplicated {
                path: "/tmp".to_owned(),
            })
            .unwrap_err();
        assert!(matches!(err, LogweaveError::Conversion(_)));
    }
}
