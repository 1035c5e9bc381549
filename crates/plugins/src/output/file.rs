//! file 출력

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, Field, GenericDirective, LogweaveError, ParamValue,
    Parameters, SecretResolver, ValidationError,
};

use super::{Buffer, match_all};
use crate::plugin_id;

/// 플러그인 타입 이름
pub const FILE_TYPE: &str = "file";

/// 로컬 파일 출력 명세
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOutput {
    /// 출력 파일 경로 (필수)
    pub path: String,
    /// 기존 파일에 이어쓰기
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
    /// 경로 뒤에 접미어 추가
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_path_suffix: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path_suffix: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub symlink_path: String,
    /// 압축 방식 (gzip)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compress: String,
    /// 버퍼 섹션
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<Buffer>,
}

impl FileOutput {
    /// 경로만 지정한 파일 출력을 생성합니다.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// 버퍼 섹션을 설정합니다.
    pub fn with_buffer(mut self, buffer: Buffer) -> Self {
        self.buffer = Some(buffer);
        self
    }
}

impl Parameters for FileOutput {
    const FIELDS: &'static [Field<Self>] = &[
        Field::new("path", |c: &Self| ParamValue::Str(&c.path)),
        Field::new("append", |c: &Self| ParamValue::opt_bool(c.append)),
        Field::new("add_path_suffix", |c: &Self| {
            ParamValue::opt_bool(c.add_path_suffix)
        }),
        Field::new("path_suffix", |c: &Self| ParamValue::Str(&c.path_suffix)).omit_empty(),
        Field::new("symlink_path", |c: &Self| ParamValue::Str(&c.symlink_path)).omit_empty(),
        Field::new("compress", |c: &Self| ParamValue::Str(&c.compress)).omit_empty(),
    ];
}

impl DirectiveConverter for FileOutput {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        if self.path.is_empty() {
            return Err(ValidationError::MissingField {
                plugin: FILE_TYPE.to_owned(),
                field: "path".to_owned(),
            }
            .into());
        }

        let mut directive = GenericDirective::flat(match_all(FILE_TYPE, id), self, resolver)?;
        if let Some(buffer) = &self.buffer {
            directive.push_section(buffer.to_directive(resolver, &plugin_id(id, FILE_TYPE))?);
        }
        Ok(directive.boxed())
    }
}
