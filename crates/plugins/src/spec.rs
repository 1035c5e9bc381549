//! 매니페스트용 플러그인 명세 열거형
//!
//! `type` 키로 플러그인 종류를 구분합니다.
//!
//! ```yaml
//! input: { type: tail, path: /var/log/containers/*.log }
//! filters:
//!   - type: parser
//!     parsers: [ { type: json } ]
//! outputs:
//!   - type: "null"
//! ```
//!
//! 각 열거형은 변형의 변환기로 위임하는 [`DirectiveConverter`]를 구현하므로
//! 호출자는 플러그인 종류를 알 필요가 없습니다.

use serde::{Deserialize, Serialize};

use logweave_core::{Directive, DirectiveConverter, LogweaveError, SecretResolver};

use crate::filter::{DetectExceptionsFilter, ParserFilter, StdoutFilter};
use crate::input::TailInput;
use crate::output::{FileOutput, ForwardOutput, LogzOutput, NullOutput, S3Output};

/// 입력 플러그인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputSpec {
    Tail(TailInput),
}

impl InputSpec {
    /// 플러그인 타입 이름
    pub fn plugin_type(&self) -> &'static str {
        match self {
            Self::Tail(_) => crate::input::tail::TAIL_TYPE,
        }
    }
}

impl DirectiveConverter for InputSpec {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        match self {
            Self::Tail(spec) => spec.to_directive(resolver, id),
        }
    }
}

impl From<TailInput> for InputSpec {
    fn from(spec: TailInput) -> Self {
        Self::Tail(spec)
    }
}

/// 필터 플러그인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterSpec {
    Stdout(StdoutFilter),
    Parser(ParserFilter),
    DetectExceptions(DetectExceptionsFilter),
}

impl FilterSpec {
    /// 플러그인 타입 이름
    pub fn plugin_type(&self) -> &'static str {
        use crate::filter::{detect_exceptions, parser, stdout};

        match self {
            Self::Stdout(_) => stdout::STDOUT_TYPE,
            Self::Parser(_) => parser::PARSER_TYPE,
            Self::DetectExceptions(_) => detect_exceptions::DETECT_EXCEPTIONS_TYPE,
        }
    }
}

impl DirectiveConverter for FilterSpec {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        match self {
            Self::Stdout(spec) => spec.to_directive(resolver, id),
            Self::Parser(spec) => spec.to_directive(resolver, id),
            Self::DetectExceptions(spec) => spec.to_directive(resolver, id),
        }
    }
}

impl From<StdoutFilter> for FilterSpec {
    fn from(spec: StdoutFilter) -> Self {
        Self::Stdout(spec)
    }
}

impl From<ParserFilter> for FilterSpec {
    fn from(spec: ParserFilter) -> Self {
        Self::Parser(spec)
    }
}

impl From<DetectExceptionsFilter> for FilterSpec {
    fn from(spec: DetectExceptionsFilter) -> Self {
        Self::DetectExceptions(spec)
    }
}

/// 출력 플러그인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputSpec {
    Null(NullOutput),
    File(FileOutput),
    S3(S3Output),
    Forward(ForwardOutput),
    Logz(LogzOutput),
}

impl OutputSpec {
    /// 플러그인 타입 이름
    pub fn plugin_type(&self) -> &'static str {
        use crate::output::{file, forward, logz, null, s3};

        match self {
            Self::Null(_) => null::NULL_TYPE,
            Self::File(_) => file::FILE_TYPE,
            Self::S3(_) => s3::S3_TYPE,
            Self::Forward(_) => forward::FORWARD_TYPE,
            Self::Logz(_) => logz::LOGZ_TYPE,
        }
    }
}

impl DirectiveConverter for OutputSpec {
    fn to_directive(
        &self,
        resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        match self {
            Self::Null(spec) => spec.to_directive(resolver, id),
            Self::File(spec) => spec.to_directive(resolver, id),
            Self::S3(spec) => spec.to_directive(resolver, id),
            Self::Forward(spec) => spec.to_directive(resolver, id),
            Self::Logz(spec) => spec.to_directive(resolver, id),
        }
    }
}

impl From<NullOutput> for OutputSpec {
    fn from(spec: NullOutput) -> Self {
        Self::Null(spec)
    }
}

impl From<FileOutput> for OutputSpec {
    fn from(spec: FileOutput) -> Self {
        Self::File(spec)
    }
}

impl From<S3Output> for OutputSpec {
    fn from(spec: S3Output) -> Self {
        Self::S3(spec)
    }
}

impl From<ForwardOutput> for OutputSpec {
    fn from(spec: ForwardOutput) -> Self {
        Self::Forward(spec)
    }
}

impl From<LogzOutput> for OutputSpec {
    fn from(spec: LogzOutput) -> Self {
        Self::Logz(spec)
    }
}
