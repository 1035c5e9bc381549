//! logweave 공통 기반 — Directive 모델, 파라미터 매퍼, 시크릿 리졸버, 에러, 설정
//!
//! # 모듈 구성
//!
//! - [`directive`]: 출력 트리 노드 추상화 ([`Directive`], [`PluginMeta`], [`GenericDirective`])
//! - [`params`]: 필드 테이블 기반 파라미터 매퍼
//! - [`secret`]: 시크릿 참조 해석
//! - [`config`]: logweave.toml 설정
//! - [`metrics`]: 메트릭 이름 상수
//! - [`error`]: 에러 타입
//!
//! # 데이터 흐름
//!
//! ```text
//! typed spec -> ParameterMapper (+ SecretResolver) -> Directive subtree
//! ```

pub mod config;
pub mod directive;
pub mod error;
pub mod metrics;
pub mod params;
pub mod secret;

// --- 주요 타입 re-export ---

// 에러
pub use error::{
    ConfigError, ConversionError, DuplicateLabelError, LogweaveError, RenderError, SecretError,
    ValidationError,
};

// 설정
pub use config::LogweaveConfig;

// Directive 모델
pub use directive::{Directive, DirectiveConverter, GenericDirective, PluginMeta};

// 파라미터 매퍼
pub use params::{Field, ParamValue, ParameterMapper, Parameters, Params, ensure_single_line};

// 시크릿
pub use secret::{
    NoopSecretResolver, Secret, SecretKeyRef, SecretMode, SecretResolver, StoreSecretResolver,
};
