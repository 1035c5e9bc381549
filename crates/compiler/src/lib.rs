#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`flow`]: Flow, Selector, 라벨 도출
//! - [`router`]: 라벨 라우터와 라우트 노드
//! - [`builder`]: 최상위 Directive 순서 조립 ([`System`])
//! - [`render`]: 블록 문법 / JSON 렌더러
//! - [`manifest`]: YAML 파이프라인 매니페스트
//!
//! # 데이터 흐름
//!
//! ```text
//! PipelineManifest -> plugin converters -> Flow -> System::register_flow
//!                  -> System::build -> Renderer -> document
//! ```

pub mod builder;
pub mod flow;
pub mod manifest;
pub mod render;
pub mod router;

// --- 주요 타입 re-export ---

pub use builder::{StoreDirective, System};
pub use flow::{Flow, MatchCriteria, Selector, derive_label};
pub use manifest::{FlowSpec, PipelineManifest, SecretEntry};
pub use render::{FluentRenderer, JsonRenderer, Renderer, renderer_for};
pub use router::{Route, Router};

use tracing::{info, warn};

use logweave_core::config::CompilerConfig;
use logweave_core::metrics as m;
use logweave_core::{ConfigError, Directive, DirectiveConverter, LogweaveError, SecretResolver};

/// 매니페스트를 변환, 등록, 조립하여 최상위 Directive 순서를 만듭니다.
///
/// 매니페스트에 `router_id`가 없으면 `default_router_id`를 사용합니다.
/// 문서 전체에서 `@id`는 유일해야 하며, 공백이나 줄바꿈을 포함할 수 없습니다.
/// 첫 번째 에러에서 중단하며 부분 결과는 없습니다.
pub fn assemble(
    manifest: &PipelineManifest,
    resolver: &dyn SecretResolver,
    default_router_id: &str,
) -> Result<Vec<Box<dyn Directive>>, LogweaveError> {
    let result = try_assemble(manifest, resolver, default_router_id);
    if let Err(e) = &result {
        metrics::counter!(m::COMPILER_BUILDS_TOTAL, m::LABEL_RESULT => "failure").increment(1);
        warn!(error = %e, "build failed");
    }
    result
}

fn try_assemble(
    manifest: &PipelineManifest,
    resolver: &dyn SecretResolver,
    default_router_id: &str,
) -> Result<Vec<Box<dyn Directive>>, LogweaveError> {
    let router_id = manifest.router_id.as_deref().unwrap_or(default_router_id);
    let input = manifest.input.to_directive(resolver, router_id)?;
    let mut system = System::new(input, Router::new(router_id));

    for (index, spec) in manifest.flows.iter().enumerate() {
        let flow = spec.to_flow(resolver, &spec.id_prefix(index))?;
        system.register_flow(flow)?;
    }
    system.build()
}

/// 매니페스트를 설정의 형식으로 렌더링한 문서를 돌려줍니다.
pub fn compile(
    manifest: &PipelineManifest,
    resolver: &dyn SecretResolver,
    settings: &CompilerConfig,
) -> Result<String, LogweaveError> {
    let renderer = renderer_for(&settings.format, settings.indent).ok_or_else(|| {
        LogweaveError::from(ConfigError::InvalidValue {
            field: "compiler.format".to_owned(),
            reason: format!("unknown output format '{}'", settings.format),
        })
    })?;

    let document = assemble(manifest, resolver, &settings.router_id)?;
    let text = renderer.render_to_string(&document)?;
    info!(
        format = renderer.format_name(),
        bytes = text.len(),
        "document rendered"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logweave_core::{NoopSecretResolver, ValidationError};

    const MANIFEST: &str = r#"
input: { type: tail, path: input.log }
flows:
  - namespace: ns-test
    outputs: [ { type: "null" } ]
"#;

    #[test]
    fn router_id_falls_back_to_settings() {
        let manifest = PipelineManifest::parse(MANIFEST).unwrap();
        let document = assemble(&manifest, &NoopSecretResolver, "cluster").unwrap();
        assert_eq!(document[0].meta().id.as_deref(), Some("cluster_tail"));
        assert_eq!(
            document[1].meta().id.as_deref(),
            Some("cluster_label_router")
        );
    }

    #[test]
    fn unnamed_flow_uses_positional_prefix() {
        let manifest = PipelineManifest::parse(MANIFEST).unwrap();
        let document = assemble(&manifest, &NoopSecretResolver, "cluster").unwrap();
        let output = &document[2].sections()[0];
        assert_eq!(output.meta().id.as_deref(), Some("flow0_null"));
    }

    fn duplicate_id_reason(yaml: &str) -> String {
        let manifest = PipelineManifest::parse(yaml).unwrap();
        match assemble(&manifest, &NoopSecretResolver, "cluster").unwrap_err() {
            LogweaveError::Validation(ValidationError::InvalidFlow { reason }) => reason,
            other => panic!("expected invalid flow, got {other:?}"),
        }
    }

    #[test]
    fn flows_sharing_a_name_are_rejected() {
        let reason = duplicate_id_reason(
            r#"
input: { type: tail, path: input.log }
flows:
  - name: web
    namespace: ns-a
    outputs: [ { type: "null" } ]
  - name: web
    namespace: ns-b
    outputs: [ { type: "null" } ]
"#,
        );
        assert_eq!(reason, "duplicate plugin id 'web_null'");
    }

    #[test]
    fn flow_name_colliding_with_allocated_suffix_is_rejected() {
        let reason = duplicate_id_reason(
            r#"
input: { type: tail, path: input.log }
flows:
  - name: web
    namespace: ns-a
    outputs: [ { type: "null" }, { type: "null" } ]
  - name: web_2
    namespace: ns-b
    outputs: [ { type: "null" } ]
"#,
        );
        assert_eq!(reason, "duplicate plugin id 'web_2_null'");
    }

    #[test]
    fn flow_name_with_whitespace_is_rejected() {
        let reason = duplicate_id_reason(
            r#"
input: { type: tail, path: input.log }
flows:
  - name: "web app"
    namespace: ns-a
    outputs: [ { type: "null" } ]
"#,
        );
        assert!(reason.contains("web app"));
    }

    #[test]
    fn unknown_format_is_config_error() {
        let manifest = PipelineManifest::parse(MANIFEST).unwrap();
        let settings = CompilerConfig {
            format: "yaml".to_owned(),
            ..CompilerConfig::default()
        };
        let err = compile(&manifest, &NoopSecretResolver, &settings).unwrap_err();
        assert!(matches!(
            err,
            LogweaveError::Config(ConfigError::InvalidValue { .. })
        ));
    }
}
