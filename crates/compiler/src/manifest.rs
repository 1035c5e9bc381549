//! 파이프라인 매니페스트 — 입력, Flow, 플러그인을 선언하는 YAML 문서
//!
//! ```yaml
//! router_id: test
//! input: { type: tail, path: /var/log/containers/*.log }
//! flows:
//!   - name: web
//!     namespace: ns-test
//!     labels: { app: web }
//!     selectors: [ { namespaces: [other], negate: true } ]
//!     filters: [ { type: stdout } ]
//!     outputs: [ { type: "null" } ]
//! secrets:
//!   - { name: s3, key: id, value: AKIAEXAMPLE }
//! ```
//!
//! `router_id`를 생략하면 설정의 `compiler.router_id`를 사용합니다. 입력의 `@id`
//! 접두어도 `router_id`입니다. Flow의 플러그인은 `name`(생략 시 `flow{순번}`)을
//! 접두어로 씁니다.
//! `secrets`는 오프라인 빌드용 인라인 저장소입니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use logweave_core::error::{ConfigError, LogweaveError};
use logweave_core::secret::StoreSecretResolver;
use logweave_core::{DirectiveConverter, SecretResolver};
use logweave_plugins::{FilterSpec, InputSpec, OutputSpec};

use crate::flow::{Flow, Selector};

/// 파이프라인 매니페스트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineManifest {
    /// 라우터 `@id` 접두어 (생략 시 설정값)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<String>,
    /// 입력 플러그인
    pub input: InputSpec,
    /// Flow 목록 (등록 순서 = 라우팅 우선순위)
    #[serde(default)]
    pub flows: Vec<FlowSpec>,
    /// 인라인 시크릿 저장소 항목
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<SecretEntry>,
}

/// 매니페스트의 Flow 선언
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowSpec {
    /// 플러그인 `@id` 접두어 (생략 시 `flow{순번}`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// namespace (비어 있으면 전역)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// 라벨 집합
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// 기본 Selector 뒤에 붙는 추가 조건
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selectors: Vec<Selector>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<OutputSpec>,
}

/// 인라인 시크릿 저장소 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretEntry {
    pub name: String,
    pub key: String,
    pub value: String,
}

impl PipelineManifest {
    /// YAML 파일에서 매니페스트를 읽습니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogweaveError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogweaveError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogweaveError::Io(e)
            }
        })?;
        let manifest = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            flows = manifest.flows.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// YAML 문자열에서 매니페스트를 파싱합니다.
    pub fn parse(yaml: &str) -> Result<Self, LogweaveError> {
        serde_yaml::from_str(yaml).map_err(|e| {
            LogweaveError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 매니페스트의 `secrets` 항목을 저장소에 추가합니다.
    pub fn seed_secrets(&self, resolver: &mut StoreSecretResolver) {
        for entry in &self.secrets {
            resolver.insert(entry.name.as_str(), entry.key.as_str(), entry.value.as_str());
        }
    }
}

impl FlowSpec {
    /// 플러그인 `@id` 접두어
    pub fn id_prefix(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("flow{index}")
        } else {
            self.name.clone()
        }
    }

    /// 선언을 변환하여 [`Flow`]를 만듭니다.
    ///
    /// 플러그인 `@id` 접두어는 `id_prefix`이며, 같은 Flow 안에 같은 타입의
    /// 플러그인이 여럿이면 두 번째부터 `{id_prefix}_{순번}`을 사용합니다.
    pub fn to_flow(
        &self,
        resolver: &dyn SecretResolver,
        id_prefix: &str,
    ) -> Result<Flow, LogweaveError> {
        let mut ids = IdAllocator::new(id_prefix);
        let mut flow = Flow::new(self.namespace.as_str(), self.labels.clone());
        for selector in &self.selectors {
            flow = flow.with_selector(selector.clone());
        }
        for filter in &self.filters {
            let id = ids.next(filter.plugin_type());
            flow = flow.with_filter(filter.to_directive(resolver, &id)?);
        }
        for output in &self.outputs {
            let id = ids.next(output.plugin_type());
            flow = flow.with_output(output.to_directive(resolver, &id)?);
        }
        Ok(flow)
    }
}

/// Flow 안에서 플러그인 타입별 `@id` 접두어를 배정합니다.
struct IdAllocator<'a> {
    prefix: &'a str,
    seen: BTreeMap<&'static str, usize>,
}

impl<'a> IdAllocator<'a> {
    fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            seen: BTreeMap::new(),
        }
    }

    fn next(&mut self, plugin_type: &'static str) -> String {
        let count = self.seen.entry(plugin_type).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.prefix.to_owned()
        } else {
            format!("{}_{}", self.prefix, count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logweave_core::{NoopSecretResolver, SecretMode};
    use logweave_plugins::{NullOutput, StdoutFilter, TailInput};

    const MANIFEST: &str = r#"
router_id: test
input: { type: tail, path: input.log }
flows:
  - name: test
    namespace: ns-test
    labels: { app: web }
    filters: [ { type: stdout } ]
    outputs: [ { type: "null" } ]
secrets:
  - { name: s3, key: id, value: AKIAEXAMPLE }
"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = PipelineManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.router_id.as_deref(), Some("test"));
        assert_eq!(manifest.input, InputSpec::Tail(TailInput::new("input.log")));
        assert_eq!(manifest.flows.len(), 1);

        let flow = &manifest.flows[0];
        assert_eq!(flow.namespace, "ns-test");
        assert_eq!(flow.filters, [FilterSpec::Stdout(StdoutFilter::default())]);
        assert_eq!(flow.outputs, [OutputSpec::Null(NullOutput::default())]);
    }

    #[test]
    fn flows_and_secrets_are_optional() {
        let manifest = PipelineManifest::parse("input: { type: tail, path: a.log }\n").unwrap();
        assert!(manifest.router_id.is_none());
        assert!(manifest.flows.is_empty());
        assert!(manifest.secrets.is_empty());
    }

    #[test]
    fn unknown_top_level_key_is_parse_error() {
        let err = PipelineManifest::parse("input: { type: tail, path: a.log }\nflow: []\n")
            .unwrap_err();
        assert!(matches!(
            err,
            LogweaveError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn seed_secrets_fills_store() {
        let manifest = PipelineManifest::parse(MANIFEST).unwrap();
        let mut resolver = StoreSecretResolver::new(SecretMode::Inline, "/secret");
        manifest.seed_secrets(&mut resolver);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn repeated_plugin_types_get_distinct_ids() {
        let spec = FlowSpec {
            namespace: "ns".to_owned(),
            outputs: vec![
                OutputSpec::Null(NullOutput::default()),
                OutputSpec::Null(NullOutput::default()),
            ],
            ..FlowSpec::default()
        };
        let flow = spec.to_flow(&NoopSecretResolver, "flow").unwrap();
        let ids: Vec<Option<&str>> = flow
            .outputs()
            .iter()
            .map(|o| o.meta().id.as_deref())
            .collect();
        assert_eq!(ids, [Some("flow_null"), Some("flow_2_null")]);
    }

    #[test]
    fn id_prefix_defaults_to_position() {
        let unnamed = FlowSpec::default();
        assert_eq!(unnamed.id_prefix(3), "flow3");
        let named = FlowSpec {
            name: "audit".to_owned(),
            ..FlowSpec::default()
        };
        assert_eq!(named.id_prefix(3), "audit");
    }

    #[tokio::test]
    async fn load_missing_manifest_is_file_not_found() {
        let result = PipelineManifest::load("/nonexistent/pipeline.yaml").await;
        assert!(matches!(
            result,
            Err(LogweaveError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
