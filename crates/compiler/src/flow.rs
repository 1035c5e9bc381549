//! Flow, Selector, 라벨 도출
//!
//! Flow는 라우팅과 처리의 최소 단위입니다. 라벨은 (namespace, 라벨 집합)만으로
//! 결정되므로 빌드 횟수나 맵 순회 순서와 무관하게 항상 같습니다.
//!
//! # 라벨 도출
//! 1. 라벨 키를 사전순으로 정렬하여 `key:value`를 `,`로 연결
//! 2. namespace(빈 문자열 허용) 뒤에 이어 붙임
//! 3. MD5 다이제스트를 소문자 16진수로 표현
//! 4. 앞에 `@`를 붙임
//!
//! ```
//! use std::collections::BTreeMap;
//! use logweave_compiler::flow::derive_label;
//!
//! let label = derive_label("test", &BTreeMap::<String, String>::new());
//! assert_eq!(label, "@098f6bcd4621d373cade4e832627b4f6");
//! ```
//!
//! 연결 방식 때문에 `("testkey:value", {})`와 `("test", {key: value})`는 같은 라벨이
//! 됩니다. 이런 충돌은 [`System::register_flow`](crate::builder::System::register_flow)에서
//! `DuplicateLabelError`로 드러납니다.

use std::collections::BTreeMap;
use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use logweave_core::{Directive, Params, PluginMeta, ValidationError};

/// 라우팅 대상 라벨 접두어
pub const LABEL_SIGIL: char = '@';

/// 라벨 집합을 정규 문자열(`k1:v1,k2:v2`)로 만듭니다.
///
/// 입력 순서와 무관하게 키 사전순으로 정렬됩니다.
pub fn canonical_labels<K, V>(labels: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = labels.into_iter().collect();
    pairs.sort_by(|a, b| {
        a.0.as_ref()
            .cmp(b.0.as_ref())
            .then_with(|| a.1.as_ref().cmp(b.1.as_ref()))
    });
    pairs
        .iter()
        .map(|(k, v)| format!("{}:{}", k.as_ref(), v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// (namespace, 라벨 집합)에서 라우팅 라벨을 도출합니다.
pub fn derive_label<K, V>(namespace: &str, labels: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let input = format!("{namespace}{}", canonical_labels(labels));
    let digest = Md5::digest(input.as_bytes());
    format!("{LABEL_SIGIL}{}", hex::encode(digest))
}

/// 라우팅 조건
///
/// 라벨 동등 조건, namespace 허용 목록, 부정 플래그로 구성됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selector {
    /// 라벨 동등 조건
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// namespace 허용 목록 (비어 있으면 전체)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    /// 조건 부정
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub negate: bool,
}

impl Selector {
    /// 빈 조건 (모든 레코드에 일치)
    pub fn new() -> Self {
        Self::default()
    }

    /// 라벨 조건을 설정합니다.
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// namespace 허용 목록을 설정합니다.
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// 조건을 부정합니다.
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    /// 조건이 올바른 형태인지 검증합니다.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.labels.keys().any(String::is_empty) {
            return Err(ValidationError::InvalidFlow {
                reason: "selector label keys must not be empty".to_owned(),
            });
        }
        if self.namespaces.iter().any(String::is_empty) {
            return Err(ValidationError::InvalidFlow {
                reason: "selector namespace names must not be empty".to_owned(),
            });
        }
        let multiline = self
            .labels
            .iter()
            .flat_map(|(k, v)| [k, v])
            .chain(&self.namespaces)
            .find(|s| s.contains(['\n', '\r']));
        if let Some(value) = multiline {
            return Err(ValidationError::InvalidFlow {
                reason: format!("selector value {value:?} contains a line break"),
            });
        }
        Ok(())
    }

    /// 라우터의 `<match>` 조건 노드로 변환합니다.
    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria::new(self)
    }
}

/// 라우트 안의 `<match>` 조건 노드
///
/// `labels`, `namespaces`는 비어 있지 않을 때만, `negate`는 참일 때만 나갑니다.
#[derive(Debug, Clone)]
pub struct MatchCriteria {
    meta: PluginMeta,
    params: Params,
}

impl MatchCriteria {
    fn new(selector: &Selector) -> Self {
        let mut params = Params::new();
        if !selector.labels.is_empty() {
            params.insert("labels".to_owned(), canonical_labels(&selector.labels));
        }
        if !selector.namespaces.is_empty() {
            params.insert("namespaces".to_owned(), selector.namespaces.join(","));
        }
        if selector.negate {
            params.insert("negate".to_owned(), "true".to_owned());
        }
        Self {
            meta: PluginMeta::new("match"),
            params,
        }
    }
}

impl Directive for MatchCriteria {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn sections(&self) -> &[Box<dyn Directive>] {
        &[]
    }
}

/// 라우팅 + 처리 단위
///
/// 필터와 출력은 이미 변환된 Directive이며 추가한 순서대로 렌더링됩니다.
#[derive(Debug)]
pub struct Flow {
    namespace: String,
    labels: BTreeMap<String, String>,
    selectors: Vec<Selector>,
    label: String,
    filters: Vec<Box<dyn Directive>>,
    outputs: Vec<Box<dyn Directive>>,
}

impl Flow {
    /// namespace와 라벨 집합으로 Flow를 생성합니다.
    ///
    /// 빈 namespace는 전역 Flow입니다. 기본 Selector는
    /// `namespaces = [namespace]`(비어 있지 않을 때)와 `labels`로 만들어집니다.
    pub fn new(namespace: impl Into<String>, labels: BTreeMap<String, String>) -> Self {
        let namespace = namespace.into();
        let label = derive_label(&namespace, &labels);

        let mut primary = Selector::new().with_labels(labels.clone());
        if !namespace.is_empty() {
            primary = primary.with_namespaces([namespace.as_str()]);
        }

        Self {
            namespace,
            labels,
            selectors: vec![primary],
            label,
            filters: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// 라우팅 조건을 뒤에 추가합니다.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// 필터를 뒤에 추가합니다.
    pub fn with_filter(mut self, filter: Box<dyn Directive>) -> Self {
        self.filters.push(filter);
        self
    }

    /// 필터 여러 개를 순서대로 추가합니다.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Box<dyn Directive>>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// 출력을 뒤에 추가합니다.
    pub fn with_output(mut self, output: Box<dyn Directive>) -> Self {
        self.outputs.push(output);
        self
    }

    /// 출력 여러 개를 순서대로 추가합니다.
    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = Box<dyn Directive>>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// 원본 namespace (비어 있으면 전역)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 라벨 도출에 쓰인 라벨 집합
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// 기본 Selector와 추가 조건
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// 도출된 라우팅 라벨 (`@` + 16진수 다이제스트)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 필터 Directive 목록
    pub fn filters(&self) -> &[Box<dyn Directive>] {
        &self.filters
    }

    /// 출력 Directive 목록
    pub fn outputs(&self) -> &[Box<dyn Directive>] {
        &self.outputs
    }

    /// 등록 전 구조 검증
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.label.len() <= LABEL_SIGIL.len_utf8() || !self.label.starts_with(LABEL_SIGIL) {
            return Err(ValidationError::InvalidFlow {
                reason: format!("label '{}' is not a routing label", self.label),
            });
        }
        if self.selectors.is_empty() {
            return Err(ValidationError::InvalidFlow {
                reason: format!("flow {self} has no selectors"),
            });
        }
        for selector in &self.selectors {
            selector.validate()?;
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Box<dyn Directive>>, Vec<Box<dyn Directive>>) {
        (self.label, self.filters, self.outputs)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "global")?;
        } else {
            write!(f, "namespace '{}'", self.namespace)?;
        }
        write!(f, " labels {{{}}}", canonical_labels(&self.labels))?;
        if self.selectors.len() > 1 {
            write!(f, " (+{} selectors)", self.selectors.len() - 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn reference_labels() {
        assert_eq!(
            derive_label("", &labels(&[])),
            "@d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            derive_label("test", &labels(&[])),
            "@098f6bcd4621d373cade4e832627b4f6"
        );
        assert_eq!(
            derive_label("test", &labels(&[("a", "b"), ("c", "d")])),
            "@2dd0f3725ff86c51a1a6633792b761c2"
        );
        assert_eq!(
            derive_label("ns-test", &labels(&[("key1", "val1"), ("key2", "val2")])),
            "@1e0ff0e1aeca1aad2dbd138f8c7eda9d"
        );
    }

    #[test]
    fn label_ignores_insertion_order() {
        let forward = derive_label("test", [("a", "b"), ("c", "d")]);
        let reverse = derive_label("test", [("c", "d"), ("a", "b")]);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn label_is_stable_across_calls() {
        let first = derive_label("ns-test", [("app", "web")]);
        for _ in 0..10 {
            assert_eq!(derive_label("ns-test", [("app", "web")]), first);
        }
    }

    #[test]
    fn concatenation_collision_is_reproducible() {
        let a = derive_label("testkey:value", &labels(&[]));
        let b = derive_label("test", &labels(&[("key", "value")]));
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_labels_sorted_and_joined() {
        assert_eq!(canonical_labels([("z", "1"), ("a", "2")]), "a:2,z:1");
        assert_eq!(canonical_labels(Vec::<(String, String)>::new()), "");
    }

    #[test]
    fn primary_selector_from_namespace_and_labels() {
        let flow = Flow::new("ns-test", labels(&[("app", "web")]));
        assert_eq!(flow.selectors().len(), 1);
        assert_eq!(flow.selectors()[0].namespaces, ["ns-test"]);
        assert_eq!(flow.selectors()[0].labels, labels(&[("app", "web")]));
        assert!(flow.validate().is_ok());
    }

    #[test]
    fn global_flow_has_no_namespace_constraint() {
        let flow = Flow::new("", labels(&[]));
        assert!(flow.selectors()[0].namespaces.is_empty());
        assert_eq!(flow.label(), "@d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(flow.to_string(), "global labels {}");
    }

    #[test]
    fn criteria_emits_only_meaningful_params() {
        let empty = Selector::new().criteria();
        assert!(empty.params().is_empty());
        assert_eq!(empty.meta().directive, "match");

        let full = Selector::new()
            .with_labels(labels(&[("b", "2"), ("a", "1")]))
            .with_namespaces(["ns1", "ns2"])
            .negated()
            .criteria();
        let params: Vec<(&str, &str)> = full
            .params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            params,
            [("labels", "a:1,b:2"), ("namespaces", "ns1,ns2"), ("negate", "true")]
        );
    }

    #[test]
    fn selector_with_empty_namespace_is_invalid() {
        let flow = Flow::new("ns", labels(&[])).with_selector(Selector::new().with_namespaces([""]));
        assert!(matches!(
            flow.validate(),
            Err(ValidationError::InvalidFlow { .. })
        ));
    }

    #[test]
    fn selector_with_empty_label_key_is_invalid() {
        let selector = Selector::new().with_labels(labels(&[("", "x")]));
        assert!(selector.validate().is_err());
    }

    #[test]
    fn line_break_in_namespace_is_invalid() {
        let flow = Flow::new("ns-test\n</match>\n<match **>", labels(&[]));
        assert!(matches!(
            flow.validate(),
            Err(ValidationError::InvalidFlow { .. })
        ));
    }

    #[test]
    fn line_break_in_selector_label_is_invalid() {
        let value = Selector::new().with_labels(labels(&[("app", "web\r\n@type exec")]));
        assert!(value.validate().is_err());
        let key = Selector::new().with_labels(labels(&[("app\n", "web")]));
        assert!(key.validate().is_err());
        let namespace = Selector::new().with_namespaces(["a\nb"]);
        assert!(namespace.validate().is_err());
    }

    #[test]
    fn selector_deserializes_from_yaml() {
        let selector: Selector =
            serde_yaml::from_str("namespaces: [kube-system]\nnegate: true\n").unwrap();
        assert_eq!(selector, Selector::new().with_namespaces(["kube-system"]).negated());
    }
}
