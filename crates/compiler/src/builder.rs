//! 빌더 — 입력, 라우터, Flow별 라벨 블록을 최상위 Directive 순서로 조립합니다.
//!
//! [`System`]은 컴파일마다 새로 만들어지고 [`System::build`]에서 소비됩니다.
//! 빌드 간에 남는 상태는 없습니다.
//!
//! # 조립 순서
//! 1. 입력 (`<source>`)
//! 2. 라우터 (`<match **>` `@type label_router`)
//! 3. 등록 순서대로 Flow마다 `<label @...>` 블록
//!
//! 라벨 블록 본문은 필터 다음 출력입니다. 출력이 둘 이상이면 엔진이 출력 목록을
//! 순차 실행하므로 `@type copy` 래퍼 안에 출력마다 `<store>`를 둡니다.
//! 출력이 하나면 래퍼 없이 그대로 둡니다.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use logweave_core::metrics as m;
use logweave_core::{
    Directive, DuplicateLabelError, GenericDirective, LogweaveError, Params, PluginMeta,
    ValidationError,
};

use crate::flow::Flow;
use crate::router::Router;

/// 팬아웃 래퍼 플러그인 타입
pub const COPY_TYPE: &str = "copy";

/// 컴파일 한 번의 조립 상태
#[derive(Debug)]
pub struct System {
    input: Box<dyn Directive>,
    router: Router,
    flows: Vec<Flow>,
    /// 라벨 -> flows 인덱스
    labels: BTreeMap<String, usize>,
}

impl System {
    /// 입력과 빈 라우터로 시스템을 생성합니다.
    pub fn new(input: Box<dyn Directive>, router: Router) -> Self {
        Self {
            input,
            router,
            flows: Vec::new(),
            labels: BTreeMap::new(),
        }
    }

    /// 등록된 Flow 목록 (등록 순서)
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Flow를 검증하고 Flow 목록과 라우터에 추가합니다.
    ///
    /// 이미 등록된 라벨과 같은 라벨을 도출하는 Flow는 [`DuplicateLabelError`]로 거부됩니다.
    /// 동일한 Flow를 다시 등록하는 경우도 엔진이 같은 라벨 블록 두 개를
    /// 받아들이지 못하므로 거부됩니다.
    pub fn register_flow(&mut self, flow: Flow) -> Result<(), LogweaveError> {
        if let Err(e) = flow.validate() {
            metrics::counter!(m::COMPILER_FLOWS_REJECTED_TOTAL).increment(1);
            warn!(flow = %flow, error = %e, "flow rejected");
            return Err(e.into());
        }

        if let Some(&index) = self.labels.get(flow.label()) {
            metrics::counter!(m::COMPILER_FLOWS_REJECTED_TOTAL).increment(1);
            let err = DuplicateLabelError {
                label: flow.label().to_owned(),
                existing: self.flows[index].to_string(),
                incoming: flow.to_string(),
            };
            warn!(label = %err.label, existing = %err.existing, incoming = %err.incoming, "label collision");
            return Err(err.into());
        }

        debug!(
            label = flow.label(),
            flow = %flow,
            filters = flow.filters().len(),
            outputs = flow.outputs().len(),
            "flow registered"
        );
        metrics::counter!(m::COMPILER_FLOWS_REGISTERED_TOTAL).increment(1);

        self.router.add_route(&flow);
        self.labels.insert(flow.label().to_owned(), self.flows.len());
        self.flows.push(flow);
        Ok(())
    }

    /// 최상위 Directive 순서를 조립합니다.
    ///
    /// 문서 전체에서 `@id`는 유일해야 하며 공백이나 줄바꿈을 포함할 수 없습니다.
    pub fn build(self) -> Result<Vec<Box<dyn Directive>>, LogweaveError> {
        let flow_count = self.flows.len();
        let mut document: Vec<Box<dyn Directive>> = Vec::with_capacity(flow_count + 2);
        document.push(self.input);
        document.push(Box::new(self.router));

        for flow in self.flows {
            document.push(label_block(flow).boxed());
        }

        let mut seen = BTreeSet::new();
        for directive in &document {
            check_ids(directive.as_ref(), &mut seen)?;
        }

        metrics::counter!(m::COMPILER_BUILDS_TOTAL, m::LABEL_RESULT => "success").increment(1);
        info!(flows = flow_count, directives = document.len(), "build completed");
        Ok(document)
    }
}

/// 서브트리의 `@id`를 `seen`에 모으며 중복과 공백을 거부합니다.
fn check_ids<'a>(
    directive: &'a dyn Directive,
    seen: &mut BTreeSet<&'a str>,
) -> Result<(), ValidationError> {
    if let Some(id) = directive.meta().id.as_deref() {
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidFlow {
                reason: format!("plugin id {id:?} must be a non-empty word"),
            });
        }
        if !seen.insert(id) {
            return Err(ValidationError::InvalidFlow {
                reason: format!("duplicate plugin id '{id}'"),
            });
        }
    }
    for section in directive.sections() {
        check_ids(section.as_ref(), seen)?;
    }
    Ok(())
}

/// Flow 하나의 `<label @...>` 블록
fn label_block(flow: Flow) -> GenericDirective {
    let (label, filters, mut outputs) = flow.into_parts();
    let mut block = GenericDirective::new(PluginMeta::new("label").with_tag(label));
    for filter in filters {
        block.push_section(filter);
    }

    if outputs.len() > 1 {
        let mut copy = GenericDirective::new(
            PluginMeta::new("match").with_tag("**").with_type(COPY_TYPE),
        );
        for output in outputs {
            copy.push_section(Box::new(StoreDirective::new(output)));
        }
        block.push_section(copy.boxed());
    } else if let Some(output) = outputs.pop() {
        block.push_section(output);
    }
    block
}

/// 팬아웃 래퍼 안의 `<store>` 노드
///
/// 감싼 출력의 `@type`, `@id`, 파라미터, 중첩 섹션을 그대로 노출합니다.
#[derive(Debug)]
pub struct StoreDirective {
    meta: PluginMeta,
    output: Box<dyn Directive>,
}

impl StoreDirective {
    /// 출력 Directive를 `<store>`로 감쌉니다.
    pub fn new(output: Box<dyn Directive>) -> Self {
        let inner = output.meta();
        let meta = PluginMeta {
            directive: "store".to_owned(),
            plugin_type: inner.plugin_type.clone(),
            id: inner.id.clone(),
            label: inner.label.clone(),
            tag: None,
        };
        Self { meta, output }
    }
}

impl Directive for StoreDirective {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn params(&self) -> &Params {
        self.output.params()
    }

    fn sections(&self) -> &[Box<dyn Directive>] {
        self.output.sections()
    }
}
