//! 라벨 라우터 — 문서의 단일 최상위 분기 노드
//!
//! ```text
//! <match **>
//!   @type label_router
//!   @id {router_id}_label_router
//!   <route>
//!     @label @{digest}
//!     <match>
//!       namespaces ns-test
//!     </match>
//!   </route>
//! </match>
//! ```
//!
//! 엔진은 라우트를 위에서부터 평가하여 처음 일치한 곳으로 보내므로
//! 라우트 순서는 Flow 등록 순서를 그대로 따릅니다.

use logweave_core::{Directive, Params, PluginMeta};

use crate::flow::Flow;

/// 라우터 플러그인 타입 이름
pub const ROUTER_TYPE: &str = "label_router";

/// Flow 하나에 대응하는 `<route>` 노드
#[derive(Debug)]
pub struct Route {
    meta: PluginMeta,
    params: Params,
    criteria: Vec<Box<dyn Directive>>,
}

impl Route {
    /// Flow의 라벨과 Selector로 라우트를 만듭니다.
    pub fn for_flow(flow: &Flow) -> Self {
        let criteria = flow
            .selectors()
            .iter()
            .map(|selector| Box::new(selector.criteria()) as Box<dyn Directive>)
            .collect();
        Self {
            meta: PluginMeta::new("route").with_label(flow.label()),
            params: Params::new(),
            criteria,
        }
    }
}

impl Directive for Route {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn sections(&self) -> &[Box<dyn Directive>] {
        &self.criteria
    }
}

/// `<match **>` `@type label_router` 노드
#[derive(Debug)]
pub struct Router {
    meta: PluginMeta,
    params: Params,
    routes: Vec<Box<dyn Directive>>,
}

impl Router {
    /// 라우트 없는 라우터를 생성합니다. `@id`는 `{router_id}_label_router`입니다.
    pub fn new(router_id: &str) -> Self {
        Self {
            meta: PluginMeta::new("match")
                .with_tag("**")
                .with_type(ROUTER_TYPE)
                .with_id(format!("{router_id}_{ROUTER_TYPE}")),
            params: Params::new(),
            routes: Vec::new(),
        }
    }

    /// Flow의 라우트를 뒤에 추가합니다.
    pub fn add_route(&mut self, flow: &Flow) {
        self.routes.push(Box::new(Route::for_flow(flow)));
    }

    /// 등록된 라우트 수
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

impl Directive for Router {
    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn sections(&self) -> &[Box<dyn Directive>] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::flow::Selector;

    #[test]
    fn router_meta() {
        let router = Router::new("test");
        let meta = router.meta();
        assert_eq!(meta.directive, "match");
        assert_eq!(meta.tag.as_deref(), Some("**"));
        assert_eq!(meta.plugin_type.as_deref(), Some("label_router"));
        assert_eq!(meta.id.as_deref(), Some("test_label_router"));
        assert!(router.sections().is_empty());
    }

    #[test]
    fn routes_follow_registration_order() {
        let mut router = Router::new("test");
        let first = Flow::new("first", BTreeMap::new());
        let second = Flow::new("second", BTreeMap::new());
        router.add_route(&first);
        router.add_route(&second);

        let labels: Vec<Option<&str>> = router
            .sections()
            .iter()
            .map(|route| route.meta().label.as_deref())
            .collect();
        assert_eq!(labels, [Some(first.label()), Some(second.label())]);
        assert_eq!(router.route_count(), 2);
    }

    #[test]
    fn route_holds_one_criteria_per_selector() {
        let flow = Flow::new("ns", BTreeMap::new())
            .with_selector(Selector::new().with_namespaces(["other"]).negated());
        let route = Route::for_flow(&flow);

        assert_eq!(route.meta().directive, "route");
        assert!(route.params().is_empty());
        assert_eq!(route.sections().len(), 2);
        assert_eq!(route.sections()[0].params()["namespaces"], "ns");
        assert_eq!(route.sections()[1].params()["negate"], "true");
    }
}
