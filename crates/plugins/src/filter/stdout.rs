//! stdout 필터

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, GenericDirective, LogweaveError, PluginMeta, SecretResolver,
};

use crate::plugin_id;

/// 플러그인 타입 이름
pub const STDOUT_TYPE: &str = "stdout";

/// 모든 레코드를 그대로 통과시키며 표준 출력에 기록하는 필터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StdoutFilter {}

impl DirectiveConverter for StdoutFilter {
    fn to_directive(
        &self,
        _resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        let meta = PluginMeta::new("filter")
            .with_tag("**")
            .with_type(STDOUT_TYPE)
            .with_id(plugin_id(id, STDOUT_TYPE));
        Ok(GenericDirective::new(meta).boxed())
    }
}
