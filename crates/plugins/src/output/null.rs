//! null 출력

use serde::{Deserialize, Serialize};

use logweave_core::{
    Directive, DirectiveConverter, GenericDirective, LogweaveError, SecretResolver,
};

use super::match_all;

/// 플러그인 타입 이름
pub const NULL_TYPE: &str = "null";

/// 모든 레코드를 버리는 출력
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NullOutput {}

impl DirectiveConverter for NullOutput {
    fn to_directive(
        &self,
        _resolver: &dyn SecretResolver,
        id: &str,
    ) -> Result<Box<dyn Directive>, LogweaveError> {
        Ok(GenericDirective::new(match_all(NULL_TYPE, id)).boxed())
    }
}
