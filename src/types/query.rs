//! Read-only query descriptor.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A permission query: can at least one of `roles` perform `action` on
/// `resource`?
///
/// Roles are evaluated as a union, including every role they transitively
/// extend. `action` accepts bare and compound forms, like
/// [`Access`](super::access::Access).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Query {
    pub roles: Vec<String>,
    pub resource: String,
    pub action: Option<String>,
    pub possession: Option<String>,
}

impl Query {
    pub fn new<S: Into<String>>(roles: Vec<S>, resource: S, action: S) -> Self {
        Query {
            roles: roles.into_iter().map(Into::into).collect(),
            resource: resource.into(),
            action: Some(action.into()),
            possession: None,
        }
    }
}
