//! Permission evaluation: unioning granted attributes across roles.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AccessError;
use crate::filter;
use crate::grants::Grants;
use crate::hierarchy::flat_roles_lenient;
use crate::normalize::{normalize_action_possession, normalize_query};
use crate::types::Query;

/// Unions the granted attribute patterns for all queried roles (and every
/// role they transitively extend) on one resource/permission slot.
///
/// Each role's pattern list is appended in hierarchy traversal order, so a
/// later role's `!x` can still exclude an attribute an earlier role
/// granted, and a later include re-grants it (the filter applies
/// last-match-wins per key). Roles unknown to the model contribute
/// nothing; an empty result means the permission is denied.
pub fn union_attrs_of_roles(grants: &Grants, query: &Query) -> Result<Vec<String>, AccessError> {
    let query = normalize_query(query)?;
    let permission =
        normalize_action_possession(query.action.as_deref(), query.possession.as_deref())?;

    let mut attributes: Vec<String> = Vec::new();
    for role in flat_roles_lenient(grants, &query.roles) {
        let Some(entry) = grants.get(&role) else {
            continue;
        };
        let Some(resource) = entry.resources.get(&query.resource) else {
            continue;
        };
        let Some(patterns) = resource.get(&permission) else {
            continue;
        };
        for pattern in patterns {
            // A pattern repeated back-to-back cannot change the outcome.
            if attributes.last().is_some_and(|last| last == pattern) {
                continue;
            }
            attributes.push(pattern.clone());
        }
    }
    Ok(attributes)
}

/// The outcome of a query: which attribute patterns the given roles hold
/// for the resource, ready to drive [`filter`](crate::filter::filter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    roles: Vec<String>,
    resource: String,
    attributes: Vec<String>,
}

impl PermissionGrant {
    pub(crate) fn new(roles: Vec<String>, resource: String, attributes: Vec<String>) -> Self {
        PermissionGrant {
            roles,
            resource,
            attributes,
        }
    }

    /// Whether any attribute is granted at all. An empty attribute list is
    /// a denial; `["*"]` is full access.
    pub fn granted(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Applies the granted attribute patterns to a data object.
    pub fn filter(&self, data: &Value) -> Value {
        filter::filter(data, &self.attributes)
    }

    /// Applies the granted attribute patterns to an array of data objects.
    pub fn filter_all(&self, data: &Value) -> Value {
        filter::filter_all(data, &self.attributes)
    }
}
