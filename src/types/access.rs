//! Commit descriptor written into the grants model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AccessError;
use crate::validate::to_string_array;

/// A grant or deny commit: which role(s) get which action/possession on
/// which resource(s), restricted to which attributes.
///
/// `action` accepts both the bare (`"read"`) and compound (`"read:own"`)
/// forms; an explicit `possession` field takes precedence over the compound
/// suffix. Omitted attributes default to `["*"]` (all attributes) for a
/// grant and `[]` for a deny during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Access {
    pub roles: Vec<String>,
    pub resources: Vec<String>,
    pub action: Option<String>,
    pub possession: Option<String>,
    pub attributes: Option<Vec<String>>,
    pub denied: bool,
}

impl Access {
    pub fn new<S: Into<String>>(roles: Vec<S>, resources: Vec<S>) -> Self {
        Access {
            roles: roles.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
            ..Access::default()
        }
    }

    /// Parse a loosely shaped JSON descriptor, as found in the flat-array
    /// grants input. `role`/`resource`/`attributes` may each be a single
    /// string or an array of strings.
    pub fn from_value(value: &Value) -> Result<Self, AccessError> {
        let obj = value
            .as_object()
            .ok_or_else(|| AccessError::Structure(format!("expected an access object, got: {value}")))?;

        let roles = to_string_array(obj.get("role").unwrap_or(&Value::Null));
        let resources = to_string_array(obj.get("resource").unwrap_or(&Value::Null));
        let attributes = obj.get("attributes").map(to_string_array);
        let action = obj.get("action").and_then(Value::as_str).map(str::to_string);
        let possession = obj
            .get("possession")
            .and_then(Value::as_str)
            .map(str::to_string);
        let denied = obj.get("denied").and_then(Value::as_bool).unwrap_or(false);

        Ok(Access {
            roles,
            resources,
            action,
            possession,
            attributes,
            denied,
        })
    }
}
