//! The canonical in-memory grants model.
//!
//! Maps role name → [`RoleEntry`], where each entry holds the roles it
//! extends plus, per resource, the attribute list granted for each
//! [`Permission`] slot. Two input shapes are accepted when building a model
//! from JSON:
//!
//! - the nested mapping form:
//!   `{ "admin": { "$extend": ["user"], "video": { "create:any": ["*"] } } }`
//!   where a resource value may also be a shorthand list of
//!   `"action:possession"` strings meaning "all attributes";
//! - a flat array of access descriptors:
//!   `[ { "role": "admin", "resource": "video", "action": "create:any" } ]`.

use std::collections::HashMap;

use itertools::Itertools;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::AccessError;
use crate::hierarchy;
use crate::normalize::{normalize_access, normalize_action_possession};
use crate::types::{Access, Permission};
use crate::validate::{has_valid_names, is_filled_string_array, to_string_array, valid_name};

/// Attribute lists granted per permission slot of one resource.
pub type ResourcePermissions = HashMap<Permission, Vec<String>>;

/// One role's slice of the grants model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleEntry {
    /// Roles this role inherits from, in declaration order, no duplicates.
    pub extends: Vec<String>,
    /// Resource name → permission → attribute glob list.
    pub resources: HashMap<String, ResourcePermissions>,
}

/// The full role → resource → permission mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grants {
    roles: HashMap<String, RoleEntry>,
}

impl Grants {
    pub fn new() -> Self {
        Grants::default()
    }

    /// Inspects and restructures a JSON grants definition into the
    /// canonical model. Accepts the nested mapping form or a flat array of
    /// access descriptors.
    pub fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Array(items) => {
                let mut grants = Grants::new();
                for item in items {
                    let access = Access::from_value(item)?;
                    grants.commit(&access, true)?;
                }
                Ok(grants)
            }
            Value::Object(map) => {
                let mut grants = Grants::new();
                let mut extends: Vec<(String, Vec<String>)> = Vec::new();

                for (role_name, item) in map {
                    valid_name(role_name)?;
                    let item = item.as_object().ok_or_else(|| {
                        AccessError::Structure(format!(
                            "role \"{role_name}\" must map to an object"
                        ))
                    })?;

                    let mut entry = RoleEntry::default();
                    for (key, val) in item {
                        if key == "$extend" {
                            let list = extends_list(role_name, val)?;
                            extends.push((role_name.clone(), list));
                        } else {
                            valid_name(key)?;
                            entry
                                .resources
                                .insert(key.clone(), resource_entry(role_name, key, val)?);
                        }
                    }
                    grants.roles.insert(role_name.clone(), entry);
                }

                // Inheritance edges are wired up once every role exists, so
                // unknown-extender and cross-inheritance checks see the full
                // model.
                for (role, extenders) in extends {
                    if extenders.is_empty() {
                        continue;
                    }
                    hierarchy::extend_role(
                        &mut grants,
                        std::slice::from_ref(&role),
                        &extenders,
                    )?;
                }
                Ok(grants)
            }
            other => Err(AccessError::Structure(format!(
                "grants must be an object or an array of access descriptors, got: {other}"
            ))),
        }
    }

    /// Exports the canonical nested mapping form.
    pub fn to_value(&self) -> Value {
        let mut root = serde_json::Map::new();
        for (role, entry) in &self.roles {
            let mut item = serde_json::Map::new();
            if !entry.extends.is_empty() {
                item.insert("$extend".to_string(), json!(entry.extends));
            }
            for (resource, permissions) in &entry.resources {
                let mut slots = serde_json::Map::new();
                for permission in permissions.keys().sorted() {
                    slots.insert(permission.to_string(), json!(permissions[permission]));
                }
                item.insert(resource.clone(), Value::Object(slots));
            }
            root.insert(role.clone(), Value::Object(item));
        }
        Value::Object(root)
    }

    /// Writes a single access descriptor into the model.
    ///
    /// With `normalize_all` the descriptor is fully normalized and
    /// validated first; without it, action and possession are assumed
    /// pre-normalized (the fast path for repeated internal commits).
    /// Target roles are auto-created, but never with reserved names.
    pub fn commit(&mut self, access: &Access, normalize_all: bool) -> Result<(), AccessError> {
        let access = if normalize_all {
            normalize_access(access, true)?
        } else {
            access.clone()
        };

        if access.roles.is_empty() {
            return Err(AccessError::Validation(
                "commit requires at least one role".to_string(),
            ));
        }
        if access.resources.is_empty() {
            return Err(AccessError::Validation(
                "commit requires at least one resource".to_string(),
            ));
        }

        let permission =
            normalize_action_possession(access.action.as_deref(), access.possession.as_deref())?;
        let attributes = match &access.attributes {
            Some(attrs) => attrs.clone(),
            None if access.denied => Vec::new(),
            None => vec!["*".to_string()],
        };

        // Validate every name before touching the model, so a failed
        // commit never partially mutates it.
        has_valid_names(&access.roles)?;
        has_valid_names(&access.resources)?;

        for role in &access.roles {
            let entry = self.roles.entry(role.clone()).or_default();
            for resource in &access.resources {
                entry
                    .resources
                    .entry(resource.clone())
                    .or_default()
                    .insert(permission, attributes.clone());
            }
        }
        Ok(())
    }

    /// Creates empty entries for the given roles if they do not exist yet.
    pub fn pre_create_roles<S: AsRef<str>>(&mut self, roles: &[S]) -> Result<(), AccessError> {
        for role in roles {
            let role = role.as_ref().trim();
            valid_name(role)?;
            self.roles.entry(role.to_string()).or_default();
        }
        Ok(())
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// All role names, sorted.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.keys().cloned().sorted().collect()
    }

    /// The subset of `roles` absent from the model.
    pub fn non_existent_roles<S: AsRef<str>>(&self, roles: &[S]) -> Vec<String> {
        roles
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| !self.has_role(r))
            .map(str::to_string)
            .collect()
    }

    /// All unique resource names granted to at least one role, sorted.
    pub fn resources(&self) -> Vec<String> {
        self.roles
            .values()
            .flat_map(|entry| entry.resources.keys().cloned())
            .unique()
            .sorted()
            .collect()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RoleEntry> {
        self.roles.get(name)
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> &mut RoleEntry {
        self.roles.entry(name.to_string()).or_default()
    }
}

impl Serialize for Grants {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grants {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Grants::from_value(&value).map_err(DeError::custom)
    }
}

fn extends_list(role_name: &str, value: &Value) -> Result<Vec<String>, AccessError> {
    if !value.is_string() && !is_filled_string_array(value) {
        return Err(AccessError::Structure(format!(
            "\"$extend\" of role \"{role_name}\" must be a string or an array of strings"
        )));
    }
    let list = to_string_array(value);
    if list.iter().any(|e| e == role_name) {
        return Err(AccessError::Structure(format!(
            "role \"{role_name}\" cannot extend itself"
        )));
    }
    Ok(list)
}

fn resource_entry(
    role_name: &str,
    resource: &str,
    value: &Value,
) -> Result<ResourcePermissions, AccessError> {
    let mut permissions = ResourcePermissions::new();
    match value {
        // Shorthand: a list of "action:possession" strings, all attributes.
        Value::Array(_) => {
            if !is_filled_string_array(value) {
                return Err(AccessError::Structure(format!(
                    "resource \"{resource}\" of role \"{role_name}\" must be an array of non-empty strings or a permission object"
                )));
            }
            for slot in to_string_array(value) {
                permissions.insert(slot.parse()?, vec!["*".to_string()]);
            }
        }
        Value::Object(slots) => {
            for (slot, attrs) in slots {
                let permission: Permission = slot.parse()?;
                if !is_filled_string_array(attrs)
                    || attrs.as_array().is_some_and(|a| a.is_empty())
                {
                    return Err(AccessError::Structure(format!(
                        "attributes of \"{role_name}\" -> \"{resource}\" -> \"{slot}\" must be a non-empty array of non-empty strings"
                    )));
                }
                permissions.insert(permission, to_string_array(attrs));
            }
        }
        other => {
            return Err(AccessError::Structure(format!(
                "resource \"{resource}\" of role \"{role_name}\" has an invalid value: {other}"
            )));
        }
    }
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Possession};
    use serde_json::json;
    use yare::parameterized;

    fn nested_model() -> Value {
        json!({
            "user": {
                "video": { "read:any": ["*"], "update:own": ["title", "notes"] }
            },
            "admin": {
                "$extend": ["user"],
                "video": { "create:any": ["*"] }
            }
        })
    }

    #[test]
    fn test_from_value_nested_mapping() {
        let grants = Grants::from_value(&nested_model()).unwrap();
        assert_eq!(grants.role_names(), vec!["admin", "user"]);

        let admin = grants.get("admin").unwrap();
        assert_eq!(admin.extends, vec!["user"]);
        let video = admin.resources.get("video").unwrap();
        let create_any = Permission::new(Action::Create, Possession::Any);
        assert_eq!(video[&create_any], vec!["*"]);
    }

    #[test]
    fn test_from_value_shorthand_resource_list() {
        let grants = Grants::from_value(&json!({
            "viewer": { "photo": ["read:any", "read:own"] }
        }))
        .unwrap();
        let photo = &grants.get("viewer").unwrap().resources["photo"];
        let read_any = Permission::new(Action::Read, Possession::Any);
        assert_eq!(photo[&read_any], vec!["*"]);
        assert_eq!(photo.len(), 2);
    }

    #[test]
    fn test_from_value_flat_access_list() {
        let grants = Grants::from_value(&json!([
            { "role": "admin", "resource": "video", "action": "create:any" },
            { "role": "user", "resource": "video", "action": "read", "attributes": ["*", "!secret"] }
        ]))
        .unwrap();

        let read_any = Permission::new(Action::Read, Possession::Any);
        let video = &grants.get("user").unwrap().resources["video"];
        assert_eq!(video[&read_any], vec!["*", "!secret"]);
    }

    #[parameterized(
        reserved_role = { json!({ "$extend": { "video": ["read:any"] } }) },
        role_not_object = { json!({ "admin": "video" }) },
        bad_resource_value = { json!({ "admin": { "video": 42 } }) },
        empty_attr_list = { json!({ "admin": { "video": { "read:any": [] } } }) },
        attr_list_with_empty_string = { json!({ "admin": { "video": { "read:any": ["*", ""] } } }) },
        bad_extend_shape = { json!({ "admin": { "$extend": 42 } }) },
        self_extension = { json!({ "admin": { "$extend": ["admin"] } }) },
        scalar_input = { json!(42) },
    )]
    fn test_from_value_rejects_malformed_input(input: Value) {
        let result = Grants::from_value(&input);
        assert!(matches!(
            result,
            Err(AccessError::Structure(_)) | Err(AccessError::InvalidName(_))
        ));
    }

    #[parameterized(
        unknown_action = { json!({ "admin": { "video": { "destroy:any": ["*"] } } }) },
        shorthand_unknown_action = { json!({ "admin": { "video": ["destroy"] } }) },
    )]
    fn test_from_value_rejects_unparseable_action(input: Value) {
        assert!(matches!(
            Grants::from_value(&input),
            Err(AccessError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_from_value_rejects_unknown_extender() {
        let result = Grants::from_value(&json!({
            "admin": { "$extend": ["ghost"], "video": ["read:any"] }
        }));
        assert!(matches!(result, Err(AccessError::UnknownRole(_))));
    }

    #[test]
    fn test_commit_auto_creates_role() {
        let mut grants = Grants::new();
        let access = Access {
            roles: vec!["editor".to_string()],
            resources: vec!["article".to_string()],
            action: Some("update".to_string()),
            ..Access::default()
        };
        grants.commit(&access, true).unwrap();
        assert!(grants.has_role("editor"));

        let update_any = Permission::new(Action::Update, Possession::Any);
        let article = &grants.get("editor").unwrap().resources["article"];
        assert_eq!(article[&update_any], vec!["*"]);
    }

    #[test]
    fn test_commit_rejects_reserved_role_name() {
        let mut grants = Grants::new();
        let access = Access {
            roles: vec!["$extend".to_string()],
            resources: vec!["video".to_string()],
            action: Some("read".to_string()),
            ..Access::default()
        };
        assert!(matches!(
            grants.commit(&access, true),
            Err(AccessError::InvalidName(_))
        ));
        assert!(grants.is_empty());
    }

    #[test]
    fn test_commit_requires_role_and_resource() {
        let mut grants = Grants::new();
        let access = Access {
            roles: vec!["admin".to_string()],
            action: Some("read".to_string()),
            ..Access::default()
        };
        assert!(matches!(
            grants.commit(&access, true),
            Err(AccessError::Validation(_))
        ));
        // The fast path validates required fields too.
        assert!(matches!(
            grants.commit(&access, false),
            Err(AccessError::Validation(_))
        ));
    }

    #[test]
    fn test_denied_commit_writes_empty_attribute_list() {
        let mut grants = Grants::new();
        let access = Access {
            roles: vec!["user".to_string()],
            resources: vec!["video".to_string()],
            action: Some("delete:any".to_string()),
            denied: true,
            ..Access::default()
        };
        grants.commit(&access, true).unwrap();

        let delete_any = Permission::new(Action::Delete, Possession::Any);
        let video = &grants.get("user").unwrap().resources["video"];
        assert_eq!(video[&delete_any], Vec::<String>::new());
    }

    #[test]
    fn test_to_value_round_trip() {
        let grants = Grants::from_value(&nested_model()).unwrap();
        let exported = grants.to_value();
        let reimported = Grants::from_value(&exported).unwrap();
        assert_eq!(grants, reimported);
    }

    #[test]
    fn test_serde_round_trip() {
        let grants = Grants::from_value(&nested_model()).unwrap();
        let serialized = serde_json::to_value(&grants).unwrap();
        let deserialized: Grants = serde_json::from_value(serialized).unwrap();
        assert_eq!(grants, deserialized);
    }

    #[test]
    fn test_resources_and_lookup_helpers() {
        let mut grants = Grants::from_value(&nested_model()).unwrap();
        grants.pre_create_roles(&["auditor"]).unwrap();

        assert_eq!(grants.resources(), vec!["video"]);
        assert!(grants.has_role("auditor"));
        assert_eq!(
            grants.non_existent_roles(&["admin", "ghost", "auditor"]),
            vec!["ghost"]
        );
    }
}
