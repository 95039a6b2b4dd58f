use serde_json::Value;
use tracing::{debug, info};

use crate::error::AccessError;
use crate::evaluate::{PermissionGrant, union_attrs_of_roles};
use crate::grants::Grants;
use crate::hierarchy;
use crate::normalize::normalize_query;
use crate::types::{Access, Query};

/// The main engine handle: owns the grants model and mediates every
/// mutation and query.
///
/// Mutations fail with [`AccessError::Locked`] after [`lock`](Self::lock);
/// [`into_locked`](Self::into_locked) goes further and consumes the engine
/// into a read-only handle, making illegal mutation a compile error.
///
/// Example:
/// ```rust
/// use grants_core::{AccessControl, Query};
/// use serde_json::json;
///
/// let engine = AccessControl::from_value(&json!({
///     "user": { "video": { "read:any": ["*", "!secret"] } }
/// })).unwrap();
///
/// let grant = engine.query(&Query::new(vec!["user"], "video", "read")).unwrap();
/// assert!(grant.granted());
/// assert_eq!(grant.filter(&json!({"title": "t", "secret": "s"})), json!({"title": "t"}));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessControl {
    grants: Grants,
    locked: bool,
}

impl AccessControl {
    pub fn new() -> Self {
        AccessControl::default()
    }

    /// Builds an engine from a JSON grants definition, either the nested
    /// mapping form or a flat array of access descriptors.
    pub fn from_value(value: &Value) -> Result<Self, AccessError> {
        let grants = Grants::from_value(value)?;
        info!(
            event = "Grants",
            phase = "Loaded",
            roles = grants.role_names().len()
        );
        Ok(AccessControl {
            grants,
            locked: false,
        })
    }

    /// Builds an engine from typed access descriptors.
    pub fn from_accesses(accesses: &[Access]) -> Result<Self, AccessError> {
        let mut engine = AccessControl::new();
        for access in accesses {
            engine.commit(access)?;
        }
        Ok(engine)
    }

    /// Commits a grant or deny descriptor into the model.
    pub fn commit(&mut self, access: &Access) -> Result<(), AccessError> {
        self.ensure_unlocked()?;
        debug!(
            event = "Commit",
            roles = ?access.roles,
            resources = ?access.resources,
            action = ?access.action,
            denied = access.denied
        );
        self.grants.commit(access, true)
    }

    /// Commits a grant: `denied` is cleared regardless of the descriptor.
    pub fn grant(&mut self, access: &Access) -> Result<(), AccessError> {
        self.commit(&Access {
            denied: false,
            ..access.clone()
        })
    }

    /// Commits a deny: the attribute list is forced to empty.
    pub fn deny(&mut self, access: &Access) -> Result<(), AccessError> {
        self.commit(&Access {
            denied: true,
            attributes: None,
            ..access.clone()
        })
    }

    /// Extends each role in `roles` with each role in `extenders`.
    pub fn extend<S: AsRef<str>, E: AsRef<str>>(
        &mut self,
        roles: &[S],
        extenders: &[E],
    ) -> Result<(), AccessError> {
        self.ensure_unlocked()?;
        debug!(
            event = "Extend",
            roles = ?roles.iter().map(|r| r.as_ref()).collect::<Vec<&str>>(),
            extenders = ?extenders.iter().map(|e| e.as_ref()).collect::<Vec<&str>>()
        );
        hierarchy::extend_role(&mut self.grants, roles, extenders)
    }

    /// Pre-creates empty role entries, e.g. ahead of later commits.
    pub fn create_roles<S: AsRef<str>>(&mut self, roles: &[S]) -> Result<(), AccessError> {
        self.ensure_unlocked()?;
        self.grants.pre_create_roles(roles)
    }

    /// Evaluates a query: which attributes do the given roles (and their
    /// inherited roles) hold for the resource and action?
    pub fn query(&self, query: &Query) -> Result<PermissionGrant, AccessError> {
        let normalized = normalize_query(query)?;
        let attributes = union_attrs_of_roles(&self.grants, &normalized)?;
        debug!(
            event = "Query",
            roles = ?normalized.roles,
            resource = %normalized.resource,
            action = ?normalized.action,
            granted = !attributes.is_empty()
        );
        Ok(PermissionGrant::new(
            normalized.roles,
            normalized.resource,
            attributes,
        ))
    }

    /// One-way transition: freezes the grants model. Every subsequent
    /// mutating call fails with [`AccessError::Locked`]; queries keep
    /// working against the frozen state.
    pub fn lock(&mut self) {
        info!(event = "Lock", roles = self.grants.role_names().len());
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Consumes the engine into a handle that only exposes reads.
    pub fn into_locked(self) -> LockedAccessControl {
        LockedAccessControl {
            grants: self.grants,
        }
    }

    pub fn grants(&self) -> &Grants {
        &self.grants
    }

    /// The canonical nested mapping form of the current grants model.
    pub fn to_value(&self) -> Value {
        self.grants.to_value()
    }

    pub fn roles(&self) -> Vec<String> {
        self.grants.role_names()
    }

    pub fn resources(&self) -> Vec<String> {
        self.grants.resources()
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.grants.has_role(name)
    }

    /// The subset of `roles` unknown to the model, for early validation
    /// before a multi-role query.
    pub fn non_existent_roles<S: AsRef<str>>(&self, roles: &[S]) -> Vec<String> {
        self.grants.non_existent_roles(roles)
    }

    fn ensure_unlocked(&self) -> Result<(), AccessError> {
        if self.locked {
            return Err(AccessError::Locked);
        }
        Ok(())
    }
}

/// A read-only engine produced by [`AccessControl::into_locked`]. There is
/// no way back to a mutable engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedAccessControl {
    grants: Grants,
}

impl LockedAccessControl {
    pub fn query(&self, query: &Query) -> Result<PermissionGrant, AccessError> {
        let normalized = normalize_query(query)?;
        let attributes = union_attrs_of_roles(&self.grants, &normalized)?;
        Ok(PermissionGrant::new(
            normalized.roles,
            normalized.resource,
            attributes,
        ))
    }

    pub fn grants(&self) -> &Grants {
        &self.grants
    }

    pub fn to_value(&self) -> Value {
        self.grants.to_value()
    }

    pub fn roles(&self) -> Vec<String> {
        self.grants.role_names()
    }

    pub fn resources(&self) -> Vec<String> {
        self.grants.resources()
    }
}
