//! Canonicalization of query and access descriptors.

use std::str::FromStr;

use crate::error::AccessError;
use crate::types::{Access, Action, Permission, Possession, Query};
use crate::validate::{has_valid_names, valid_name};

/// Resolves an action that may be bare (`"read"`) or compound
/// (`"read:own"`) into a typed [`Permission`].
///
/// An explicit possession wins over the compound suffix; when neither is
/// given, possession defaults to `any`.
pub fn normalize_action_possession(
    action: Option<&str>,
    possession: Option<&str>,
) -> Result<Permission, AccessError> {
    let action = action.ok_or_else(|| AccessError::InvalidAction("undefined".to_string()))?;

    let (action_part, suffix) = match action.split_once(':') {
        Some((a, p)) => (a, Some(p)),
        None => (action, None),
    };

    let action = Action::from_str(action_part.trim())
        .map_err(|_| AccessError::InvalidAction(action_part.trim().to_string()))?;

    let possession = match possession
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or_else(|| suffix.map(str::trim))
    {
        Some(p) => Possession::from_str(p)
            .map_err(|_| AccessError::InvalidPossession(p.to_string()))?,
        None => Possession::default(),
    };

    Ok(Permission::new(action, possession))
}

/// Trims and validates the roles and resource of a query.
pub fn normalize_query(query: &Query) -> Result<Query, AccessError> {
    let roles: Vec<String> = query.roles.iter().map(|r| r.trim().to_string()).collect();
    if roles.is_empty() {
        return Err(AccessError::Validation(
            "query requires at least one role".to_string(),
        ));
    }
    has_valid_names(&roles)?;

    let resource = query.resource.trim().to_string();
    valid_name(&resource)?;

    Ok(Query {
        roles,
        resource,
        action: query.action.clone(),
        possession: query.possession.clone(),
    })
}

/// Trims and validates an access descriptor.
///
/// With `all` set, the descriptor must be complete: non-empty roles and
/// resources and a parseable action/possession. Partial descriptors (built
/// up before a chain terminates) skip that stricter check.
pub fn normalize_access(access: &Access, all: bool) -> Result<Access, AccessError> {
    let roles: Vec<String> = access.roles.iter().map(|r| r.trim().to_string()).collect();
    let resources: Vec<String> = access
        .resources
        .iter()
        .map(|r| r.trim().to_string())
        .collect();
    has_valid_names(&roles)?;
    has_valid_names(&resources)?;

    let mut normalized = Access {
        roles,
        resources,
        action: access.action.clone(),
        possession: access.possession.clone(),
        attributes: access.attributes.clone(),
        denied: access.denied,
    };
    normalized = reset_attributes(&normalized);

    if all {
        if normalized.roles.is_empty() {
            return Err(AccessError::Validation(
                "access descriptor requires at least one role".to_string(),
            ));
        }
        if normalized.resources.is_empty() {
            return Err(AccessError::Validation(
                "access descriptor requires at least one resource".to_string(),
            ));
        }
        let permission = normalize_action_possession(
            normalized.action.as_deref(),
            normalized.possession.as_deref(),
        )?;
        normalized.action = Some(permission.action.to_string());
        normalized.possession = Some(permission.possession.to_string());
    }

    Ok(normalized)
}

/// Re-sets the attributes of an access descriptor: a deny grants nothing,
/// a grant with no explicit attributes grants all.
pub fn reset_attributes(access: &Access) -> Access {
    let attributes = if access.denied {
        Some(Vec::new())
    } else {
        match &access.attributes {
            Some(attrs) if !attrs.is_empty() => Some(attrs.clone()),
            _ => Some(vec!["*".to_string()]),
        }
    };
    Access {
        attributes,
        ..access.clone()
    }
}
