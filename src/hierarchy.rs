//! Role hierarchy resolution: flattening `extends` edges and guarding
//! against self-extension and cross-inheritance.

use std::collections::HashSet;

use crate::error::AccessError;
use crate::grants::Grants;
use crate::validate::has_valid_names;

/// Flattens `role` and everything it transitively extends into an ordered,
/// duplicate-free list: `[role, ...extended]`, depth-first in declaration
/// order of each `extends` list.
///
/// The traversal is iterative with an explicit stack and visited set, so
/// adversarial hierarchies cannot exhaust the call stack. Reaching `role`
/// again through an `extends` edge is a cycle and fails with
/// [`AccessError::CrossExtension`].
pub fn flatten_role(grants: &Grants, role: &str) -> Result<Vec<String>, AccessError> {
    if !grants.has_role(role) {
        return Err(AccessError::UnknownRole(role.to_string()));
    }

    let mut order: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = vec![role.to_string()];

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        let entry = grants
            .get(&current)
            .ok_or_else(|| AccessError::UnknownRole(current.clone()))?;
        order.push(current.clone());

        // Reversed push keeps declaration order on a pop-based stack.
        for extender in entry.extends.iter().rev() {
            if extender == role {
                return Err(AccessError::CrossExtension {
                    role: role.to_string(),
                    extender: current.clone(),
                });
            }
            if !visited.contains(extender) {
                stack.push(extender.clone());
            }
        }
    }
    Ok(order)
}

/// Unions the flattened hierarchies of all given roles, preserving first
/// occurrence order. Fails on unknown roles.
pub fn flat_roles<S: AsRef<str>>(grants: &Grants, roles: &[S]) -> Result<Vec<String>, AccessError> {
    if roles.is_empty() {
        return Err(AccessError::Validation(
            "at least one role is required".to_string(),
        ));
    }
    let mut result: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for role in roles {
        for name in flatten_role(grants, role.as_ref())? {
            if seen.insert(name.clone()) {
                result.push(name);
            }
        }
    }
    Ok(result)
}

/// Like [`flat_roles`], but silently skips roles unknown to the model.
/// Queries use this so an unknown role denies instead of erroring.
pub fn flat_roles_lenient<S: AsRef<str>>(grants: &Grants, roles: &[S]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for role in roles {
        let Ok(flattened) = flatten_role(grants, role.as_ref()) else {
            continue;
        };
        for name in flattened {
            if seen.insert(name.clone()) {
                result.push(name);
            }
        }
    }
    result
}

/// Returns the first of `candidates` that already (transitively) extends
/// `role`, i.e. the candidate whose hierarchy would become circular if it
/// were added as an extender of `role`. Must run *before* the edge is
/// added; checking afterwards would miss the cycle it just created.
pub fn cross_extending_role<S: AsRef<str>>(
    grants: &Grants,
    role: &str,
    candidates: &[S],
) -> Result<Option<String>, AccessError> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate == role || !grants.has_role(candidate) {
            continue;
        }
        if flatten_role(grants, candidate)?.iter().any(|r| r == role) {
            return Ok(Some(candidate.to_string()));
        }
    }
    Ok(None)
}

/// Extends every role in `roles` with every role in `extenders`.
///
/// Extenders must already exist; targets are auto-created. Validation of
/// every (role, extender) pair runs before any mutation, so a failed
/// extend never partially changes the hierarchy.
pub fn extend_role<S: AsRef<str>, E: AsRef<str>>(
    grants: &mut Grants,
    roles: &[S],
    extenders: &[E],
) -> Result<(), AccessError> {
    let roles: Vec<String> = roles.iter().map(|r| r.as_ref().trim().to_string()).collect();
    let extenders: Vec<String> = extenders
        .iter()
        .map(|e| e.as_ref().trim().to_string())
        .collect();

    if roles.is_empty() {
        return Err(AccessError::Validation(
            "at least one role to extend is required".to_string(),
        ));
    }
    if extenders.is_empty() {
        return Err(AccessError::Validation(
            "at least one extender role is required".to_string(),
        ));
    }
    has_valid_names(&roles)?;
    has_valid_names(&extenders)?;

    let unknown = grants.non_existent_roles(&extenders);
    if !unknown.is_empty() {
        return Err(AccessError::UnknownRole(unknown.join(", ")));
    }

    for role in &roles {
        if extenders.iter().any(|e| e == role) {
            return Err(AccessError::SelfExtension(role.clone()));
        }
        if let Some(extender) = cross_extending_role(grants, role, &extenders)? {
            return Err(AccessError::CrossExtension {
                role: role.clone(),
                extender,
            });
        }
    }

    for role in &roles {
        let entry = grants.entry_mut(role);
        for extender in &extenders {
            if !entry.extends.contains(extender) {
                entry.extends.push(extender.clone());
            }
        }
    }
    Ok(())
}
