// src/lib.rs
pub use engine::{AccessControl, LockedAccessControl};
pub use error::AccessError;
pub use evaluate::{PermissionGrant, union_attrs_of_roles};
pub use filter::{filter, filter_all};
pub use grants::{Grants, ResourcePermissions, RoleEntry};
pub use hierarchy::{cross_extending_role, extend_role, flat_roles, flatten_role};
pub use normalize::{normalize_access, normalize_action_possession, normalize_query};
pub use types::{Access, Action, Permission, Possession, Query};
pub use validate::{
    RESERVED_KEYWORDS, all_valid_names, has_valid_names, is_filled_string_array, is_valid_name,
    to_string_array, valid_name,
};

mod engine;
mod error;
mod evaluate;
mod filter;
mod grants;
mod hierarchy;
mod normalize;
mod types;
mod validate;
