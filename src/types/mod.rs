//! Data model types for the grants engine.
//!
//! Canonical string forms:
//! - Action: `"create"`, `"read"`, `"update"`, `"delete"`
//! - Possession: `"own"`, `"any"`
//! - Permission: `"action:possession"`, e.g. `"read:own"`; a bare action
//!   defaults its possession to `"any"`
//! - Attribute pattern: a glob, optionally negated with a leading `!`,
//!   e.g. `["*", "!secret"]`

mod access;
mod action;
mod permission;
mod possession;
mod query;

pub use access::Access;
pub use action::Action;
pub use permission::Permission;
pub use possession::Possession;
pub use query::Query;
