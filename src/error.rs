use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The single error family for the grants engine.
///
/// Callers can test "is this a grants error" generically by matching on the
/// type; each variant carries the offending value(s) for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessError {
    #[error("invalid or reserved name: \"{0}\"")]
    InvalidName(String),

    #[error("invalid grants structure: {0}")]
    Structure(String),

    #[error("invalid action: \"{0}\"")]
    InvalidAction(String),

    #[error("invalid possession: \"{0}\"")]
    InvalidPossession(String),

    #[error("cannot inherit non-existent role(s): \"{0}\"")]
    UnknownRole(String),

    #[error("a role cannot extend itself: \"{0}\"")]
    SelfExtension(String),

    #[error("cross inheritance is not allowed: role \"{extender}\" already extends \"{role}\"")]
    CrossExtension { role: String, extender: String },

    #[error("invalid access descriptor: {0}")]
    Validation(String),

    #[error("cannot alter the underlying grants model: the engine is locked")]
    Locked,
}
