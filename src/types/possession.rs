//! Possession qualifier: whose records an action applies to.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Whether a permission covers the subject's own records or any record.
///
/// `Any` includes `Own`; it is the default when a bare action such as
/// `"create"` is given without a possession suffix.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Possession {
    Own,
    #[default]
    Any,
}
