//! CRUD actions a role may perform on a resource.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The type of operation executed on a resource by a role.
///
/// This is classic CRUD: an HTTP POST / database INSERT maps to `Create`,
/// a GET / SELECT to `Read`, and so on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use yare::parameterized;

    #[parameterized(
        create = { "create", Action::Create },
        read = { "read", Action::Read },
        update = { "update", Action::Update },
        delete = { "delete", Action::Delete },
        mixed_case = { "Create", Action::Create },
    )]
    fn test_action_from_str(input: &str, expected: Action) {
        assert_eq!(Action::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_action_rejects_unknown() {
        assert!(Action::from_str("destroy").is_err());
    }

    #[test]
    fn test_action_display_is_lowercase() {
        for action in Action::iter() {
            let s = action.to_string();
            assert_eq!(s, s.to_lowercase());
        }
    }

    #[test]
    fn test_action_serde_form() {
        let serialized = serde_json::to_value(Action::Update).unwrap();
        assert_eq!(serialized, serde_json::json!("update"));
    }
}
