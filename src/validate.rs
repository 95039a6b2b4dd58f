//! Primitive validators for names and loosely shaped inputs.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::AccessError;

/// Names that cannot be used for roles or resources because they collide
/// with grants-model syntax.
pub static RESERVED_KEYWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["*", "!", "$", "$extend"]));

/// Whether `name` is a usable role/resource name: non-empty after trimming
/// and not a reserved keyword.
pub fn is_valid_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && !RESERVED_KEYWORDS.contains(name)
}

/// The throwing counterpart of [`is_valid_name`].
pub fn valid_name(name: &str) -> Result<(), AccessError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AccessError::InvalidName(name.trim().to_string()))
    }
}

/// Validates every name in the list. Empty lists pass; emptiness is the
/// caller's concern.
pub fn has_valid_names<I, S>(names: I) -> Result<(), AccessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in names {
        valid_name(name.as_ref())?;
    }
    Ok(())
}

/// Non-throwing counterpart of [`has_valid_names`].
pub fn all_valid_names<I, S>(names: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().all(|name| is_valid_name(name.as_ref()))
}

/// Converts a JSON value into an array of strings.
///
/// A single string becomes a one-element array; an array is accepted only
/// when every element is a string. Anything else silently yields `[]` —
/// the host function decides whether an empty result is an error.
pub fn to_string_array(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            strings.unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Whether the value is an array whose items are all non-empty strings.
/// The array itself may be empty.
pub fn is_filled_string_array(value: &Value) -> bool {
    match value {
        Value::Array(items) => items
            .iter()
            .all(|item| item.as_str().is_some_and(|s| !s.is_empty())),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    #[parameterized(
        plain = { "admin", true },
        with_spaces = { "  admin  ", true },
        empty = { "", false },
        whitespace_only = { "   ", false },
        star = { "*", false },
        bang = { "!", false },
        dollar = { "$", false },
        extend_keyword = { "$extend", false },
    )]
    fn test_is_valid_name(name: &str, expected: bool) {
        assert_eq!(is_valid_name(name), expected);
    }

    #[test]
    fn test_valid_name_error_carries_name() {
        assert_eq!(
            valid_name("$extend"),
            Err(AccessError::InvalidName("$extend".to_string()))
        );
    }

    #[test]
    fn test_has_valid_names_passes_empty_list() {
        assert!(has_valid_names(Vec::<String>::new()).is_ok());
    }

    #[test]
    fn test_has_valid_names_rejects_reserved() {
        assert!(has_valid_names(["admin", "*"]).is_err());
        assert!(!all_valid_names(["admin", "*"]));
        assert!(all_valid_names(["admin", "user"]));
    }

    #[parameterized(
        string = { json!("admin"), vec!["admin".to_string()] },
        string_array = { json!(["a", "b"]), vec!["a".to_string(), "b".to_string()] },
        empty_array = { json!([]), vec![] },
        number = { json!(42), vec![] },
        null = { json!(null), vec![] },
        object = { json!({"a": 1}), vec![] },
        mixed_array = { json!(["a", 1]), vec![] },
    )]
    fn test_to_string_array(input: Value, expected: Vec<String>) {
        assert_eq!(to_string_array(&input), expected);
    }

    #[parameterized(
        filled = { json!(["a", "b"]), true },
        empty_array_ok = { json!([]), true },
        empty_string_item = { json!(["a", ""]), false },
        non_string_item = { json!(["a", 1]), false },
        not_an_array = { json!("a"), false },
    )]
    fn test_is_filled_string_array(input: Value, expected: bool) {
        assert_eq!(is_filled_string_array(&input), expected);
    }
}
