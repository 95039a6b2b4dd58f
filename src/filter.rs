//! Glob-based attribute filtering of JSON values.
//!
//! Patterns are dot-notation key paths with `*`/`?` wildcards inside a
//! segment; a leading `!` negates. Per key path, the *last* matching
//! pattern wins, so `["*", "!secret"]` grants everything but `secret` and
//! `["b", "!*", "b"]` still grants `b`. A pattern matching an ancestor
//! covers the whole subtree beneath it.

use regex::Regex;
use serde_json::{Map, Value};

struct CompiledPattern {
    negated: bool,
    segments: Vec<Regex>,
}

impl CompiledPattern {
    /// The pattern fully matches this path or one of its ancestors, so it
    /// decides inclusion for the path.
    fn decides(&self, path: &[&str]) -> bool {
        self.segments.len() <= path.len() && self.matches_prefix(path)
    }

    /// The pattern reaches deeper than this path but matches it so far;
    /// the node must be kept as a container so descendants can match.
    fn targets_descendant(&self, path: &[&str]) -> bool {
        self.segments.len() > path.len() && self.matches_prefix(path)
    }

    fn matches_prefix(&self, path: &[&str]) -> bool {
        self.segments
            .iter()
            .zip(path.iter())
            .all(|(segment, key)| segment.is_match(key))
    }
}

/// Patterns are compiled once per filter invocation and evaluated
/// left-to-right per candidate key.
fn compile_patterns(patterns: &[String]) -> Vec<CompiledPattern> {
    patterns
        .iter()
        .filter_map(|pattern| {
            let pattern = pattern.trim();
            let (negated, body) = match pattern.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, pattern),
            };
            if body.is_empty() {
                return None;
            }
            let segments = body.split('.').map(segment_regex).collect();
            Some(CompiledPattern { negated, segments })
        })
        .collect()
}

fn segment_regex(segment: &str) -> Regex {
    let mut pattern = String::from("^");
    for ch in segment.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    // Everything except the wildcards is escaped, so this cannot fail.
    Regex::new(&pattern).expect("escaped glob segment is a valid regex")
}

fn decision(compiled: &[CompiledPattern], path: &[&str]) -> Option<bool> {
    let mut state = None;
    for pattern in compiled {
        if pattern.decides(path) {
            state = Some(!pattern.negated);
        }
    }
    state
}

fn descends(compiled: &[CompiledPattern], path: &[&str]) -> bool {
    compiled
        .iter()
        .any(|pattern| !pattern.negated && pattern.targets_descendant(path))
}

fn filter_at<'a>(value: &'a Value, path: &[&'a str], compiled: &[CompiledPattern]) -> Option<Value> {
    let included = decision(compiled, path);
    match value {
        Value::Object(map) => {
            if included != Some(true) && !descends(compiled, path) {
                return None;
            }
            let filtered = filter_map(map, path, compiled);
            if included == Some(true) || !filtered.is_empty() {
                Some(Value::Object(filtered))
            } else {
                None
            }
        }
        Value::Array(items) => {
            if included != Some(true) && !descends(compiled, path) {
                return None;
            }
            // Arrays are transparent: elements inherit the array's path.
            let filtered: Vec<Value> = items
                .iter()
                .filter_map(|item| filter_at(item, path, compiled))
                .collect();
            if included == Some(true) || !filtered.is_empty() {
                Some(Value::Array(filtered))
            } else {
                None
            }
        }
        leaf => {
            if included == Some(true) {
                Some(leaf.clone())
            } else {
                None
            }
        }
    }
}

fn filter_map<'a>(
    map: &'a Map<String, Value>,
    path: &[&'a str],
    compiled: &[CompiledPattern],
) -> Map<String, Value> {
    let mut out = Map::new();
    let mut child_path: Vec<&'a str> = path.to_vec();
    for (key, value) in map {
        child_path.push(key);
        if let Some(filtered) = filter_at(value, &child_path, compiled) {
            out.insert(key.clone(), filtered);
        }
        child_path.pop();
    }
    out
}

/// Deep-clones `object`, keeping only the properties matched by the given
/// attribute glob patterns. The input is never mutated and the result
/// shares no state with it. Non-object, non-array input is returned as-is.
pub fn filter(object: &Value, attributes: &[String]) -> Value {
    if attributes.len() == 1 && attributes[0] == "*" {
        return object.clone();
    }
    match object {
        Value::Object(map) => {
            if attributes.is_empty() {
                return Value::Object(Map::new());
            }
            let compiled = compile_patterns(attributes);
            Value::Object(filter_map(map, &[], &compiled))
        }
        Value::Array(_) => filter_all(object, attributes),
        other => other.clone(),
    }
}

/// Applies [`filter`] to every element of an array, or to a single value.
pub fn filter_all(value: &Value, attributes: &[String]) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| filter(item, attributes))
                .collect(),
        ),
        other => filter(other, attributes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    fn attrs(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| p.to_string()).collect()
    }

    #[parameterized(
        star_with_negation = {
            json!({"a": 1, "b": 2, "c": 3}), &["*", "!b"], json!({"a": 1, "c": 3})
        },
        last_match_wins = {
            json!({"a": 1, "b": 2}), &["b", "!*", "b"], json!({"b": 2})
        },
        full_access = {
            json!({"a": 1, "b": {"c": 2}}), &["*"], json!({"a": 1, "b": {"c": 2}})
        },
        empty_patterns_deny_all = {
            json!({"a": 1}), &[], json!({})
        },
        single_key = {
            json!({"a": 1, "b": 2}), &["a"], json!({"a": 1})
        },
        wildcard_within_segment = {
            json!({"id": 1, "idx": 2, "name": "n"}), &["id*"], json!({"id": 1, "idx": 2})
        },
        question_mark = {
            json!({"a1": 1, "a22": 2}), &["a?"], json!({"a1": 1})
        },
    )]
    fn test_filter_flat(input: Value, patterns: &[&str], expected: Value) {
        assert_eq!(filter(&input, &attrs(patterns)), expected);
    }

    #[parameterized(
        nested_exclusion = {
            json!({"account": {"id": 1, "balance": 50}, "name": "n"}),
            &["*", "!account.id"],
            json!({"account": {"balance": 50}, "name": "n"})
        },
        nested_inclusion_only = {
            json!({"account": {"id": 1, "balance": 50}, "name": "n"}),
            &["account.balance"],
            json!({"account": {"balance": 50}})
        },
        ancestor_include_covers_subtree = {
            json!({"account": {"id": 1, "balance": 50}}),
            &["account"],
            json!({"account": {"id": 1, "balance": 50}})
        },
        later_ancestor_include_wins_over_deep_exclusion = {
            json!({"a": {"b": 1}}),
            &["!a.b", "a"],
            json!({"a": {"b": 1}})
        },
        subtree_fully_excluded = {
            json!({"a": {"b": 1}, "c": 2}),
            &["*", "!a"],
            json!({"c": 2})
        },
    )]
    fn test_filter_nested(input: Value, patterns: &[&str], expected: Value) {
        assert_eq!(filter(&input, &attrs(patterns)), expected);
    }

    #[test]
    fn test_filter_arrays_element_wise() {
        let input = json!({"items": [{"id": 1, "secret": "x"}, {"id": 2, "secret": "y"}]});
        let result = filter(&input, &attrs(&["*", "!items.secret"]));
        assert_eq!(result, json!({"items": [{"id": 1}, {"id": 2}]}));
    }

    #[test]
    fn test_filter_all_over_top_level_array() {
        let input = json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}]);
        let result = filter_all(&input, &attrs(&["a"]));
        assert_eq!(result, json!([{"a": 1}, {"a": 3}]));
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let input = json!({"a": 1, "b": {"c": 2}});
        let snapshot = input.clone();
        let _ = filter(&input, &attrs(&["a"]));
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_filter_scalar_passes_through() {
        assert_eq!(filter(&json!(42), &attrs(&["*"])), json!(42));
        assert_eq!(filter(&json!("s"), &attrs(&["a"])), json!("s"));
    }

    #[test]
    fn test_filter_result_is_detached() {
        let input = json!({"a": {"b": 1}});
        let mut result = filter(&input, &attrs(&["*"]));
        result["a"]["b"] = json!(99);
        assert_eq!(input["a"]["b"], json!(1));
    }
}
