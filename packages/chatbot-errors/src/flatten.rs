//! Flattening of nested field-error trees.
//!
//! Validation failures come back keyed by field name. A branch carrying the
//! reserved `_errors` key holds the messages for that field:
//!
//! ```json
//! {"user": {"name": {"_errors": [{"message": "too short"}]}}}
//! ```
//!
//! [`flatten_error_tree`] collapses that into `user.name -> "too short"`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Reserved key marking a leaf list of `{message}` records.
pub const ERRORS_KEY: &str = "_errors";

/// Dotted field path to message, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlattenedErrors(IndexMap<String, String>);

impl FlattenedErrors {
    /// Message recorded for a dotted path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(path, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, msg)| (path.as_str(), msg.as_str()))
    }

    /// Render one `In {path}: {message}` line per entry.
    pub fn to_lines(&self) -> String {
        self.iter()
            .map(|(path, msg)| format!("In {}: {}", path, msg))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Collapse an error tree into dotted paths.
///
/// `prefix` is prepended to every path; pass `""` at the top level. Branches
/// holding `_errors` are leaves: their record messages are space-joined and
/// nothing below them is visited.
pub fn flatten_error_tree(tree: &Map<String, Value>, prefix: &str) -> FlattenedErrors {
    let mut out = IndexMap::new();
    flatten_into(tree, prefix, &mut out);
    FlattenedErrors(out)
}

fn flatten_into(tree: &Map<String, Value>, prefix: &str, out: &mut IndexMap<String, String>) {
    for (key, value) in tree {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(branch) => match branch.get(ERRORS_KEY) {
                Some(records) => {
                    out.insert(path, join_messages(records));
                }
                None => flatten_into(branch, &path, out),
            },
            leaf => {
                out.insert(path, leaf_to_string(leaf));
            }
        }
    }
}

fn join_messages(records: &Value) -> String {
    match records {
        Value::Array(items) => items
            .iter()
            .map(|record| record.get("message").map(leaf_to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" "),
        other => leaf_to_string(other),
    }
}

/// Strings verbatim, everything else in its JSON rendering.
pub(crate) fn leaf_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_empty_tree() {
        let flat = flatten_error_tree(&Map::new(), "");
        assert!(flat.is_empty());
        assert_eq!(flat.to_lines(), "");
    }

    #[test]
    fn test_scalar_leaf() {
        let flat = flatten_error_tree(&tree(json!({"a": "x"})), "");
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("a"), Some("x"));
    }

    #[test]
    fn test_nested_path_is_dotted() {
        let flat = flatten_error_tree(&tree(json!({"a": {"b": "x"}})), "");
        assert_eq!(flat.iter().collect::<Vec<_>>(), vec![("a.b", "x")]);
    }

    #[test]
    fn test_errors_list_is_joined_and_terminates() {
        let flat = flatten_error_tree(
            &tree(json!({
                "a": {
                    "_errors": [{"message": "bad"}, {"message": "worse"}],
                    "nested": {"c": "never visited"}
                }
            })),
            "",
        );
        assert_eq!(flat.iter().collect::<Vec<_>>(), vec![("a", "bad worse")]);
    }

    #[test]
    fn test_record_without_message_yields_empty_entry() {
        let flat = flatten_error_tree(&tree(json!({"a": {"_errors": [{"code": "X"}]}})), "");
        assert_eq!(flat.get("a"), Some(""));
    }

    #[test]
    fn test_prefix_is_applied() {
        let flat = flatten_error_tree(&tree(json!({"name": "required"})), "user");
        assert_eq!(flat.get("user.name"), Some("required"));
    }

    #[test]
    fn test_order_follows_input() {
        let flat = flatten_error_tree(
            &tree(json!({
                "z": "last letter",
                "m": {"_errors": [{"message": "middle"}]},
                "a": {"deep": {"er": "first letter"}}
            })),
            "",
        );
        let paths: Vec<_> = flat.iter().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["z", "m", "a.deep.er"]);
    }

    #[test]
    fn test_non_string_leaves_render_as_json() {
        let flat = flatten_error_tree(&tree(json!({"n": 3, "b": true, "z": null})), "");
        assert_eq!(flat.get("n"), Some("3"));
        assert_eq!(flat.get("b"), Some("true"));
        assert_eq!(flat.get("z"), Some("null"));
    }

    #[test]
    fn test_flat_input_is_unchanged() {
        let input = tree(json!({"a": "x", "b.c": "y"}));
        let once = flatten_error_tree(&input, "");

        let reflattened = match serde_json::to_value(&once).unwrap() {
            Value::Object(map) => flatten_error_tree(&map, ""),
            other => panic!("expected object, got {}", other),
        };

        assert_eq!(once, reflattened);
        assert_eq!(once.iter().collect::<Vec<_>>(), vec![("a", "x"), ("b.c", "y")]);
    }

    #[test]
    fn test_to_lines() {
        let flat = flatten_error_tree(
            &tree(json!({
                "username": {"_errors": [{"message": "too short"}]},
                "avatar": {"size": {"_errors": [{"message": "too big"}]}}
            })),
            "",
        );
        assert_eq!(flat.to_lines(), "In username: too short\nIn avatar.size: too big");
    }
}
