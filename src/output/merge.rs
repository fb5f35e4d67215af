//! Recursive JSON merging
//!
//! Tie-break rules: object keys merge recursively, every other value type
//! (arrays included) is overwritten by the update.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::InitResult;

/// Deep-merge `update` into `base`.
///
/// Nested objects are merged key by key; any non-object value in
/// `update` replaces the corresponding value in `base`.
pub fn deep_merge(base: &mut Value, update: Value) {
    match (base, update) {
        (Value::Object(base_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, update) => *base = update,
    }
}

/// Merge `new_data` into the JSON file at `path` and rewrite it.
///
/// If the file does not exist (or is unreadable/corrupt), `new_data` is
/// written as-is. The result is pretty-printed with a trailing newline.
pub fn merge_json_file(path: &Path, new_data: &Value) -> InitResult<()> {
    let mut merged = match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!("Existing {} is not valid JSON, rewriting: {}", path.display(), e);
                Value::Object(Default::default())
            }
        },
        Err(_) => Value::Object(Default::default()),
    };

    deep_merge(&mut merged, new_data.clone());

    let mut text = serde_json::to_string_pretty(&merged)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_deep_merge_disjoint_keys() {
        let mut base = json!({"a": 1});
        deep_merge(&mut base, json!({"b": 2}));
        assert_eq!(base, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_deep_merge_nested_objects() {
        let mut base = json!({"servers": {"serena": {"command": "uvx"}}});
        deep_merge(&mut base, json!({"servers": {"cipher": {"command": "cipher"}}}));
        assert_eq!(
            base,
            json!({"servers": {
                "serena": {"command": "uvx"},
                "cipher": {"command": "cipher"}
            }})
        );
    }

    #[test]
    fn test_deep_merge_scalar_overwrites() {
        let mut base = json!({"timeout": 300});
        deep_merge(&mut base, json!({"timeout": 600}));
        assert_eq!(base, json!({"timeout": 600}));
    }

    #[test]
    fn test_deep_merge_array_overwrites_not_appends() {
        let mut base = json!({"args": ["--old"]});
        deep_merge(&mut base, json!({"args": ["--new"]}));
        assert_eq!(base, json!({"args": ["--new"]}));
    }

    #[test]
    fn test_deep_merge_object_replaces_scalar() {
        let mut base = json!({"value": 1});
        deep_merge(&mut base, json!({"value": {"nested": true}}));
        assert_eq!(base, json!({"value": {"nested": true}}));
    }

    #[test]
    fn test_merge_json_file_creates_new() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        merge_json_file(&path, &json!({"a": 1})).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_merge_json_file_preserves_existing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, r#"{"keep": {"x": 1}, "shared": {"old": true}}"#).unwrap();

        merge_json_file(&path, &json!({"shared": {"new": false}})).unwrap();

        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["keep"]["x"], 1);
        assert_eq!(value["shared"]["old"], true);
        assert_eq!(value["shared"]["new"], false);
    }

    #[test]
    fn test_merge_json_file_corrupt_existing_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "not json{{{").unwrap();

        merge_json_file(&path, &json!({"a": 1})).unwrap();

        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }
}
