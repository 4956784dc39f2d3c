//! YAML and JSON data handling utilities.

use logtree_types::{LogtreeError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load YAML from string.
pub fn load_yaml(content: &str) -> Result<Value> {
    serde_yaml::from_str(content).map_err(LogtreeError::Yaml)
}

/// Load YAML from file.
pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(LogtreeError::Io)?;
    load_yaml(&content)
}

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    match (&mut base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_val) => {
                        let merged = deep_merge(base_val.take(), overlay_val);
                        *base_val = merged;
                    }
                    None => {
                        base_map.insert(key, overlay_val);
                    }
                }
            }
            base
        }
        (_, overlay_val) => overlay_val,
    }
}
