// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

use serde_json::Value;

/// Recursively overlay `overlay` onto `base`, keeping keys only `base` knows.
pub(super) fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = if let Some(base_val) = base_map.remove(&key) {
                    deep_merge(base_val, overlay_val)
                } else {
                    overlay_val
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_base, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge_keeps_unknown_keys() {
        let base = json!({"backend": {"base_url": "a", "legacy": 1}, "extra": true});
        let overlay = json!({"backend": {"base_url": "b"}});
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["backend"]["base_url"], "b");
        assert_eq!(merged["backend"]["legacy"], 1);
        assert_eq!(merged["extra"], true);
    }

    #[test]
    fn test_deep_merge_scalar_overlay_wins() {
        assert_eq!(deep_merge(json!(1), json!("x")), json!("x"));
    }
}
