//! JSON merge helpers for layered configuration.

use serde_json::Value;

/// Merge `overlay` into `base`: objects merge key by key, any other value
/// replaces the base, and an explicit `null` removes the key so a later
/// layer can fall back to the built-in default.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    let (Value::Object(base_map), Value::Object(overlay_map)) = (&mut *base, overlay) else {
        *base = overlay.clone();
        return;
    };
    for (key, value) in overlay_map {
        if value.is_null() {
            base_map.remove(key);
            continue;
        }
        match base_map.get_mut(key) {
            Some(existing) if existing.is_object() && value.is_object() => {
                merge_json_values(existing, value);
            }
            _ if value.is_object() => {
                let mut fresh = Value::Object(serde_json::Map::new());
                merge_json_values(&mut fresh, value);
                base_map.insert(key.clone(), fresh);
            }
            _ => {
                base_map.insert(key.clone(), value.clone());
            }
        }
    }
}
