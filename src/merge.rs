use serde_json::{Map, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides hold a mapping for the same key, recurse.
/// Otherwise, `overlay`'s value wins. Sequences are replaced, not appended.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_maps(base, overlay)),
        (_, overlay) => overlay,
    }
}

fn merge_maps(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_val) in overlay {
        match base.get_mut(&key) {
            Some(slot) => {
                let base_val = std::mem::take(slot);
                *slot = deep_merge(base_val, overlay_val);
            }
            None => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}
