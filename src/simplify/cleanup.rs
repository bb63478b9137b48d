//! Final output scrubbing.

use serde_json::Value;

/// Recursively strip object fields whose value is null, an empty array, or
/// an empty object. Children are scrubbed before their parent is judged, so
/// a container emptied by the scrub disappears too. Running it twice equals
/// running it once.
pub fn remove_empty_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                remove_empty_keys(child);
            }
            map.retain(|_, child| !is_empty(child));
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                remove_empty_keys(item);
            }
        }
        _ => {}
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
