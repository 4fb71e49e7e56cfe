use serde_json::Value;

/// Follow `key_path` through nested JSON objects.
///
/// Returns the input itself for an empty path, and `None` as soon as a key is
/// missing or the current value is not an object. A present `null` comes back
/// as `Some(Value::Null)`.
pub fn get_value<'a>(value: &'a Value, key_path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in key_path {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

/// Read a temperature that upstreams may send either as a JSON number or as a quoted number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
