//! Lenient field lookup shared by the snapshot types.
//!
//! The book server is not the only producer of these payloads. A field may
//! go by several names, numbers may arrive as JSON numbers or numeric
//! strings, and identifiers as either strings or integers.

use serde_json::Value;

/// First non-null value among `keys` (object) or at `slot` (array).
///
/// Names are tried in order and the first one present wins, even when its
/// value turns out to be unusable.
pub(crate) fn field<'a>(value: &'a Value, keys: &[&str], slot: Option<usize>) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .chain(slot.and_then(|i| value.get(i)))
        .find(|v| !v.is_null())
}

/// Finite number from a JSON number or numeric string.
pub(crate) fn value_number(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Display text; `null`/missing become empty.
pub(crate) fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Non-negative whole count, as sent in `count` / `nOrders` fields.
pub(crate) fn as_count(v: f64) -> Option<u64> {
    (v >= 0.0 && v.fract() == 0.0).then_some(v as u64)
}
