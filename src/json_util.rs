//! Typed extractors over `serde_json::Value`, the tagged JSON variant
//! SPEC_FULL.md §9 asks for (already satisfied by `serde_json::Value` itself).

use crate::registries::ALWAYS_ARRAY;
use serde_json::Value;
use std::collections::HashMap;

/// Extracts an `i64` from a JSON number, a numeric string, or returns `None`
/// for anything else. Mirrors the original `MaybeGetInt64` in
/// `examples/original_source/cmd/hiveInterpreter/utils.go`.
pub fn maybe_get_int64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

/// Converts a query-string multimap (`key -> [values]`) into a JSON params
/// object, following the original `Flatten` semantics:
/// - a single value parseable as an integer becomes a JSON number;
/// - keys in `ALWAYS_ARRAY` keep their list shape even with one value;
/// - a single remaining value becomes a JSON string;
/// - otherwise the list of strings is kept as-is.
pub fn flatten(query: &HashMap<String, Vec<String>>) -> Value {
    let mut out = serde_json::Map::new();
    for (key, values) in query {
        let value = if values.len() == 1 {
            if let Ok(n) = values[0].parse::<i64>() {
                Value::Number(n.into())
            } else if ALWAYS_ARRAY.contains(key.as_str()) {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            } else {
                Value::String(values[0].clone())
            }
        } else if ALWAYS_ARRAY.contains(key.as_str()) || values.len() > 1 {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        } else {
            Value::Array(Vec::new())
        };
        out.insert(key.clone(), value);
    }
    Value::Object(out)
}

/// Serializes a value deterministically: `serde_json::Map` defaults to a
/// `BTreeMap` (sorted keys, `preserve_order` not enabled in this crate), and
/// `serde_json` never HTML-escapes. This is the direct equivalent of the
/// original's `jsoniter.Config{SortMapKeys:true,EscapeHTML:false,UseNumber:true}`.
pub fn canonical_bytes(v: &Value) -> Vec<u8> {
    serde_json::to_vec(v).expect("Value serialization is infallible")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maybe_get_int64_handles_number_string_and_other() {
        assert_eq!(maybe_get_int64(&json!(42)), Some(42));
        assert_eq!(maybe_get_int64(&json!("42")), Some(42));
        assert_eq!(maybe_get_int64(&json!("not a number")), None);
        assert_eq!(maybe_get_int64(&json!(true)), None);
    }

    #[test]
    fn flatten_single_int_becomes_number() {
        let mut q = HashMap::new();
        q.insert("limit".to_string(), vec!["10".to_string()]);
        let out = flatten(&q);
        assert_eq!(out["limit"], json!(10));
    }

    #[test]
    fn flatten_always_array_key_stays_array_with_one_value() {
        let mut q = HashMap::new();
        q.insert("accounts".to_string(), vec!["alice".to_string()]);
        let out = flatten(&q);
        assert_eq!(out["accounts"], json!(["alice"]));
    }

    #[test]
    fn flatten_single_string_stays_string() {
        let mut q = HashMap::new();
        q.insert("tag".to_string(), vec!["food".to_string()]);
        let out = flatten(&q);
        assert_eq!(out["tag"], json!("food"));
    }

    #[test]
    fn flatten_multiple_values_stay_array() {
        let mut q = HashMap::new();
        q.insert("tags".to_string(), vec!["a".to_string(), "b".to_string()]);
        let out = flatten(&q);
        assert_eq!(out["tags"], json!(["a", "b"]));
    }

    #[test]
    fn canonical_bytes_sorts_keys() {
        let v = json!({"b": 1, "a": 2});
        let bytes = canonical_bytes(&v);
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(s, r#"{"a":2,"b":1}"#);
    }
}
