//! Firestore REST value encoding.
//!
//! The `documents:commit` endpoint does not take plain JSON; every field
//! value is wrapped in a typed envelope (`stringValue`, `integerValue`,
//! `mapValue`, ...). This module maps schemaless fixture records onto that
//! encoding. Decoding is not needed: the seeder only writes.

use serde_json::{json, Map, Value};

/// Encode a fixture record as a Firestore `fields` map.
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(fields)
}

/// Encode one JSON value as a Firestore typed value.
///
/// Integral numbers become `integerValue` (Firestore wants them as strings);
/// everything else non-integral becomes `doubleValue`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_encoding() {
        assert_eq!(encode_value(&json!(null)), json!({ "nullValue": null }));
        assert_eq!(encode_value(&json!(true)), json!({ "booleanValue": true }));
        assert_eq!(encode_value(&json!("hi")), json!({ "stringValue": "hi" }));
        assert_eq!(encode_value(&json!(42)), json!({ "integerValue": "42" }));
        assert_eq!(encode_value(&json!(-7)), json!({ "integerValue": "-7" }));
        assert_eq!(encode_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
    }

    #[test]
    fn test_array_encoding() {
        let encoded = encode_value(&json!(["u1", "u2"]));
        assert_eq!(
            encoded,
            json!({ "arrayValue": { "values": [
                { "stringValue": "u1" },
                { "stringValue": "u2" },
            ]}})
        );
    }

    #[test]
    fn test_nested_map_encoding() {
        let record = json!({
            "userId": "u1",
            "age": 30,
            "settings": { "darkMode": true },
        });
        let Value::Object(map) = record else {
            unreachable!()
        };
        let encoded = encode_fields(&map);
        assert_eq!(
            encoded,
            json!({
                "userId": { "stringValue": "u1" },
                "age": { "integerValue": "30" },
                "settings": { "mapValue": { "fields": {
                    "darkMode": { "booleanValue": true },
                }}},
            })
        );
    }
}
