//! JSON rendering of decoded values.
//!
//! Maps and UDTs become objects whose keys are the generic stringification
//! of the decoded key, sorted by key text. Sequences become arrays. Blobs are
//! standard base64, instants are RFC 3339 in UTC, and decimals and big
//! integers keep every digit.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::SecondsFormat;
use cqlframe_result::Result;
use cqlframe_types::DecodedValue;
use serde_json::{Map, Number, Value as JsonValue};

pub fn to_json(value: &DecodedValue) -> JsonValue {
    match value {
        DecodedValue::Null => JsonValue::Null,
        DecodedValue::Boolean(v) => JsonValue::Bool(*v),
        DecodedValue::Int(v) => JsonValue::from(*v),
        DecodedValue::Varint(v) => JsonValue::from(*v),
        DecodedValue::Time(v) => JsonValue::from(*v),
        DecodedValue::BigInt(v) => exact_number(&v.to_string()),
        DecodedValue::Decimal(v) => exact_number(&v.to_string()),
        // Shortest round-trip text of the single-precision value, so 3.14
        // stays 3.14 rather than its widened binary expansion.
        DecodedValue::Float(v) if v.is_finite() => exact_number(&v.to_string()),
        DecodedValue::Double(v) => Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
        DecodedValue::Float(_) => JsonValue::Null,
        DecodedValue::Text(v) => JsonValue::String(v.clone()),
        DecodedValue::Blob(bytes) => JsonValue::String(STANDARD.encode(bytes)),
        DecodedValue::Uuid(v) => JsonValue::String(v.hyphenated().to_string()),
        DecodedValue::Inet(v) => JsonValue::String(v.to_string()),
        DecodedValue::Date(v) => JsonValue::String(format!("{}T00:00:00Z", v.format("%Y-%m-%d"))),
        DecodedValue::Timestamp(v) => {
            JsonValue::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        DecodedValue::List(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        DecodedValue::Map(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(key.to_string(), to_json(value));
            }
            JsonValue::Object(object)
        }
        DecodedValue::Udt(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), to_json(value)))
                .collect(),
        ),
    }
}

/// Serialize a decoded value to compact JSON text.
pub fn to_json_string(value: &DecodedValue) -> Result<String> {
    Ok(serde_json::to_string(&to_json(value))?)
}

fn exact_number(digits: &str) -> JsonValue {
    match Number::from_str(digits) {
        Ok(number) => JsonValue::Number(number),
        Err(_) => JsonValue::String(digits.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    #[allow(clippy::approx_constant)]
    fn float_keeps_single_precision_text() {
        assert_eq!(to_json_string(&DecodedValue::Float(3.14)).unwrap(), "3.14");
        assert_eq!(to_json(&DecodedValue::Float(f32::NAN)), JsonValue::Null);
    }

    #[test]
    fn bigint_keeps_all_digits() {
        let big: BigInt = "99999999999999999999".parse().unwrap();
        assert_eq!(
            to_json_string(&DecodedValue::BigInt(big)).unwrap(),
            "99999999999999999999"
        );
    }

    #[test]
    fn blob_is_base64() {
        assert_eq!(
            to_json(&DecodedValue::Blob(b"hi".to_vec())),
            JsonValue::String("aGk=".into())
        );
    }
}
