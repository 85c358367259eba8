//! Values produced by decoding a raw [`Value`](crate::Value) against its
//! [`TypeSpec`](crate::TypeSpec).

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use num_bigint::BigInt;
use uuid::Uuid;

use crate::DecimalValue;

/// A decoded, native value: a scalar, a sequence, or a map.
///
/// Lists, sets and tuples all decode to [`DecodedValue::List`]; sets are not
/// deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Null,
    Boolean(bool),
    Int(i64),
    BigInt(BigInt),
    Varint(u64),
    Float(f32),
    Double(f64),
    Decimal(DecimalValue),
    Text(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Inet(IpAddr),
    Date(NaiveDate),
    /// Nanoseconds since midnight.
    Time(u64),
    Timestamp(DateTime<Utc>),
    List(Vec<DecodedValue>),
    /// Entries in first-insertion order, keys unique.
    Map(Vec<(DecodedValue, DecodedValue)>),
    Udt(BTreeMap<String, DecodedValue>),
}

impl DecodedValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DecodedValue::Null => "null",
            DecodedValue::Boolean(_) => "boolean",
            DecodedValue::Int(_) => "int",
            DecodedValue::BigInt(_) => "bigint",
            DecodedValue::Varint(_) => "varint",
            DecodedValue::Float(_) => "float",
            DecodedValue::Double(_) => "double",
            DecodedValue::Decimal(_) => "decimal",
            DecodedValue::Text(_) => "text",
            DecodedValue::Blob(_) => "blob",
            DecodedValue::Uuid(_) => "uuid",
            DecodedValue::Inet(_) => "inet",
            DecodedValue::Date(_) => "date",
            DecodedValue::Time(_) => "time",
            DecodedValue::Timestamp(_) => "timestamp",
            DecodedValue::List(_) => "list",
            DecodedValue::Map(_) => "map",
            DecodedValue::Udt(_) => "udt",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DecodedValue::Null)
    }

    /// Insert into a map's entry list; an equal key replaces its value.
    pub fn insert_entry(
        entries: &mut Vec<(DecodedValue, DecodedValue)>,
        key: DecodedValue,
        value: DecodedValue,
    ) {
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }
}

/// Generic stringification, used when map keys must become object keys.
impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => f.write_str("null"),
            DecodedValue::Boolean(v) => write!(f, "{v}"),
            DecodedValue::Int(v) => write!(f, "{v}"),
            DecodedValue::BigInt(v) => write!(f, "{v}"),
            DecodedValue::Varint(v) => write!(f, "{v}"),
            DecodedValue::Float(v) => write!(f, "{v}"),
            DecodedValue::Double(v) => write!(f, "{v}"),
            DecodedValue::Decimal(v) => write!(f, "{v}"),
            DecodedValue::Text(v) => f.write_str(v),
            DecodedValue::Blob(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            DecodedValue::Uuid(v) => write!(f, "{}", v.hyphenated()),
            DecodedValue::Inet(v) => write!(f, "{v}"),
            DecodedValue::Date(v) => write!(f, "{v}"),
            DecodedValue::Time(v) => write!(f, "{v}"),
            DecodedValue::Timestamp(v) => {
                f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DecodedValue::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            DecodedValue::Map(entries) => {
                f.write_str("map[")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
            DecodedValue::Udt(fields) => {
                f.write_str("{")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for DecodedValue {
    fn from(v: &str) -> Self {
        DecodedValue::Text(v.to_string())
    }
}

impl From<String> for DecodedValue {
    fn from(v: String) -> Self {
        DecodedValue::Text(v)
    }
}

impl From<i64> for DecodedValue {
    fn from(v: i64) -> Self {
        DecodedValue::Int(v)
    }
}

impl From<bool> for DecodedValue {
    fn from(v: bool) -> Self {
        DecodedValue::Boolean(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_entry_replaces_equal_keys() {
        let mut entries = Vec::new();
        DecodedValue::insert_entry(&mut entries, DecodedValue::Int(1), "a".into());
        DecodedValue::insert_entry(&mut entries, DecodedValue::Int(2), "b".into());
        DecodedValue::insert_entry(&mut entries, DecodedValue::Int(1), "c".into());

        assert_eq!(
            entries,
            vec![
                (DecodedValue::Int(1), DecodedValue::Text("c".into())),
                (DecodedValue::Int(2), DecodedValue::Text("b".into())),
            ]
        );
    }

    #[test]
    fn keys_stringify_generically() {
        let uuid = Uuid::from_u128(0x1234);
        assert_eq!(
            DecodedValue::Uuid(uuid).to_string(),
            "00000000-0000-0000-0000-000000001234"
        );
        assert_eq!(DecodedValue::Boolean(true).to_string(), "true");
        assert_eq!(
            DecodedValue::List(vec![DecodedValue::Int(1), DecodedValue::Int(2)]).to_string(),
            "[1 2]"
        );
    }
}
