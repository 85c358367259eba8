//! Raw wire values as handed over by the wire client.
//!
//! A [`Value`] is interrogated through kind-specific accessors. Accessors
//! return `None` when the value carries a different variant (or is null), so
//! callers decide whether a mismatch is an error or an absent value.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{Days, NaiveDate};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DecimalValue;

/// Days offset of the wire `date` encoding: day 2^31 is 1970-01-01.
const CQL_DATE_EPOCH_OFFSET: i64 = 1 << 31;

/// One raw cell of a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Null,
    Unset,
    Int(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Address bytes, 4 for IPv4 and 16 for IPv6.
    Inet(Vec<u8>),
    Uuid([u8; 16]),
    /// Days since the epoch, offset by 2^31.
    Date(u32),
    /// Nanoseconds since midnight.
    Time(u64),
    Collection(Vec<Value>),
    Udt(HashMap<String, Value>),
    /// Big-endian two's-complement integer bytes.
    Varint(Vec<u8>),
    /// Unscaled big-endian two's-complement integer bytes plus scale.
    Decimal { scale: i32, value: Vec<u8> },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Unset)
    }

    /// Variant name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unset => "unset",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Inet(_) => "inet",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Collection(_) => "collection",
            Value::Udt(_) => "udt",
            Value::Varint(_) => "varint",
            Value::Decimal { .. } => "decimal",
        }
    }

    pub fn get_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn get_inet(&self) -> Option<&[u8]> {
        match self {
            Value::Inet(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn get_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(bytes) => Some(Uuid::from_bytes(*bytes)),
            _ => None,
        }
    }

    pub fn get_date(&self) -> Option<u32> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_time(&self) -> Option<u64> {
        match self {
            Value::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_varint(&self) -> Option<&[u8]> {
        match self {
            Value::Varint(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn get_decimal(&self) -> Option<DecimalValue> {
        match self {
            Value::Decimal { scale, value } => Some(DecimalValue::new(
                BigInt::from_signed_bytes_be(value),
                *scale,
            )),
            _ => None,
        }
    }

    /// Elements of a list, set, tuple or flattened map value.
    pub fn collection(&self) -> Option<&[Value]> {
        match self {
            Value::Collection(elements) => Some(elements.as_slice()),
            _ => None,
        }
    }

    pub fn udt(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Udt(fields) => Some(fields),
            _ => None,
        }
    }

    /// Wire date holding `date`.
    pub fn date(date: NaiveDate) -> Self {
        Value::Date(naive_to_cql_date(date))
    }

    pub fn varint(value: &BigInt) -> Self {
        Value::Varint(value.to_signed_bytes_be())
    }

    pub fn decimal(value: &DecimalValue) -> Self {
        Value::Decimal {
            scale: value.scale(),
            value: value.unscaled().to_signed_bytes_be(),
        }
    }
}

/// Convert a wire `date` (days offset by 2^31) into a calendar date.
pub fn cql_date_to_naive(days: u32) -> Option<NaiveDate> {
    let offset = i64::from(days) - CQL_DATE_EPOCH_OFFSET;
    // NaiveDate's default is 1970-01-01.
    let epoch = NaiveDate::default();
    if offset >= 0 {
        epoch.checked_add_days(Days::new(offset as u64))
    } else {
        epoch.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

pub fn naive_to_cql_date(date: NaiveDate) -> u32 {
    let offset = date.signed_duration_since(NaiveDate::default()).num_days();
    (offset + CQL_DATE_EPOCH_OFFSET) as u32
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("0x")?;
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

/// Best-effort rendering of a raw value, used for columns without a
/// dedicated conversion rule.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Unset => f.write_str("null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(bytes) => write_hex(f, bytes),
            Value::Inet(bytes) => match ip_from_bytes(bytes) {
                Some(addr) => write!(f, "{addr}"),
                None => write_hex(f, bytes),
            },
            Value::Uuid(bytes) => write!(f, "{}", Uuid::from_bytes(*bytes).hyphenated()),
            Value::Date(days) => match cql_date_to_naive(*days) {
                Some(date) => write!(f, "{date}"),
                None => write!(f, "{days}"),
            },
            Value::Time(nanos) => write!(f, "{nanos}"),
            Value::Collection(elements) => {
                f.write_str("[")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Udt(fields) => {
                let mut names: Vec<&String> = fields.keys().collect();
                names.sort();
                f.write_str("{")?;
                for (idx, name) in names.into_iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {}", fields[name])?;
                }
                f.write_str("}")
            }
            Value::Varint(bytes) => write!(f, "{}", BigInt::from_signed_bytes_be(bytes)),
            Value::Decimal { scale, value } => write!(
                f,
                "{}",
                DecimalValue::new(BigInt::from_signed_bytes_be(value), *scale)
            ),
        }
    }
}

/// Interpret 4 or 16 address bytes as an IP address.
pub fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::from(octets))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::from(octets))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_ignore_other_variants() {
        let value = Value::Int(7);
        assert_eq!(value.get_int(), Some(7));
        assert_eq!(value.get_string(), None);
        assert_eq!(value.collection(), None);
        assert!(Value::Unset.is_null());
    }

    #[test]
    fn wire_dates_are_centered_on_two_to_the_31() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(cql_date_to_naive(1 << 31), Some(epoch));

        let before = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(naive_to_cql_date(before), (1u32 << 31) - 1);
        assert_eq!(cql_date_to_naive(naive_to_cql_date(before)), Some(before));
    }

    #[test]
    fn display_renders_udt_fields_in_name_order() {
        let value = Value::Udt(HashMap::from([
            ("zip".to_string(), Value::Int(94107)),
            ("city".to_string(), Value::String("SF".into())),
        ]));
        assert_eq!(value.to_string(), "{city: SF, zip: 94107}");
    }

    #[test]
    fn display_renders_inet_and_blob() {
        assert_eq!(Value::Inet(vec![10, 0, 0, 1]).to_string(), "10.0.0.1");
        assert_eq!(Value::Bytes(vec![0xca, 0xfe]).to_string(), "0xcafe");
    }
}
