//! Extraction rules for the basic wire kinds.
//!
//! Each rule reads one [`Value`] as a specific kind and returns `Ok(None)`
//! for null input. A value carrying any other variant is a decode error
//! tagged with the kind.

use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use cqlframe_result::{Error, Result};
use cqlframe_types::value::ip_from_bytes;
use cqlframe_types::{BasicKind, DecimalValue, DecodedValue, Value, cql_date_to_naive};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use uuid::Uuid;

use crate::datetime;

#[inline]
fn mismatch(kind: BasicKind, value: &Value) -> Error {
    Error::unexpected_value(kind.name(), value.type_name())
}

/// Shared null check: null and unset both read as absent.
#[inline]
fn present(value: &Value) -> Option<&Value> {
    if value.is_null() { None } else { Some(value) }
}

pub fn to_text(kind: BasicKind, value: &Value) -> Result<Option<&str>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_string()
        .map(Some)
        .ok_or_else(|| mismatch(kind, value))
}

pub fn to_int(kind: BasicKind, value: &Value) -> Result<Option<i64>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value.get_int().map(Some).ok_or_else(|| mismatch(kind, value))
}

pub fn to_float(value: &Value) -> Result<Option<f32>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_float()
        .map(Some)
        .ok_or_else(|| mismatch(BasicKind::Float, value))
}

pub fn to_double(value: &Value) -> Result<Option<f64>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_double()
        .map(Some)
        .ok_or_else(|| mismatch(BasicKind::Double, value))
}

pub fn to_boolean(value: &Value) -> Result<Option<bool>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_boolean()
        .map(Some)
        .ok_or_else(|| mismatch(BasicKind::Boolean, value))
}

pub fn to_time(value: &Value) -> Result<Option<u64>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_time()
        .map(Some)
        .ok_or_else(|| mismatch(BasicKind::Time, value))
}

pub fn to_blob(kind: BasicKind, value: &Value) -> Result<Option<&[u8]>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_bytes()
        .map(Some)
        .ok_or_else(|| mismatch(kind, value))
}

/// Big integer from an int, a varint, or its decimal string form.
pub fn to_bigint(value: &Value) -> Result<Option<BigInt>> {
    match value {
        Value::Null | Value::Unset => Ok(None),
        Value::Int(v) => Ok(Some(BigInt::from(*v))),
        Value::Varint(bytes) => Ok(Some(BigInt::from_signed_bytes_be(bytes))),
        Value::String(text) => BigInt::from_str(text.trim())
            .map(Some)
            .map_err(|_| Error::decode(BasicKind::Bigint.name(), "could not convert BigInt")),
        other => Err(mismatch(BasicKind::Bigint, other)),
    }
}

/// Narrow a big integer to `i64`: the signed view, then the unsigned view
/// reinterpreted as two's complement, then a parse of its decimal string.
pub fn bigint_to_i64(value: &BigInt) -> Result<i64> {
    if let Some(v) = value.to_i64() {
        return Ok(v);
    }
    if let Some(v) = value.to_u64() {
        return Ok(v as i64);
    }
    value
        .to_string()
        .parse::<i64>()
        .map_err(|_| Error::decode(BasicKind::Bigint.name(), "could not convert BigInt"))
}

/// Arbitrary-size unsigned integer that must fit in 64 bits.
pub fn to_varint(value: &Value) -> Result<Option<u64>> {
    match value {
        Value::Null | Value::Unset => Ok(None),
        Value::Varint(bytes) => BigUint::from_bytes_be(bytes).to_u64().map(Some).ok_or_else(|| {
            Error::decode(
                BasicKind::Varint.name(),
                format!("varint of {} bytes does not fit in 64 bits", bytes.len()),
            )
        }),
        Value::Int(v) => u64::try_from(*v).map(Some).map_err(|_| {
            Error::decode(BasicKind::Varint.name(), format!("negative varint {v}"))
        }),
        other => Err(mismatch(BasicKind::Varint, other)),
    }
}

pub fn to_decimal(value: &Value) -> Result<Option<DecimalValue>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    value
        .get_decimal()
        .map(Some)
        .ok_or_else(|| mismatch(BasicKind::Decimal, value))
}

pub fn to_timestamp(value: &Value) -> Result<Option<DateTime<Utc>>> {
    let Some(millis) = to_int(BasicKind::Timestamp, value)? else {
        return Ok(None);
    };
    millis_to_instant(millis).map(Some)
}

/// Milliseconds since the Unix epoch as a UTC instant.
pub fn millis_to_instant(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        Error::decode(
            BasicKind::Timestamp.name(),
            format!("timestamp {millis}ms is out of range"),
        )
    })
}

pub fn to_uuid(kind: BasicKind, value: &Value) -> Result<Option<Uuid>> {
    match value {
        Value::Null | Value::Unset => Ok(None),
        Value::Uuid(bytes) => Ok(Some(Uuid::from_bytes(*bytes))),
        Value::String(text) => Uuid::parse_str(text)
            .map(Some)
            .map_err(|err| Error::decode(kind.name(), err)),
        other => Err(mismatch(kind, other)),
    }
}

pub fn to_inet(value: &Value) -> Result<Option<IpAddr>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    let bytes = value
        .get_inet()
        .ok_or_else(|| mismatch(BasicKind::Inet, value))?;
    ip_from_bytes(bytes).map(Some).ok_or_else(|| {
        Error::decode(
            BasicKind::Inet.name(),
            format!("inet address must be 4 or 16 bytes, got {}", bytes.len()),
        )
    })
}

/// Calendar date from the wire encoding or from date text.
pub fn to_date(value: &Value) -> Result<Option<NaiveDate>> {
    match value {
        Value::Null | Value::Unset => Ok(None),
        Value::Date(days) => cql_date_to_naive(*days).map(Some).ok_or_else(|| {
            Error::decode(BasicKind::Date.name(), format!("date {days} is out of range"))
        }),
        Value::String(text) => datetime::parse_any(text)
            .map(|instant| Some(instant.date_naive()))
            .map_err(|err| Error::decode(BasicKind::Date.name(), err)),
        other => Err(mismatch(BasicKind::Date, other)),
    }
}

/// Decode one basic-kind value.
pub fn decode_basic(kind: BasicKind, value: &Value) -> Result<DecodedValue> {
    let decoded = match kind {
        BasicKind::Custom | BasicKind::Blob => {
            to_blob(kind, value)?.map(|bytes| DecodedValue::Blob(bytes.to_vec()))
        }
        BasicKind::Ascii | BasicKind::Text | BasicKind::Varchar => {
            to_text(kind, value)?.map(|text| DecodedValue::Text(text.to_string()))
        }
        BasicKind::Bigint => to_bigint(value)?.map(DecodedValue::BigInt),
        BasicKind::Boolean => to_boolean(value)?.map(DecodedValue::Boolean),
        BasicKind::Counter | BasicKind::Int | BasicKind::Smallint | BasicKind::Tinyint => {
            to_int(kind, value)?.map(DecodedValue::Int)
        }
        BasicKind::Decimal => to_decimal(value)?.map(DecodedValue::Decimal),
        BasicKind::Double => to_double(value)?.map(DecodedValue::Double),
        BasicKind::Float => to_float(value)?.map(DecodedValue::Float),
        BasicKind::Timestamp => to_timestamp(value)?.map(DecodedValue::Timestamp),
        BasicKind::Uuid | BasicKind::Timeuuid => to_uuid(kind, value)?.map(DecodedValue::Uuid),
        BasicKind::Varint => to_varint(value)?.map(DecodedValue::Varint),
        BasicKind::Inet => to_inet(value)?.map(DecodedValue::Inet),
        BasicKind::Date => to_date(value)?.map(DecodedValue::Date),
        BasicKind::Time => to_time(value)?.map(DecodedValue::Time),
        BasicKind::Unrecognized(code) => {
            return Err(Error::unsupported_type(format!("basic kind {code}")));
        }
    };
    Ok(decoded.unwrap_or(DecodedValue::Null))
}
