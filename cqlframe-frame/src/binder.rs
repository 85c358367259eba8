//! Binding result-set columns to output columns.
//!
//! Each [`ColumnSpec`] is bound once per query to an [`OutputColumn`]: an
//! output type, the [`Accessor`] that pulls the raw scalar out of a wire
//! value, and the [`Converter`] that turns it into a [`Cell`]. Rows are then
//! read by running the accessor followed by the converter.

use std::borrow::Cow;
use std::collections::HashMap;

use arrow::datatypes::{DataType, Field, TimeUnit};
use chrono::{DateTime, Utc};
use cqlframe_decode::basic::{
    bigint_to_i64, millis_to_instant, to_bigint, to_decimal, to_inet, to_int, to_text, to_uuid,
    to_varint,
};
use cqlframe_decode::{Decoder, datetime, json};
use cqlframe_result::{Error, Result};
use cqlframe_types::{BasicKind, ColumnSpec, DecodedValue, TypeSpec, Value, cql_date_to_naive};

use crate::frame::KIND_METADATA_KEY;
use crate::options::FrameOptions;

/// Column type of a frame field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Non-nullable text. No binding produces it today.
    String,
    NullableInt64,
    NullableUInt64,
    NullableFloat64,
    NullableBool,
    NullableString,
    NullableTime,
}

impl OutputType {
    pub fn data_type(&self) -> DataType {
        match self {
            OutputType::String | OutputType::NullableString => DataType::Utf8,
            OutputType::NullableInt64 => DataType::Int64,
            OutputType::NullableUInt64 => DataType::UInt64,
            OutputType::NullableFloat64 => DataType::Float64,
            OutputType::NullableBool => DataType::Boolean,
            OutputType::NullableTime => DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
        }
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, OutputType::String)
    }
}

/// Raw read performed on a wire value before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// Wire date rendered as ISO text, or date text passed through.
    Date,
    String,
    Int,
    Boolean,
    Float,
    Double,
    Time,
    Blob,
    /// Hands the whole value to the converter.
    Whole,
}

/// Result of an [`Accessor`] read.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<'a> {
    Null,
    Whole(&'a Value),
    Text(Cow<'a, str>),
    Int(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Time(u64),
    Bytes(&'a [u8]),
}

impl Accessor {
    pub fn extract<'a>(&self, kind: &str, value: &'a Value) -> Result<Extracted<'a>> {
        if let Accessor::Whole = self {
            return Ok(Extracted::Whole(value));
        }
        if value.is_null() {
            return Ok(Extracted::Null);
        }

        let extracted = match self {
            Accessor::Date => match value {
                Value::Date(days) => cql_date_to_naive(*days)
                    .map(|date| Extracted::Text(Cow::Owned(date.format("%Y-%m-%d").to_string()))),
                Value::String(text) => Some(Extracted::Text(Cow::Borrowed(text.as_str()))),
                _ => None,
            },
            Accessor::String => value.get_string().map(|s| Extracted::Text(Cow::Borrowed(s))),
            Accessor::Int => value.get_int().map(Extracted::Int),
            Accessor::Boolean => value.get_boolean().map(Extracted::Bool),
            Accessor::Float => value.get_float().map(Extracted::Float),
            Accessor::Double => value.get_double().map(Extracted::Double),
            Accessor::Time => value.get_time().map(Extracted::Time),
            Accessor::Blob => value.get_bytes().map(Extracted::Bytes),
            Accessor::Whole => Some(Extracted::Whole(value)),
        };
        extracted.ok_or_else(|| Error::unexpected_value(kind, value.type_name()))
    }
}

/// One converted scalar, ready to append to a frame column.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Bool(bool),
    String(String),
    Time(DateTime<Utc>),
}

/// Conversion strategy applied after the accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    /// Flexible date/time text parse.
    Date,
    Text,
    Decimal,
    Int,
    Boolean,
    /// Single precision rounded to two decimal places.
    Float,
    Double,
    Bigint,
    /// Small integers and counters, tagged with their kind for errors.
    SmallInt(BasicKind),
    Varint,
    Blob,
    Time,
    Timestamp,
    Inet,
    Uuid(BasicKind),
    /// Decode as a map and render JSON; other decoded shapes become null.
    MapJson(TypeSpec),
    /// Decode a list, set or tuple and render a JSON array.
    SequenceJson(TypeSpec),
    /// Best-effort rendering of the raw value.
    Stringify,
}

impl Converter {
    pub fn convert(&self, kind: &str, extracted: Extracted<'_>, decoder: &Decoder) -> Result<Cell> {
        if let Extracted::Null = extracted {
            return Ok(Cell::Null);
        }

        let cell = match (self, extracted) {
            (Converter::Date, Extracted::Text(text)) => datetime::parse_any(&text)
                .map(Cell::Time)
                .map_err(|err| Error::decode(kind, err))?,
            (Converter::Text, Extracted::Text(text)) => Cell::String(text.into_owned()),
            (Converter::Text, Extracted::Whole(value)) => {
                nullable(to_text(BasicKind::Ascii, value)?, |s| Cell::String(s.to_string()))
            }
            (Converter::Int, Extracted::Int(v)) => Cell::Int64(v),
            (Converter::Boolean, Extracted::Bool(v)) => Cell::Bool(v),
            (Converter::Float, Extracted::Float(v)) => Cell::Float64(round_hundredths(v)),
            (Converter::Double, Extracted::Double(v)) => Cell::Float64(v),
            (Converter::Time, Extracted::Time(v)) => Cell::UInt64(v),
            (Converter::Timestamp, Extracted::Int(millis)) => Cell::Time(millis_to_instant(millis)?),
            (Converter::Blob, Extracted::Bytes(bytes)) => {
                Cell::String(String::from_utf8_lossy(bytes).into_owned())
            }
            (Converter::Decimal, Extracted::Whole(value)) => match to_decimal(value)? {
                Some(decimal) => Cell::Float64(
                    decimal
                        .to_f64()
                        .ok_or_else(|| Error::decode(kind, "could not convert decimal"))?,
                ),
                None => Cell::Null,
            },
            (Converter::Bigint, Extracted::Whole(value)) => match to_bigint(value)? {
                Some(big) => Cell::Int64(bigint_to_i64(&big)?),
                None => Cell::Null,
            },
            (Converter::SmallInt(small), Extracted::Whole(value)) => {
                nullable(to_int(*small, value)?, Cell::Int64)
            }
            (Converter::Varint, Extracted::Whole(value)) => nullable(to_varint(value)?, Cell::UInt64),
            (Converter::Inet, Extracted::Whole(value)) => {
                nullable(to_inet(value)?, |addr| Cell::String(addr.to_string()))
            }
            (Converter::Uuid(flavor), Extracted::Whole(value)) => nullable(
                to_uuid(*flavor, value)?,
                |uuid| Cell::String(uuid.hyphenated().to_string()),
            ),
            (Converter::MapJson(spec), Extracted::Whole(value)) => {
                match decoder.decode(value, spec)? {
                    decoded @ DecodedValue::Map(_) => Cell::String(json::to_json_string(&decoded)?),
                    _ => Cell::Null,
                }
            }
            (Converter::SequenceJson(spec), Extracted::Whole(value)) => {
                Cell::String(json::to_json_string(&decoder.decode(value, spec)?)?)
            }
            (Converter::Stringify, Extracted::Whole(value)) => {
                if value.is_null() {
                    Cell::Null
                } else {
                    Cell::String(value.to_string())
                }
            }
            (converter, extracted) => {
                return Err(Error::Internal(format!(
                    "converter {converter:?} cannot read {extracted:?}"
                )));
            }
        };
        Ok(cell)
    }
}

#[inline]
fn nullable<T>(value: Option<T>, f: impl FnOnce(T) -> Cell) -> Cell {
    value.map_or(Cell::Null, f)
}

fn round_hundredths(v: f32) -> f64 {
    (f64::from(v) * 100.0).round() / 100.0
}

/// A result-set column bound to its output representation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub output_type: OutputType,
    /// Raw kind tag, e.g. `int` or `map`.
    pub kind: String,
    pub accessor: Accessor,
    pub converter: Converter,
    decoder: Decoder,
}

impl OutputColumn {
    /// Read one wire value into a cell.
    pub fn read(&self, value: &Value) -> Result<Cell> {
        let extracted = self.accessor.extract(&self.kind, value)?;
        self.converter.convert(&self.kind, extracted, &self.decoder)
    }

    /// Arrow field for this column, tagged with its raw kind.
    pub fn field(&self) -> Field {
        Field::new(
            &self.name,
            self.output_type.data_type(),
            self.output_type.is_nullable(),
        )
        .with_metadata(HashMap::from([(
            KIND_METADATA_KEY.to_string(),
            self.kind.clone(),
        )]))
    }
}

/// Bind one column descriptor.
pub fn bind_column(column: &ColumnSpec, options: &FrameOptions) -> OutputColumn {
    let (output_type, accessor, converter, kind) = match &column.type_spec {
        TypeSpec::Basic(kind) => {
            let (output_type, accessor, converter) = bind_basic(*kind);
            let tag = match kind {
                BasicKind::Unrecognized(_) => kind.to_string(),
                known => known.name().to_string(),
            };
            (output_type, accessor, converter, tag)
        }
        spec @ TypeSpec::Map { .. } => (
            OutputType::NullableString,
            Accessor::Whole,
            Converter::MapJson(spec.clone()),
            spec.shape_name().to_string(),
        ),
        spec @ (TypeSpec::List { .. } | TypeSpec::Set { .. } | TypeSpec::Tuple { .. }) => (
            OutputType::NullableString,
            Accessor::Whole,
            Converter::SequenceJson(spec.clone()),
            spec.shape_name().to_string(),
        ),
        spec @ TypeSpec::Udt { .. } => (
            OutputType::NullableString,
            Accessor::Whole,
            Converter::Stringify,
            spec.shape_name().to_string(),
        ),
    };

    tracing::trace!(
        column = %column.name,
        kind = %kind,
        output = ?output_type,
        "bound column"
    );

    OutputColumn {
        name: column.name.clone(),
        output_type,
        kind,
        accessor,
        converter,
        decoder: Decoder::new(options.max_depth),
    }
}

fn bind_basic(kind: BasicKind) -> (OutputType, Accessor, Converter) {
    use OutputType::*;
    match kind {
        BasicKind::Date => (NullableTime, Accessor::Date, Converter::Date),
        BasicKind::Text | BasicKind::Varchar => (NullableString, Accessor::String, Converter::Text),
        BasicKind::Ascii => (NullableString, Accessor::Whole, Converter::Text),
        BasicKind::Decimal => (NullableFloat64, Accessor::Whole, Converter::Decimal),
        BasicKind::Int => (NullableInt64, Accessor::Int, Converter::Int),
        BasicKind::Boolean => (NullableBool, Accessor::Boolean, Converter::Boolean),
        BasicKind::Float => (NullableFloat64, Accessor::Float, Converter::Float),
        BasicKind::Double => (NullableFloat64, Accessor::Double, Converter::Double),
        BasicKind::Bigint => (NullableInt64, Accessor::Whole, Converter::Bigint),
        BasicKind::Smallint | BasicKind::Tinyint | BasicKind::Counter => {
            (NullableInt64, Accessor::Whole, Converter::SmallInt(kind))
        }
        BasicKind::Varint => (NullableUInt64, Accessor::Whole, Converter::Varint),
        BasicKind::Blob | BasicKind::Custom => (NullableString, Accessor::Blob, Converter::Blob),
        BasicKind::Time => (NullableUInt64, Accessor::Time, Converter::Time),
        BasicKind::Timestamp => (NullableTime, Accessor::Int, Converter::Timestamp),
        BasicKind::Inet => (NullableString, Accessor::Whole, Converter::Inet),
        BasicKind::Uuid | BasicKind::Timeuuid => {
            (NullableString, Accessor::Whole, Converter::Uuid(kind))
        }
        BasicKind::Unrecognized(_) => (NullableString, Accessor::Whole, Converter::Stringify),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(name: &str, spec: TypeSpec) -> OutputColumn {
        bind_column(&ColumnSpec::new(name, spec), &FrameOptions::default())
    }

    #[test]
    fn every_basic_kind_binds_nullable() {
        for kind in BasicKind::ALL {
            let column = bind("c", TypeSpec::basic(kind));
            assert!(column.output_type.is_nullable(), "kind {kind}");
            assert_eq!(column.read(&Value::Null).unwrap(), Cell::Null, "kind {kind}");
        }
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn float_rounds_to_hundredths() {
        let column = bind("f", TypeSpec::basic(BasicKind::Float));
        assert_eq!(column.read(&Value::Float(3.14159)).unwrap(), Cell::Float64(3.14));
    }

    #[test]
    fn accessor_mismatch_is_a_decode_error() {
        let column = bind("i", TypeSpec::basic(BasicKind::Int));
        let err = column.read(&Value::String("12".into())).unwrap_err();
        assert_eq!(err.decode_kind(), Some("int"));
    }

    #[test]
    fn bigint_narrows_or_fails() {
        let column = bind("b", TypeSpec::basic(BasicKind::Bigint));
        assert_eq!(column.read(&Value::Int(-7)).unwrap(), Cell::Int64(-7));
        assert_eq!(
            column.read(&Value::String("123".into())).unwrap(),
            Cell::Int64(123)
        );
        let err = column
            .read(&Value::String("99999999999999999999".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "could not convert BigInt");
    }

    #[test]
    fn wire_date_goes_through_text() {
        let column = bind("d", TypeSpec::basic(BasicKind::Date));
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let Cell::Time(instant) = column.read(&Value::date(date)).unwrap() else {
            panic!("expected time cell");
        };
        assert_eq!(instant.date_naive(), date);
    }

    #[test]
    fn composite_columns_render_json() {
        let map = bind(
            "m",
            TypeSpec::map(TypeSpec::basic(BasicKind::Text), TypeSpec::basic(BasicKind::Int)),
        );
        assert_eq!(map.read(&Value::Null).unwrap(), Cell::String("{}".into()));

        let list = bind("l", TypeSpec::list(TypeSpec::basic(BasicKind::Int)));
        assert_eq!(
            list.read(&Value::Collection(vec![Value::Int(1), Value::Int(2)])).unwrap(),
            Cell::String("[1,2]".into())
        );
        assert_eq!(list.kind, "list");
    }

    #[test]
    fn udt_and_unrecognized_stringify() {
        let udt = bind("u", TypeSpec::udt("pt", [("x", TypeSpec::basic(BasicKind::Int))]));
        assert_eq!(udt.converter, Converter::Stringify);

        let odd = bind("o", TypeSpec::basic(BasicKind::from_code(0x30)));
        assert_eq!(odd.read(&Value::Int(5)).unwrap(), Cell::String("5".into()));
    }

    #[test]
    fn field_carries_kind_metadata() {
        let field = bind("ts", TypeSpec::basic(BasicKind::Timestamp)).field();
        assert_eq!(
            field.metadata().get(KIND_METADATA_KEY).map(String::as_str),
            Some("timestamp")
        );
        assert!(matches!(field.data_type(), DataType::Timestamp(TimeUnit::Millisecond, _)));
    }
}
