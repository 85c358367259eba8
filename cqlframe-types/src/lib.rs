//! Type descriptors, wire values and decoded values shared across cqlframe.
//!
//! A query result arrives from the wire client as a [`ResultSet`]: column
//! descriptors ([`ColumnSpec`]) each carrying a recursive [`TypeSpec`], and
//! rows of raw [`Value`]s. Decoding a value against its type produces a
//! [`DecodedValue`].

pub mod decimal;
pub mod decoded;
pub mod result_set;
pub mod value;

pub use decimal::DecimalValue;
pub use decoded::DecodedValue;
pub use result_set::{ColumnSpec, ResultSet};
pub use value::{Value, cql_date_to_naive, naive_to_cql_date};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A primitive CQL type as tagged by the wire protocol.
///
/// This is a simple, C-like enum that is cheap to copy. The discriminants are
/// the protocol's option ids, so a wire code maps straight onto a variant
/// through [`BasicKind::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Custom,
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    Smallint,
    Tinyint,
    /// A wire code outside the known set.
    Unrecognized(i32),
}

impl BasicKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0x00 => BasicKind::Custom,
            0x01 => BasicKind::Ascii,
            0x02 => BasicKind::Bigint,
            0x03 => BasicKind::Blob,
            0x04 => BasicKind::Boolean,
            0x05 => BasicKind::Counter,
            0x06 => BasicKind::Decimal,
            0x07 => BasicKind::Double,
            0x08 => BasicKind::Float,
            0x09 => BasicKind::Int,
            0x0A => BasicKind::Text,
            0x0B => BasicKind::Timestamp,
            0x0C => BasicKind::Uuid,
            0x0D => BasicKind::Varchar,
            0x0E => BasicKind::Varint,
            0x0F => BasicKind::Timeuuid,
            0x10 => BasicKind::Inet,
            0x11 => BasicKind::Date,
            0x12 => BasicKind::Time,
            0x13 => BasicKind::Smallint,
            0x14 => BasicKind::Tinyint,
            other => BasicKind::Unrecognized(other),
        }
    }

    /// Lowercase CQL name, used as the raw kind tag of bound columns.
    pub fn name(&self) -> &'static str {
        match self {
            BasicKind::Custom => "custom",
            BasicKind::Ascii => "ascii",
            BasicKind::Bigint => "bigint",
            BasicKind::Blob => "blob",
            BasicKind::Boolean => "boolean",
            BasicKind::Counter => "counter",
            BasicKind::Decimal => "decimal",
            BasicKind::Double => "double",
            BasicKind::Float => "float",
            BasicKind::Int => "int",
            BasicKind::Text => "text",
            BasicKind::Timestamp => "timestamp",
            BasicKind::Uuid => "uuid",
            BasicKind::Varchar => "varchar",
            BasicKind::Varint => "varint",
            BasicKind::Timeuuid => "timeuuid",
            BasicKind::Inet => "inet",
            BasicKind::Date => "date",
            BasicKind::Time => "time",
            BasicKind::Smallint => "smallint",
            BasicKind::Tinyint => "tinyint",
            BasicKind::Unrecognized(_) => "unrecognized",
        }
    }

    /// Every known kind, in wire-code order.
    pub const ALL: [BasicKind; 21] = [
        BasicKind::Custom,
        BasicKind::Ascii,
        BasicKind::Bigint,
        BasicKind::Blob,
        BasicKind::Boolean,
        BasicKind::Counter,
        BasicKind::Decimal,
        BasicKind::Double,
        BasicKind::Float,
        BasicKind::Int,
        BasicKind::Text,
        BasicKind::Timestamp,
        BasicKind::Uuid,
        BasicKind::Varchar,
        BasicKind::Varint,
        BasicKind::Timeuuid,
        BasicKind::Inet,
        BasicKind::Date,
        BasicKind::Time,
        BasicKind::Smallint,
        BasicKind::Tinyint,
    ];
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicKind::Unrecognized(code) => write!(f, "unrecognized({code})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Recursive description of a column's (or nested value's) type.
///
/// The tree is owned, so it is acyclic by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSpec {
    Basic(BasicKind),
    Map {
        key: Box<TypeSpec>,
        value: Box<TypeSpec>,
    },
    List {
        element: Box<TypeSpec>,
    },
    Set {
        element: Box<TypeSpec>,
    },
    Tuple {
        elements: Vec<TypeSpec>,
    },
    Udt {
        name: String,
        fields: HashMap<String, TypeSpec>,
    },
}

impl TypeSpec {
    pub fn basic(kind: BasicKind) -> Self {
        TypeSpec::Basic(kind)
    }

    pub fn map(key: TypeSpec, value: TypeSpec) -> Self {
        TypeSpec::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn list(element: TypeSpec) -> Self {
        TypeSpec::List {
            element: Box::new(element),
        }
    }

    pub fn set(element: TypeSpec) -> Self {
        TypeSpec::Set {
            element: Box::new(element),
        }
    }

    pub fn tuple(elements: Vec<TypeSpec>) -> Self {
        TypeSpec::Tuple { elements }
    }

    pub fn udt<N, I, S>(name: N, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (S, TypeSpec)>,
        S: Into<String>,
    {
        TypeSpec::Udt {
            name: name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Short name of the variant, used in error messages and kind tags.
    pub fn shape_name(&self) -> &'static str {
        match self {
            TypeSpec::Basic(kind) => kind.name(),
            TypeSpec::Map { .. } => "map",
            TypeSpec::List { .. } => "list",
            TypeSpec::Set { .. } => "set",
            TypeSpec::Tuple { .. } => "tuple",
            TypeSpec::Udt { .. } => "udt",
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Basic(kind) => write!(f, "{kind}"),
            TypeSpec::Map { key, value } => write!(f, "map<{key}, {value}>"),
            TypeSpec::List { element } => write!(f, "list<{element}>"),
            TypeSpec::Set { element } => write!(f, "set<{element}>"),
            TypeSpec::Tuple { elements } => {
                f.write_str("tuple<")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(">")
            }
            TypeSpec::Udt { name, .. } => write!(f, "udt<{name}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_round_trip_through_names() {
        for (code, kind) in BasicKind::ALL.iter().enumerate() {
            assert_eq!(BasicKind::from_code(code as i32), *kind);
        }
        assert_eq!(BasicKind::from_code(0x30), BasicKind::Unrecognized(0x30));
    }

    #[test]
    fn nested_spec_renders_like_cql() {
        let spec = TypeSpec::map(
            TypeSpec::basic(BasicKind::Text),
            TypeSpec::list(TypeSpec::tuple(vec![
                TypeSpec::basic(BasicKind::Int),
                TypeSpec::basic(BasicKind::Uuid),
            ])),
        );
        assert_eq!(spec.to_string(), "map<text, list<tuple<int, uuid>>>");
    }
}
