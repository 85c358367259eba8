//! Builders for result sets and wire values used across the test suites.

use std::collections::HashMap;

use cqlframe_types::{BasicKind, ColumnSpec, ResultSet, TypeSpec, Value};

/// Fluent builder for a [`ResultSet`].
///
/// ```
/// use cqlframe_test_utils::ResultSetBuilder;
/// use cqlframe_test_utils::fixtures::{int, text};
/// use cqlframe_types::BasicKind;
///
/// let rs = ResultSetBuilder::new()
///     .basic("id", BasicKind::Int)
///     .basic("name", BasicKind::Text)
///     .row(vec![int(1), text("a")])
///     .build();
/// assert_eq!(rs.num_rows(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ResultSetBuilder {
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<Value>>,
}

impl ResultSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &str, type_spec: TypeSpec) -> Self {
        self.columns.push(ColumnSpec::new(name, type_spec));
        self
    }

    pub fn basic(self, name: &str, kind: BasicKind) -> Self {
        self.column(name, TypeSpec::basic(kind))
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> ResultSet {
        ResultSet::new(self.columns).with_rows(self.rows)
    }
}

pub fn int(v: i64) -> Value {
    Value::Int(v)
}

pub fn text(v: &str) -> Value {
    Value::String(v.to_string())
}

pub fn double(v: f64) -> Value {
    Value::Double(v)
}

pub fn boolean(v: bool) -> Value {
    Value::Boolean(v)
}

/// Timestamp cell, milliseconds since the epoch.
pub fn ts(millis: i64) -> Value {
    Value::Int(millis)
}

pub fn null() -> Value {
    Value::Null
}

pub fn collection(items: Vec<Value>) -> Value {
    Value::Collection(items)
}

/// Flattened map value: key, value, key, value, ...
pub fn flat_map(pairs: Vec<(Value, Value)>) -> Value {
    Value::Collection(pairs.into_iter().flat_map(|(k, v)| [k, v]).collect())
}

pub fn udt(fields: Vec<(&str, Value)>) -> Value {
    Value::Udt(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect::<HashMap<_, _>>(),
    )
}
