use serde::{Deserialize, Serialize};

use crate::{TypeSpec, Value};

/// Name and type of one result-set column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_spec: TypeSpec,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, type_spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            type_spec,
        }
    }
}

/// A fully materialized query result.
///
/// Every row is expected to hold exactly one value per column; the frame
/// assembler rejects rows that do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}
