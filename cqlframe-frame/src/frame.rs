//! The columnar frame handed back to the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use cqlframe_result::Result;

/// Field metadata key holding the raw kind tag of a column.
pub const KIND_METADATA_KEY: &str = "cqlframe.kind";

/// Prefix of field metadata keys holding pivot labels.
pub const LABEL_METADATA_PREFIX: &str = "cqlframe.label.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// A user-facing message attached to a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }
}

/// How the frame prefers to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisType {
    #[default]
    Graph,
    Table,
    Logs,
}

impl VisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisType::Graph => "graph",
            VisType::Table => "table",
            VisType::Logs => "logs",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameMeta {
    pub executed_query_string: String,
    pub preferred_visualization: VisType,
    pub notices: Vec<Notice>,
}

/// A named set of equal-length columns plus metadata.
///
/// Columns live in an Arrow [`RecordBatch`]. Every field is nullable except
/// where the producing column type says otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    batch: RecordBatch,
    pub meta: FrameMeta,
}

impl Frame {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
            meta: FrameMeta::default(),
        }
    }

    /// Frame with no fields and no rows.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, RecordBatch::new_empty(Arc::new(Schema::empty())))
    }

    pub fn with_meta(mut self, meta: FrameMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub(crate) fn replace_batch(&mut self, batch: RecordBatch) {
        self.batch = batch;
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_fields(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column(&self, idx: usize) -> &ArrayRef {
        self.batch.column(idx)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.meta.notices
    }

    /// Raw kind tag recorded for field `idx`, if any.
    pub fn field_kind(&self, idx: usize) -> Option<String> {
        let schema = self.batch.schema();
        schema
            .fields()
            .get(idx)
            .and_then(|f| f.metadata().get(KIND_METADATA_KEY).cloned())
    }

    /// Pivot labels of field `idx`, keyed by dimension name.
    pub fn field_labels(&self, idx: usize) -> BTreeMap<String, String> {
        let schema = self.batch.schema();
        let Some(field) = schema.fields().get(idx) else {
            return BTreeMap::new();
        };
        field
            .metadata()
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(LABEL_METADATA_PREFIX)
                    .map(|label| (label.to_string(), value.clone()))
            })
            .collect()
    }

    /// Field name followed by its labels, e.g. `value {host="a"}`.
    pub fn display_name(&self, idx: usize) -> Option<String> {
        let schema = self.batch.schema();
        let name = schema.fields().get(idx)?.name().clone();
        let labels = self.field_labels(idx);
        if labels.is_empty() {
            return Some(name);
        }

        let rendered: Vec<String> = labels
            .iter()
            .map(|(key, value)| format!("{key}=\"{value}\""))
            .collect();
        Some(format!("{name} {{{}}}", rendered.join(", ")))
    }

    /// Tabular rendering for logs and debugging.
    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(pretty_format_batches(std::slice::from_ref(&self.batch))?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field};
    use std::collections::HashMap;

    fn labelled_frame() -> Frame {
        let metadata = HashMap::from([
            (format!("{LABEL_METADATA_PREFIX}host"), "a".to_string()),
            (format!("{LABEL_METADATA_PREFIX}dc"), "east".to_string()),
            (KIND_METADATA_KEY.to_string(), "int".to_string()),
        ]);
        let schema = Schema::new(vec![
            Field::new("value", DataType::Int64, true).with_metadata(metadata),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int64Array::from(vec![Some(1), None]))],
        )
        .unwrap();
        Frame::new("response", batch)
    }

    #[test]
    fn labels_come_from_field_metadata() {
        let frame = labelled_frame();
        let labels = frame.field_labels(0);
        assert_eq!(labels.get("host").map(String::as_str), Some("a"));
        assert_eq!(labels.len(), 2);
        assert_eq!(frame.field_kind(0).as_deref(), Some("int"));
        assert_eq!(
            frame.display_name(0).as_deref(),
            Some(r#"value {dc="east", host="a"}"#)
        );
        assert_eq!(frame.display_name(3), None);
    }

    #[test]
    fn empty_frame_has_no_fields() {
        let frame = Frame::empty("response");
        assert_eq!(frame.num_fields(), 0);
        assert_eq!(frame.num_rows(), 0);
        assert!(frame.notices().is_empty());
        assert_eq!(frame.meta.preferred_visualization, VisType::Graph);
    }

    #[test]
    fn pretty_string_lists_values() {
        let rendered = labelled_frame().to_pretty_string().unwrap();
        assert!(rendered.contains("value"));
        assert!(rendered.contains('1'));
    }
}
