//! Result set to frame assembly.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMillisecondBuilder, UInt64Builder,
};
use arrow::datatypes::Schema;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use cqlframe_result::{Error, Result};
use cqlframe_types::ResultSet;

use crate::binder::{Cell, OutputColumn, OutputType, bind_column};
use crate::frame::{Frame, FrameMeta, Notice, VisType};
use crate::options::FrameOptions;
use crate::query::{Format, QueryModel};
use crate::reshape;

/// Typed Arrow builder behind one output column.
enum ColumnBuilder {
    Int64(Int64Builder),
    UInt64(UInt64Builder),
    Float64(Float64Builder),
    Bool(BooleanBuilder),
    String(StringBuilder),
    Time(TimestampMillisecondBuilder),
}

impl ColumnBuilder {
    fn new(output_type: OutputType, capacity: usize) -> Self {
        match output_type {
            OutputType::NullableInt64 => ColumnBuilder::Int64(Int64Builder::with_capacity(capacity)),
            OutputType::NullableUInt64 => {
                ColumnBuilder::UInt64(UInt64Builder::with_capacity(capacity))
            }
            OutputType::NullableFloat64 => {
                ColumnBuilder::Float64(Float64Builder::with_capacity(capacity))
            }
            OutputType::NullableBool => ColumnBuilder::Bool(BooleanBuilder::with_capacity(capacity)),
            OutputType::String | OutputType::NullableString => {
                ColumnBuilder::String(StringBuilder::with_capacity(capacity, capacity * 8))
            }
            OutputType::NullableTime => ColumnBuilder::Time(
                TimestampMillisecondBuilder::with_capacity(capacity).with_timezone("UTC"),
            ),
        }
    }

    fn append(&mut self, cell: Cell) -> Result<()> {
        match (self, cell) {
            (ColumnBuilder::Int64(b), Cell::Null) => b.append_null(),
            (ColumnBuilder::UInt64(b), Cell::Null) => b.append_null(),
            (ColumnBuilder::Float64(b), Cell::Null) => b.append_null(),
            (ColumnBuilder::Bool(b), Cell::Null) => b.append_null(),
            (ColumnBuilder::String(b), Cell::Null) => b.append_null(),
            (ColumnBuilder::Time(b), Cell::Null) => b.append_null(),
            (ColumnBuilder::Int64(b), Cell::Int64(v)) => b.append_value(v),
            (ColumnBuilder::UInt64(b), Cell::UInt64(v)) => b.append_value(v),
            (ColumnBuilder::Float64(b), Cell::Float64(v)) => b.append_value(v),
            (ColumnBuilder::Bool(b), Cell::Bool(v)) => b.append_value(v),
            (ColumnBuilder::String(b), Cell::String(v)) => b.append_value(v),
            (ColumnBuilder::Time(b), Cell::Time(v)) => b.append_value(v.timestamp_millis()),
            (_, cell) => {
                return Err(Error::Internal(format!(
                    "cell {cell:?} does not match its column type"
                )));
            }
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Int64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::UInt64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Float64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Bool(mut b) => Arc::new(b.finish()),
            ColumnBuilder::String(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Time(mut b) => Arc::new(b.finish()),
        }
    }
}

/// Build a frame from a materialized result set.
///
/// An absent result set yields an empty frame. A cell that fails to convert
/// becomes null and adds a warning notice; a row whose length disagrees with
/// the column count aborts assembly. Time-series queries are then reshaped
/// from long to wide when the frame has a long layout.
///
/// ```
/// use cqlframe_frame::{FrameOptions, QueryModel, build_frame};
/// use cqlframe_types::{BasicKind, ColumnSpec, ResultSet, TypeSpec, Value};
///
/// let rs = ResultSet::new(vec![ColumnSpec::new("n", TypeSpec::basic(BasicKind::Int))])
///     .with_rows(vec![vec![Value::Int(1)], vec![Value::Null]]);
/// let query = QueryModel::for_query("SELECT n FROM t", "table");
///
/// let frame = build_frame(Some(&rs), &query, &FrameOptions::default()).unwrap();
/// assert_eq!(frame.num_rows(), 2);
/// assert!(frame.notices().is_empty());
/// ```
pub fn build_frame(
    result: Option<&ResultSet>,
    query: &QueryModel,
    options: &FrameOptions,
) -> Result<Frame> {
    let Some(result) = result else {
        tracing::debug!(frame = %options.frame_name, "no result set; returning empty frame");
        return Ok(Frame::empty(&options.frame_name));
    };

    let columns: Vec<OutputColumn> = result
        .columns
        .iter()
        .map(|column| bind_column(column, options))
        .collect();
    tracing::debug!(
        columns = columns.len(),
        rows = result.num_rows(),
        "assembling frame"
    );

    let mut notices = Vec::new();
    let batch = fill_columns(result, &columns, &mut notices)?;

    if !notices.is_empty() {
        tracing::warn!(notices = notices.len(), "frame assembled with conversion failures");
    }

    let mut frame = Frame::new(&options.frame_name, batch).with_meta(FrameMeta {
        executed_query_string: query.actual_cql.clone(),
        preferred_visualization: VisType::Graph,
        notices,
    });

    match query.format {
        Format::Table => {
            frame.meta.preferred_visualization = VisType::Table;
            Ok(frame)
        }
        Format::Logs => {
            frame.meta.preferred_visualization = VisType::Logs;
            Ok(frame)
        }
        Format::TimeSeries => reshape::reshape(frame, query, options),
    }
}

fn fill_columns(
    result: &ResultSet,
    columns: &[OutputColumn],
    notices: &mut Vec<Notice>,
) -> Result<RecordBatch> {
    let mut builders: Vec<ColumnBuilder> = columns
        .iter()
        .map(|column| ColumnBuilder::new(column.output_type, result.num_rows()))
        .collect();

    for (row_idx, row) in result.rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(Error::assembly(format!(
                "row {row_idx} has {} values but the result has {} columns",
                row.len(),
                columns.len()
            )));
        }

        for ((column, builder), value) in columns.iter().zip(builders.iter_mut()).zip(row) {
            let cell = match column.read(value) {
                Ok(cell) => cell,
                Err(err) if err.is_recoverable() => {
                    tracing::trace!(
                        row = row_idx,
                        column = %column.name,
                        error = %err,
                        "cell conversion failed"
                    );
                    notices.push(Notice::warning(format!("column '{}': {err}", column.name)));
                    Cell::Null
                }
                Err(err) => return Err(err),
            };
            builder.append(cell)?;
        }
    }

    let schema = Arc::new(Schema::new(
        columns.iter().map(OutputColumn::field).collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();
    let options = RecordBatchOptions::new().with_row_count(Some(result.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}
