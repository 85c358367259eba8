//! Long to wide reshaping of time-series frames.
//!
//! A long frame stores one observation per row: a time, one or more numeric
//! values, and dimension columns naming the series. The wide form keeps one
//! row per distinct time and one field per (series, numeric field), with the
//! series identified by label metadata on the field.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, UInt32Array};
use arrow::compute::{cast, take};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use cqlframe_result::{Error, Result};
use rustc_hash::FxHashMap;

use crate::frame::{Frame, LABEL_METADATA_PREFIX};
use crate::options::FrameOptions;
use crate::query::QueryModel;

/// Role a field plays in a long frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    Time,
    Value,
    Dimension,
}

fn role_of(data_type: &DataType) -> FieldRole {
    match data_type {
        DataType::Timestamp(_, _) => FieldRole::Time,
        DataType::Int64 | DataType::UInt64 | DataType::Float64 => FieldRole::Value,
        _ => FieldRole::Dimension,
    }
}

/// Pivot a long frame into its wide form, sorting it by time first unless
/// the query is already ordered. Frames that are not long, or have no rows,
/// are returned unchanged.
pub fn reshape(mut frame: Frame, query: &QueryModel, options: &FrameOptions) -> Result<Frame> {
    if !is_long(&frame.schema()) {
        tracing::debug!("frame is not long; leaving it as is");
        return Ok(frame);
    }
    if frame.num_rows() == 0 {
        return Ok(frame);
    }

    if query.is_ordered() {
        tracing::debug!("query is already ordered; skipping time sort");
    } else if let Some(idx) = sort_field_index(&frame.schema(), &options.time_field) {
        tracing::debug!(field = idx, "sorting frame by time");
        let sorted = sort_by_time(frame.batch(), idx)?;
        frame.replace_batch(sorted);
    }

    let wide = pivot(frame.batch())?;
    tracing::debug!(
        rows = wide.num_rows(),
        fields = wide.num_columns(),
        "pivoted long frame to wide"
    );
    frame.replace_batch(wide);
    Ok(frame)
}

/// A field literally named `preferred`, else the first time-typed field.
/// A named field whose values cannot be read as sort keys is passed over.
pub fn sort_field_index(schema: &Schema, preferred: &str) -> Option<usize> {
    if let Ok(idx) = schema.index_of(preferred) {
        if has_int64_keys(schema.field(idx).data_type()) {
            return Some(idx);
        }
        tracing::debug!(field = preferred, "preferred sort field is not sortable");
    }
    first_time_field(schema)
}

fn has_int64_keys(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Timestamp(_, _)
            | DataType::Int64
            | DataType::UInt64
            | DataType::Date32
            | DataType::Date64
    )
}

fn first_time_field(schema: &Schema) -> Option<usize> {
    schema
        .fields()
        .iter()
        .position(|f| role_of(f.data_type()) == FieldRole::Time)
}

/// Whether the frame has a time field, a numeric field and a dimension.
pub fn is_long(schema: &Schema) -> bool {
    let mut has_time = false;
    let mut has_value = false;
    let mut has_dimension = false;
    for field in schema.fields() {
        match role_of(field.data_type()) {
            FieldRole::Time => has_time = true,
            FieldRole::Value => has_value = true,
            FieldRole::Dimension => has_dimension = true,
        }
    }
    has_time && has_value && has_dimension
}

/// Read a sortable column as `i64` keys.
fn int64_keys(column: &ArrayRef) -> Result<Int64Array> {
    if !has_int64_keys(column.data_type()) {
        return Err(Error::InvalidArgumentError(format!(
            "cannot sort by a {:?} column",
            column.data_type()
        )));
    }
    let keys = cast(column, &DataType::Int64)?;
    keys.as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| Error::Internal("cast to Int64 did not produce an Int64Array".into()))
}

/// Stable ascending sort on column `idx`, nulls first.
pub fn sort_by_time(batch: &RecordBatch, idx: usize) -> Result<RecordBatch> {
    let keys = int64_keys(batch.column(idx))?;
    let key_at = |row: u32| -> Option<i64> {
        let row = row as usize;
        (!keys.is_null(row)).then(|| keys.value(row))
    };

    let mut order: Vec<u32> = (0..batch.num_rows() as u32).collect();
    // `sort_by` is stable, so equal times keep their arrival order.
    order.sort_by(|a, b| key_at(*a).cmp(&key_at(*b)));

    let indices = UInt32Array::from(order);
    let columns = batch
        .columns()
        .iter()
        .map(|c| take(c, &indices, None).map_err(Error::from))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordBatch::try_new(batch.schema(), columns)?)
}

/// Pivot a long batch into its wide form.
///
/// The first time-typed field is the axis; other time fields are dropped.
/// Distinct times and distinct label combinations are kept in order of first
/// appearance. A later row for the same (time, series) pair overwrites an
/// earlier one, and a series without a point at some time is null there.
pub fn pivot(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let time_idx = first_time_field(&schema)
        .ok_or_else(|| Error::pivot("frame has no time field"))?;

    let rows = batch.num_rows();
    for (idx, column) in batch.columns().iter().enumerate() {
        if column.len() != rows {
            return Err(Error::pivot(format!(
                "field '{}' has {} values but the time axis has {rows}",
                schema.field(idx).name(),
                column.len()
            )));
        }
    }

    let value_fields: Vec<usize> = fields_with_role(&schema, FieldRole::Value);
    let dimension_fields: Vec<usize> = fields_with_role(&schema, FieldRole::Dimension);

    let times = int64_keys(batch.column(time_idx))?;
    let mut time_slots: FxHashMap<i64, usize> = FxHashMap::default();
    let mut first_rows_by_time: Vec<u32> = Vec::new();

    let mut series_slots: FxHashMap<Vec<String>, usize> = FxHashMap::default();
    let mut series_labels: Vec<Vec<String>> = Vec::new();
    // series -> time slot -> source row
    let mut cells: Vec<Vec<Option<u32>>> = Vec::new();

    for row in 0..rows {
        if times.is_null(row) {
            return Err(Error::pivot(format!(
                "null value in time field '{}' at row {row}",
                schema.field(time_idx).name()
            )));
        }

        let next_slot = first_rows_by_time.len();
        let time_slot = *time_slots.entry(times.value(row)).or_insert_with(|| {
            first_rows_by_time.push(row as u32);
            next_slot
        });

        let labels = dimension_fields
            .iter()
            .map(|&idx| label_at(batch.column(idx), row))
            .collect::<Result<Vec<_>>>()?;
        let series = match series_slots.get(&labels) {
            Some(&series) => series,
            None => {
                let series = series_labels.len();
                series_slots.insert(labels.clone(), series);
                series_labels.push(labels);
                cells.push(Vec::new());
                series
            }
        };

        let slots = &mut cells[series];
        if slots.len() <= time_slot {
            slots.resize(time_slot + 1, None);
        }
        slots[time_slot] = Some(row as u32);
    }

    let time_count = first_rows_by_time.len();
    let mut fields: Vec<Field> = Vec::with_capacity(1 + series_labels.len() * value_fields.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.capacity());

    fields.push(schema.field(time_idx).clone());
    columns.push(take(
        batch.column(time_idx),
        &UInt32Array::from(first_rows_by_time),
        None,
    )?);

    for (series, labels) in series_labels.iter().enumerate() {
        let mut rows_for_series = cells[series].clone();
        rows_for_series.resize(time_count, None);
        let indices = UInt32Array::from(rows_for_series);

        for &value_idx in &value_fields {
            let source = schema.field(value_idx);
            let mut metadata: HashMap<String, String> = source.metadata().clone();
            for (dim_pos, &dim_idx) in dimension_fields.iter().enumerate() {
                metadata.insert(
                    format!("{LABEL_METADATA_PREFIX}{}", schema.field(dim_idx).name()),
                    labels[dim_pos].clone(),
                );
            }

            fields.push(
                Field::new(source.name(), source.data_type().clone(), true).with_metadata(metadata),
            );
            columns.push(take(batch.column(value_idx), &indices, None)?);
        }
    }

    let wide_schema: SchemaRef = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(RecordBatch::try_new(wide_schema, columns)?)
}

fn fields_with_role(schema: &Schema, role: FieldRole) -> Vec<usize> {
    schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| role_of(f.data_type()) == role)
        .map(|(idx, _)| idx)
        .collect()
}

/// Label text of a dimension cell; null labels are empty.
fn label_at(column: &ArrayRef, row: usize) -> Result<String> {
    if column.is_null(row) {
        return Ok(String::new());
    }
    Ok(array_value_to_string(column, row)?)
}
