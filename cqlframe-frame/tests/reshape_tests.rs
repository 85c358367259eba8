use arrow::array::{Array, Float64Array, Int64Array, TimestampMillisecondArray};
use cqlframe_frame::{Format, Frame, FrameOptions, QueryModel, build_frame};
use cqlframe_test_utils::ResultSetBuilder;
use cqlframe_test_utils::fixtures::{double, int, null, text, ts};
use cqlframe_test_utils::init_tracing_for_tests;
use cqlframe_types::{BasicKind, ResultSet, Value};

const T1: i64 = 1_700_000_000_000;
const T2: i64 = 1_700_000_060_000;
const T3: i64 = 1_700_000_120_000;

fn series_query(cql: &str) -> QueryModel {
    QueryModel::for_query(cql, Format::TimeSeries)
}

fn readings(rows: Vec<(i64, &str, f64)>) -> ResultSet {
    ResultSetBuilder::new()
        .basic("time", BasicKind::Timestamp)
        .basic("host", BasicKind::Text)
        .basic("value", BasicKind::Double)
        .rows(
            rows.into_iter()
                .map(|(t, host, v)| vec![ts(t), text(host), double(v)]),
        )
        .build()
}

fn times(frame: &Frame) -> Vec<i64> {
    let column = frame
        .column(0)
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .unwrap();
    column.values().to_vec()
}

fn floats(frame: &Frame, idx: usize) -> Vec<Option<f64>> {
    let column = frame
        .column(idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    (0..column.len())
        .map(|i| (!column.is_null(i)).then(|| column.value(i)))
        .collect()
}

#[test]
fn long_series_pivots_to_wide() {
    init_tracing_for_tests();
    let rs = readings(vec![(T1, "a", 1.0), (T1, "b", 2.0), (T2, "a", 3.0)]);
    let frame = build_frame(
        Some(&rs),
        &series_query("SELECT time, host, value FROM m"),
        &FrameOptions::default(),
    )
    .unwrap();

    assert_eq!(frame.num_fields(), 3);
    assert_eq!(times(&frame), vec![T1, T2]);

    assert_eq!(frame.field_labels(1).get("host").map(String::as_str), Some("a"));
    assert_eq!(floats(&frame, 1), vec![Some(1.0), Some(3.0)]);

    assert_eq!(frame.field_labels(2).get("host").map(String::as_str), Some("b"));
    assert_eq!(floats(&frame, 2), vec![Some(2.0), None]);

    assert_eq!(frame.display_name(2).as_deref(), Some(r#"value {host="b"}"#));
}

#[test]
fn unordered_query_is_sorted_first() {
    let rs = readings(vec![(T3, "a", 3.0), (T1, "a", 1.0), (T2, "a", 2.0)]);
    let frame = build_frame(
        Some(&rs),
        &series_query("SELECT * FROM m"),
        &FrameOptions::default(),
    )
    .unwrap();

    assert_eq!(times(&frame), vec![T1, T2, T3]);
    assert_eq!(floats(&frame, 1), vec![Some(1.0), Some(2.0), Some(3.0)]);
}

#[test]
fn ordered_query_keeps_row_order() {
    let rs = readings(vec![(T3, "a", 3.0), (T2, "a", 2.0), (T1, "a", 1.0)]);
    let frame = build_frame(
        Some(&rs),
        &series_query("SELECT * FROM m WHERE host = 'a' Order By time DESC"),
        &FrameOptions::default(),
    )
    .unwrap();

    assert_eq!(times(&frame), vec![T3, T2, T1]);
    assert_eq!(floats(&frame, 1), vec![Some(3.0), Some(2.0), Some(1.0)]);
}

#[test]
fn wide_frames_keep_row_order() {
    let rs = ResultSetBuilder::new()
        .basic("time", BasicKind::Timestamp)
        .basic("cpu", BasicKind::Double)
        .basic("mem", BasicKind::Int)
        .row(vec![ts(T2), double(0.5), int(10)])
        .row(vec![ts(T1), double(0.25), int(20)])
        .build();
    let frame = build_frame(Some(&rs), &series_query("SELECT * FROM m"), &FrameOptions::default())
        .unwrap();

    assert_eq!(frame.field_names(), vec!["time", "cpu", "mem"]);
    assert_eq!(times(&frame), vec![T2, T1]);
    let mem = frame.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(mem.values().to_vec(), vec![10, 20]);
}

#[test]
fn multiple_value_fields_pivot_per_series() {
    let rs = ResultSetBuilder::new()
        .basic("time", BasicKind::Timestamp)
        .basic("host", BasicKind::Text)
        .basic("region", BasicKind::Text)
        .basic("cpu", BasicKind::Double)
        .basic("mem", BasicKind::Double)
        .row(vec![ts(T1), text("a"), null(), double(1.0), double(10.0)])
        .row(vec![ts(T1), text("b"), text("eu"), double(2.0), double(20.0)])
        .build();
    let frame = build_frame(Some(&rs), &series_query("SELECT * FROM m"), &FrameOptions::default())
        .unwrap();

    assert_eq!(frame.field_names(), vec!["time", "cpu", "mem", "cpu", "mem"]);
    let first_series = frame.field_labels(1);
    assert_eq!(first_series.get("host").map(String::as_str), Some("a"));
    assert_eq!(first_series.get("region").map(String::as_str), Some(""));
    assert_eq!(floats(&frame, 4), vec![Some(20.0)]);
}

#[test]
fn preferred_time_field_wins_the_sort() {
    let rs = ResultSetBuilder::new()
        .basic("created", BasicKind::Timestamp)
        .basic("ts", BasicKind::Timestamp)
        .basic("host", BasicKind::Text)
        .basic("reading", BasicKind::Double)
        .row(vec![ts(T1), ts(T2), text("a"), double(1.0)])
        .row(vec![ts(T2), ts(T1), text("a"), double(2.0)])
        .build();
    let options = FrameOptions::default().with_time_field("ts");
    let frame = build_frame(Some(&rs), &series_query("SELECT * FROM m"), &options).unwrap();

    // Sorted by `ts`, then pivoted on `created`, the first time field.
    assert_eq!(frame.field_names(), vec!["created", "reading"]);
    assert_eq!(times(&frame), vec![T2, T1]);
    assert_eq!(floats(&frame, 1), vec![Some(2.0), Some(1.0)]);
}

#[test]
fn time_of_day_field_named_time_is_the_sort_key() {
    let rs = ResultSetBuilder::new()
        .basic("at", BasicKind::Timestamp)
        .basic("time", BasicKind::Time)
        .basic("host", BasicKind::Text)
        .basic("reading", BasicKind::Double)
        .row(vec![ts(T1), Value::Time(200), text("a"), double(1.0)])
        .row(vec![ts(T2), Value::Time(100), text("a"), double(2.0)])
        .build();
    let frame = build_frame(Some(&rs), &series_query("SELECT * FROM m"), &FrameOptions::default())
        .unwrap();

    assert_eq!(times(&frame), vec![T2, T1]);
    assert_eq!(frame.field_names(), vec!["at", "time", "reading"]);
    assert_eq!(floats(&frame, 2), vec![Some(2.0), Some(1.0)]);
}

#[test]
fn empty_long_result_keeps_every_column() {
    let rs = readings(Vec::new());
    let frame = build_frame(Some(&rs), &series_query("SELECT * FROM m"), &FrameOptions::default())
        .unwrap();

    assert_eq!(frame.field_names(), vec!["time", "host", "value"]);
    assert_eq!(frame.num_rows(), 0);
    assert!(frame.notices().is_empty());
}

#[test]
fn null_time_on_the_axis_is_fatal() {
    let rs = ResultSetBuilder::new()
        .basic("time", BasicKind::Timestamp)
        .basic("host", BasicKind::Text)
        .basic("value", BasicKind::Double)
        .row(vec![null(), text("a"), double(1.0)])
        .build();
    let err = build_frame(Some(&rs), &series_query("SELECT * FROM m"), &FrameOptions::default())
        .unwrap_err();
    assert!(matches!(err, cqlframe_result::Error::Pivot(_)), "got {err:?}");
}
