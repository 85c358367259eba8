use std::collections::HashMap;

use arrow::array::{
    Array, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
    UInt64Array,
};
use arrow::datatypes::{DataType, TimeUnit};
use cqlframe_frame::{Format, FrameOptions, QueryModel, Severity, VisType, build_frame};
use cqlframe_result::Error;
use cqlframe_test_utils::ResultSetBuilder;
use cqlframe_test_utils::fixtures::{boolean, collection, double, flat_map, int, null, text, ts, udt};
use cqlframe_test_utils::init_tracing_for_tests;
use cqlframe_types::{BasicKind, DecimalValue, TypeSpec, Value};
use num_bigint::BigInt;

fn table_query() -> QueryModel {
    QueryModel::new("SELECT * FROM t", "SELECT * FROM ks.t", Format::Table)
}

fn downcast<T: 'static>(array: &dyn Array) -> &T {
    array.as_any().downcast_ref::<T>().expect("column type")
}

#[test]
fn absent_result_set_yields_empty_named_frame() {
    init_tracing_for_tests();
    let frame = build_frame(None, &table_query(), &FrameOptions::default()).unwrap();
    assert_eq!(frame.name, "response");
    assert_eq!(frame.num_fields(), 0);
    assert_eq!(frame.num_rows(), 0);
}

#[test]
fn empty_result_set_keeps_columns() {
    let rs = ResultSetBuilder::new()
        .basic("id", BasicKind::Int)
        .basic("name", BasicKind::Text)
        .basic("at", BasicKind::Timestamp)
        .build();
    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();

    assert_eq!(frame.field_names(), vec!["id", "name", "at"]);
    assert_eq!(frame.num_rows(), 0);
    assert!(frame.notices().is_empty());
    assert_eq!(frame.schema().field(0).data_type(), &DataType::Int64);
}

#[test]
fn empty_long_result_keeps_columns_in_every_format() {
    let rs = ResultSetBuilder::new()
        .basic("time", BasicKind::Timestamp)
        .basic("host", BasicKind::Text)
        .basic("value", BasicKind::Double)
        .build();
    for format in [Format::Table, Format::Logs, Format::TimeSeries] {
        let query = QueryModel::for_query("SELECT time, host, value FROM m", format);
        let frame = build_frame(Some(&rs), &query, &FrameOptions::default()).unwrap();

        assert_eq!(frame.field_names(), vec!["time", "host", "value"], "{format:?}");
        assert_eq!(frame.num_rows(), 0);
        assert!(frame.notices().is_empty());
    }
}

#[test]
#[allow(clippy::approx_constant)]
fn basic_kinds_map_to_output_types() {
    let uuid = [0x11u8; 16];
    let rs = ResultSetBuilder::new()
        .basic("i", BasicKind::Int)
        .basic("s", BasicKind::Text)
        .basic("a", BasicKind::Ascii)
        .basic("b", BasicKind::Boolean)
        .basic("f", BasicKind::Float)
        .basic("d", BasicKind::Double)
        .basic("dec", BasicKind::Decimal)
        .basic("big", BasicKind::Bigint)
        .basic("small", BasicKind::Smallint)
        .basic("vi", BasicKind::Varint)
        .basic("blob", BasicKind::Blob)
        .basic("tm", BasicKind::Time)
        .basic("ts", BasicKind::Timestamp)
        .basic("ip", BasicKind::Inet)
        .basic("id", BasicKind::Uuid)
        .basic("day", BasicKind::Date)
        .row(vec![
            int(7),
            text("hello"),
            text("plain"),
            boolean(true),
            Value::Float(3.14159),
            double(2.5),
            Value::decimal(&DecimalValue::new(BigInt::from(12345), 2)),
            Value::Int(1 << 40),
            int(-3),
            Value::Varint(vec![0x01, 0x00]),
            Value::Bytes(b"raw".to_vec()),
            Value::Time(3_600_000_000_000),
            ts(1_700_000_000_000),
            Value::Inet(vec![10, 0, 0, 1]),
            Value::Uuid(uuid),
            text("2024-01-02"),
        ])
        .build();

    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();
    assert!(frame.notices().is_empty(), "{:?}", frame.notices());

    assert_eq!(downcast::<Int64Array>(frame.column(0)).value(0), 7);
    assert_eq!(downcast::<StringArray>(frame.column(1)).value(0), "hello");
    assert_eq!(downcast::<StringArray>(frame.column(2)).value(0), "plain");
    assert!(downcast::<BooleanArray>(frame.column(3)).value(0));
    assert_eq!(downcast::<Float64Array>(frame.column(4)).value(0), 3.14);
    assert_eq!(downcast::<Float64Array>(frame.column(5)).value(0), 2.5);
    assert_eq!(downcast::<Float64Array>(frame.column(6)).value(0), 123.45);
    assert_eq!(downcast::<Int64Array>(frame.column(7)).value(0), 1 << 40);
    assert_eq!(downcast::<Int64Array>(frame.column(8)).value(0), -3);
    assert_eq!(downcast::<UInt64Array>(frame.column(9)).value(0), 256);
    assert_eq!(downcast::<StringArray>(frame.column(10)).value(0), "raw");
    assert_eq!(downcast::<UInt64Array>(frame.column(11)).value(0), 3_600_000_000_000);
    assert_eq!(
        downcast::<TimestampMillisecondArray>(frame.column(12)).value(0),
        1_700_000_000_000
    );
    assert_eq!(downcast::<StringArray>(frame.column(13)).value(0), "10.0.0.1");
    assert_eq!(
        downcast::<StringArray>(frame.column(14)).value(0),
        "11111111-1111-1111-1111-111111111111"
    );
    assert_eq!(
        downcast::<TimestampMillisecondArray>(frame.column(15)).value(0),
        1_704_153_600_000
    );
    assert_eq!(
        frame.schema().field(12).data_type(),
        &DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
    );
}

#[test]
fn timestamp_renders_as_utc_instant() {
    let rs = ResultSetBuilder::new()
        .basic("at", BasicKind::Timestamp)
        .row(vec![ts(1_700_000_000_000)])
        .build();
    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();
    let rendered = frame.to_pretty_string().unwrap();
    assert!(rendered.contains("2023-11-14T22:13:20"), "{rendered}");
}

#[test]
fn nulls_survive_every_column() {
    let rs = ResultSetBuilder::new()
        .basic("i", BasicKind::Int)
        .basic("s", BasicKind::Text)
        .column("m", TypeSpec::map(TypeSpec::basic(BasicKind::Text), TypeSpec::basic(BasicKind::Int)))
        .column("l", TypeSpec::list(TypeSpec::basic(BasicKind::Int)))
        .column("u", TypeSpec::udt("pt", [("x", TypeSpec::basic(BasicKind::Int))]))
        .row(vec![null(), null(), null(), null(), null()])
        .build();
    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();

    assert!(frame.column(0).is_null(0));
    assert!(frame.column(1).is_null(0));
    assert_eq!(downcast::<StringArray>(frame.column(2)).value(0), "{}");
    assert_eq!(downcast::<StringArray>(frame.column(3)).value(0), "[]");
    assert!(frame.column(4).is_null(0));
}

#[test]
fn composite_columns_are_json_text() {
    let rs = ResultSetBuilder::new()
        .column(
            "m",
            TypeSpec::map(TypeSpec::basic(BasicKind::Int), TypeSpec::basic(BasicKind::Text)),
        )
        .column(
            "t",
            TypeSpec::tuple(vec![TypeSpec::basic(BasicKind::Text), TypeSpec::basic(BasicKind::Int)]),
        )
        .column("u", TypeSpec::udt("pt", [("x", TypeSpec::basic(BasicKind::Int))]))
        .row(vec![
            flat_map(vec![(int(2), text("b")), (int(10), text("j"))]),
            collection(vec![text("a"), int(1)]),
            udt(vec![("x", int(4))]),
        ])
        .build();
    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();

    let map_json: serde_json::Value =
        serde_json::from_str(downcast::<StringArray>(frame.column(0)).value(0)).unwrap();
    assert_eq!(map_json, serde_json::json!({"10": "j", "2": "b"}));
    assert_eq!(downcast::<StringArray>(frame.column(1)).value(0), r#"["a",1]"#);
    assert_eq!(downcast::<StringArray>(frame.column(2)).value(0), "{x: 4}");
    assert_eq!(frame.field_kind(0).as_deref(), Some("map"));
    assert_eq!(frame.field_kind(2).as_deref(), Some("udt"));
}

#[test]
fn conversion_failures_become_warnings() {
    let rs = ResultSetBuilder::new()
        .basic("big", BasicKind::Bigint)
        .basic("ok", BasicKind::Int)
        .row(vec![text("99999999999999999999"), int(1)])
        .row(vec![text("not a number"), int(2)])
        .row(vec![int(5), int(3)])
        .build();
    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();

    let big = downcast::<Int64Array>(frame.column(0));
    assert!(big.is_null(0));
    assert!(big.is_null(1));
    assert_eq!(big.value(2), 5);
    assert_eq!(downcast::<Int64Array>(frame.column(1)).null_count(), 0);

    let notices = frame.notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.severity == Severity::Warning));
    assert!(notices[0].text.contains("big"));
    assert!(notices[1].text.contains("could not convert BigInt"));
}

#[test]
fn short_row_is_an_assembly_error() {
    let rs = ResultSetBuilder::new()
        .basic("a", BasicKind::Int)
        .basic("b", BasicKind::Int)
        .row(vec![int(1), int(2)])
        .row(vec![int(3)])
        .build();
    let err = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Assembly(_)), "got {err:?}");
    assert!(!err.is_recoverable());
}

#[test]
fn metadata_follows_the_query() {
    let rs = ResultSetBuilder::new()
        .basic("line", BasicKind::Text)
        .row(vec![text("started")])
        .build();

    let table = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();
    assert_eq!(table.meta.executed_query_string, "SELECT * FROM ks.t");
    assert_eq!(table.meta.preferred_visualization, VisType::Table);

    let logs_query = QueryModel::new("q", "q", "logs");
    let logs = build_frame(Some(&rs), &logs_query, &FrameOptions::default()).unwrap();
    assert_eq!(logs.meta.preferred_visualization, VisType::Logs);

    let series_query = QueryModel::new("q", "q", 0u32);
    let series = build_frame(Some(&rs), &series_query, &FrameOptions::default()).unwrap();
    assert_eq!(series.meta.preferred_visualization, VisType::Graph);
}

#[test]
fn assembly_is_idempotent() {
    let rs = ResultSetBuilder::new()
        .basic("time", BasicKind::Timestamp)
        .basic("host", BasicKind::Text)
        .basic("v", BasicKind::Double)
        .basic("bad", BasicKind::Int)
        .row(vec![ts(2_000), text("a"), double(1.0), text("x")])
        .row(vec![ts(1_000), text("b"), double(2.0), int(1)])
        .build();

    for format in [Format::Table, Format::Logs, Format::TimeSeries] {
        let query = QueryModel::for_query("SELECT * FROM t", format);
        let first = build_frame(Some(&rs), &query, &FrameOptions::default()).unwrap();
        let second = build_frame(Some(&rs), &query, &FrameOptions::default()).unwrap();
        assert_eq!(first, second, "format {format:?}");
    }
}

#[test]
fn custom_frame_name_is_used() {
    let options = FrameOptions::default().with_frame_name("readings");
    let rs = ResultSetBuilder::new().basic("a", BasicKind::Int).build();
    assert_eq!(build_frame(Some(&rs), &table_query(), &options).unwrap().name, "readings");
    assert_eq!(build_frame(None, &table_query(), &options).unwrap().name, "readings");
}

#[test]
fn kind_metadata_is_attached() {
    let rs = ResultSetBuilder::new().basic("n", BasicKind::Counter).build();
    let frame = build_frame(Some(&rs), &table_query(), &FrameOptions::default()).unwrap();
    let expected = HashMap::from([("cqlframe.kind".to_string(), "counter".to_string())]);
    assert_eq!(frame.schema().field(0).metadata(), &expected);
}
