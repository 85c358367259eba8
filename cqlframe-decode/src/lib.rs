//! Decoding of raw wire values into native values.
//!
//! A [`Value`](cqlframe_types::Value) is only meaningful together with its
//! [`TypeSpec`](cqlframe_types::TypeSpec). This crate walks both in lockstep:
//! [`basic`] holds the per-kind extraction rules, [`decoder`] recurses
//! through containers, and [`json`] renders the result as JSON text for
//! string-typed frame columns.
//!
//! ```
//! use cqlframe_decode::{decode, json};
//! use cqlframe_types::{BasicKind, TypeSpec, Value};
//!
//! let spec = TypeSpec::map(TypeSpec::basic(BasicKind::Text), TypeSpec::basic(BasicKind::Int));
//! let raw = Value::Collection(vec![
//!     Value::String("a".into()),
//!     Value::Int(1),
//!     Value::String("b".into()),
//!     Value::Int(2),
//! ]);
//!
//! let decoded = decode(&raw, &spec).unwrap();
//! assert_eq!(json::to_json_string(&decoded).unwrap(), r#"{"a":1,"b":2}"#);
//! ```

#![forbid(unsafe_code)]

pub mod basic;
pub mod datetime;
pub mod decoder;
pub mod json;

pub use basic::decode_basic;
pub use decoder::{DEFAULT_MAX_DEPTH, Decoder, decode};
