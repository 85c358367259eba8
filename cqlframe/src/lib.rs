//! cqlframe: wide-column query results as Arrow frames
//!
//! This crate is the entrypoint of the cqlframe workspace. It re-exports the
//! decoding and frame-assembly APIs from the underlying `cqlframe-*` crates,
//! providing a unified API surface for users.
//!
//! # Quick Start
//!
//! Turn a materialized result set into a frame:
//!
//! ```rust
//! use cqlframe::{BasicKind, ColumnSpec, FrameOptions, QueryModel, ResultSet, TypeSpec, Value};
//!
//! let rs = ResultSet::new(vec![
//!     ColumnSpec::new("host", TypeSpec::basic(BasicKind::Text)),
//!     ColumnSpec::new("load", TypeSpec::basic(BasicKind::Double)),
//! ])
//! .with_rows(vec![vec![Value::String("a".into()), Value::Double(0.5)]]);
//!
//! let query = QueryModel::for_query("SELECT host, load FROM ks.hosts", "table");
//! let frame = cqlframe::build_frame(Some(&rs), &query, &FrameOptions::default()).unwrap();
//! assert_eq!(frame.num_rows(), 1);
//! ```
//!
//! # Architecture
//!
//! cqlframe is organized as a layered workspace:
//!
//! - **Errors** (`cqlframe-result`): The unified error enum and result alias.
//! - **Types** (`cqlframe-types`): Type descriptors, wire values, result sets and decoded values.
//! - **Decoding** (`cqlframe-decode`): Recursive decoding of wire values and JSON rendering.
//! - **Frames** (`cqlframe-frame`): Column binding, frame assembly and long-to-wide reshaping.

use serde::{Deserialize, Serialize};

pub use cqlframe_decode::{Decoder, decode};
pub use cqlframe_frame::{
    Cell, Format, Frame, FrameMeta, FrameOptions, Notice, OutputColumn, OutputType, QueryModel,
    Severity, VisType, bind_column, build_frame,
};
pub use cqlframe_result::{Error, Result};
pub use cqlframe_types::{
    BasicKind, ColumnSpec, DecimalValue, DecodedValue, ResultSet, TypeSpec, Value,
};

pub mod json {
    //! JSON rendering of decoded values.

    pub use cqlframe_decode::json::{to_json, to_json_string};
}

/// A query together with its materialized result, as read by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRequest {
    pub query: QueryModel,
    #[serde(default)]
    pub result: Option<ResultSet>,
}

impl FrameRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self, options: &FrameOptions) -> Result<Frame> {
        build_frame(self.result.as_ref(), &self.query, options)
    }
}
