//! Assembly of query results into columnar frames.
//!
//! [`build_frame`] binds every result-set column to an output column once
//! ([`binder`]), converts every row cell by cell ([`assemble`]), attaches
//! frame metadata, and for time-series queries reshapes long frames into
//! wide ones ([`reshape`]). Per-cell failures never abort a frame: the cell
//! becomes null and a warning [`Notice`] is recorded instead.

#![forbid(unsafe_code)]

pub mod assemble;
pub mod binder;
pub mod frame;
pub mod options;
pub mod query;
pub mod reshape;

pub use assemble::build_frame;
pub use binder::{Accessor, Cell, Converter, Extracted, OutputColumn, OutputType, bind_column};
pub use frame::{
    Frame, FrameMeta, KIND_METADATA_KEY, LABEL_METADATA_PREFIX, Notice, Severity, VisType,
};
pub use options::FrameOptions;
pub use query::{Format, FormatInput, QueryModel};
