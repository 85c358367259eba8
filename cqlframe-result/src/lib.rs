//! Error types and result definitions for the cqlframe workspace.
//!
//! This crate provides the unified error type ([`Error`]) and result alias
//! ([`Result<T>`]) used by every cqlframe crate, so failures cross crate
//! boundaries with the `?` operator and no conversion glue.
//!
//! # Error Categories
//!
//! - **Per-cell failures** ([`Error::Decode`], [`Error::UnsupportedType`]):
//!   one value could not be decoded; recovered as a frame notice
//! - **Structural failures** ([`Error::Pivot`], [`Error::Assembly`]): the
//!   result set or the reshape is inconsistent; fatal for the query
//! - **Library errors** ([`Error::Arrow`], [`Error::Json`]): columnar or JSON
//!   encoding failures
//! - **API misuse** ([`Error::InvalidArgumentError`]) and bugs
//!   ([`Error::Internal`])

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
