use std::fmt;
use thiserror::Error;

/// Unified error type for all cqlframe operations.
///
/// The variants fall into two groups. Per-cell failures ([`Error::Decode`] and
/// [`Error::UnsupportedType`]) are recovered at the row boundary by the frame
/// assembler: the offending cell becomes null and the error text is attached
/// to the frame as a warning notice. Every other variant is structural and
/// aborts construction of the frame for that query.
///
/// # Error Handling Strategy
///
/// Errors propagate upward through the recursive decoder with the `?`
/// operator, unchanged, until they reach the cell that triggered them. Callers
/// that need to tell the two groups apart use [`Error::is_recoverable`].
#[derive(Error, Debug)]
pub enum Error {
    /// A single value failed to decode under its type descriptor.
    ///
    /// `kind` names the basic kind (or composite shape) whose extraction
    /// failed, `message` carries the underlying cause. Typical triggers:
    /// - the wire value carries a different variant than the kind expects
    /// - a varint does not fit in 64 bits
    /// - a textual date matches none of the accepted layouts
    /// - a big integer has no 64-bit representation
    ///
    /// # Recovery
    ///
    /// Recovered locally: the cell becomes null and a warning notice is
    /// recorded on the frame.
    #[error("{message}")]
    Decode { kind: String, message: String },

    /// No decode rule exists for a type descriptor met during a nested decode.
    ///
    /// Raised for basic kinds outside the known set and for UDT fields that
    /// are absent from the UDT's type description. Handled exactly like
    /// [`Error::Decode`] once it reaches the row boundary.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The long-to-wide reshape cannot proceed.
    ///
    /// Structural failure of the pivot, such as a null on the time axis or
    /// columns of disagreeing length. Fatal for the query.
    #[error("pivot error: {0}")]
    Pivot(String),

    /// A result set violated a structural invariant during assembly.
    ///
    /// The usual cause is a row whose value count differs from the column
    /// count. Fatal for the query.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Arrow error while building or reshaping columnar data.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON serialization failure while rendering a composite cell.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input handed to a public API (bad query model, bad options).
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Should never occur in normal operation; the message describes the
    /// violated internal assumption.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a decode error for `kind` from any displayable cause.
    ///
    /// # Examples
    ///
    /// ```
    /// use cqlframe_result::Error;
    ///
    /// let err = Error::decode("varint", "value exceeds 64 bits");
    /// assert!(err.is_recoverable());
    /// assert_eq!(err.to_string(), "value exceeds 64 bits");
    /// ```
    #[inline]
    pub fn decode<K: Into<String>, E: fmt::Display>(kind: K, cause: E) -> Self {
        Error::Decode {
            kind: kind.into(),
            message: cause.to_string(),
        }
    }

    /// Create a decode error reporting that the wire value carried an
    /// unexpected variant for `kind`.
    #[inline]
    pub fn unexpected_value<K: AsRef<str>>(kind: K, got: &str) -> Self {
        let kind = kind.as_ref();
        Error::Decode {
            kind: kind.to_string(),
            message: format!("expected {kind} value but got {got}"),
        }
    }

    #[inline]
    pub fn unsupported_type<E: fmt::Display>(what: E) -> Self {
        Error::UnsupportedType(what.to_string())
    }

    #[inline]
    pub fn pivot<E: fmt::Display>(err: E) -> Self {
        Error::Pivot(err.to_string())
    }

    #[inline]
    pub fn assembly<E: fmt::Display>(err: E) -> Self {
        Error::Assembly(err.to_string())
    }

    /// Whether the error is a per-cell failure that the assembler turns into
    /// a notice instead of aborting the frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::UnsupportedType(_))
    }

    /// The kind tag carried by a decode error, if any.
    pub fn decode_kind(&self) -> Option<&str> {
        match self {
            Error::Decode { kind, .. } => Some(kind.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_are_fatal() {
        assert!(!Error::pivot("null time").is_recoverable());
        assert!(!Error::assembly("row 3 has 2 values").is_recoverable());
        assert!(Error::unsupported_type("basic kind 99").is_recoverable());
    }

    #[test]
    fn unexpected_value_names_kind() {
        let err = Error::unexpected_value("int", "string");
        assert_eq!(err.decode_kind(), Some("int"));
        assert_eq!(err.to_string(), "expected int value but got string");
    }
}
