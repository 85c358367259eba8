use crate::error::Error;

/// Result type alias used throughout cqlframe.
///
/// Shorthand for `std::result::Result<T, Error>`. Decoders, converters and the
/// frame assembler all return this type.
pub type Result<T> = std::result::Result<T, Error>;
