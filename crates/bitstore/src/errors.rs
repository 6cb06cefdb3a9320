//! Error types for layout construction, bit reads/writes and field access.

use thiserror::Error;

/// Errors produced when building a [crate::layout::Layout].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The key domain or field list has no fields.
    #[error("layout has no fields")]
    EmptySchema,
    /// Field width is 0 or greater than 64 bits.
    #[error("field `{name}` has invalid width {width} (expected 1..=64)")]
    InvalidFieldSize { name: String, width: u32 },
    /// Field name is empty.
    #[error("field at index {0} has an empty name")]
    EmptyFieldName(usize),
    /// Two fields share a name.
    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),
}

/// Errors produced when reading bits from a byte slice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Requested bit range is beyond the end of the data.
    #[error("bit range is out of bounds")]
    OutOfBounds,
    /// More than 64 bits were requested in a single read.
    #[error("cannot read more than 64 bits at once")]
    TooManyBitsRead,
    /// Input data is shorter than the layout's byte length.
    #[error("buffer too short: expected {expected} bytes, got {actual}")]
    PacketTooShort { expected: usize, actual: usize },
    /// Input data is longer than the layout's byte length.
    #[error("buffer too long: expected {expected} bytes, got {actual}")]
    PacketTooLong { expected: usize, actual: usize },
}

/// Errors produced when writing bits into a byte slice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Target bit range is beyond the end of the buffer.
    #[error("bit range is out of bounds")]
    OutOfBounds,
    /// More than 64 bits were requested in a single write.
    #[error("cannot write more than 64 bits at once")]
    TooManyBitsWritten,
}

/// Errors produced when addressing a field of a [crate::store::BitStore].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The key does not name a field of the store's layout.
    #[error("unknown field `{0}`")]
    UnknownField(String),
}
