use thiserror::Error;

/// Errors returned by [`ByteValues`](crate::ByteValues) and the conversion engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The MCU id is empty or not known to the registry.
    #[error("Unknown MCU `{0}`")]
    UnknownMcu(String),
    /// The caller passed an argument which violates the API contract.
    #[error("Invalid argument")]
    InvalidArgument(#[from] ArgumentError),
}

impl Error {
    /// Returns `true` for all variants of [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

/// Details about an [`Error::InvalidArgument`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Raw byte index is not smaller than the number of bytes.
    #[error("Byte index {index} is out of range, there are only {byte_count} bytes")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of bytes in the container.
        byte_count: usize,
    },
    /// Raw byte values must be `-1` or in `0..=255`.
    #[error("Byte value {0} is out of range (-1..=255)")]
    ByteValueOutOfRange(i16),
    /// Bit field names must not be empty.
    #[error("The bit field name is empty")]
    EmptyBitFieldName,
    /// No bit field with the given name exists for this MCU.
    #[error("Unknown bit field `{0}`")]
    UnknownBitField(String),
    /// The value is not one of the legal values of the bit field.
    #[error("Value {value} is not legal for bit field `{name}`")]
    FieldValueOutOfRange {
        /// Name of the bit field.
        name: String,
        /// The rejected value.
        value: i16,
    },
}
