//! # Error Definitions
//!
//! The central ledger of all schema, encoding and wire failures.

use num_bigint::BigInt;

/// Failures of parsing, encoding or decoding.
///
/// Every error aborts the call that produced it. Nothing is retried and no
/// partial output is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The schema text could not be parsed.
    #[error("invalid type {input:?}: {reason}")]
    TypeSyntax { input: String, reason: String },

    /// A value's element count disagrees with a fixed-length array, tuple or byte string.
    #[error("arity mismatch: expected {expected} element(s), found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// A number does not fit in its declared bit width.
    #[error("value {value} does not fit in {ty}")]
    EncodingOverflow { ty: String, value: BigInt },

    /// The call header carries an unknown version tag.
    #[error("unsupported header version bits {found:#04b}")]
    VersionMismatch { found: u8 },

    /// The underlying framing layer rejected the input.
    #[error("malformed wire data: {0}")]
    MalformedWireData(#[from] neorlp::Error),

    /// A boolean byte other than `0x00` or `0x01`.
    #[error("malformed wire data: illegal boolean byte {byte:#04x} at offset {offset}")]
    IllegalBool { offset: usize, byte: u8 },

    /// String payload is not valid UTF-8.
    #[error("malformed wire data: invalid utf-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Packed boolean data with set bits outside the declared count.
    #[error("malformed wire data: non-zero padding bits at offset {offset}")]
    NonCanonicalPadding { offset: usize },

    /// A wire-supplied element count cannot be satisfied by the remaining input.
    #[error("malformed wire data: {count} element(s) announced at offset {offset}, input cannot hold them")]
    CountTooLarge { offset: usize, count: usize },

    /// Bytes remain after a complete decode.
    #[error("{remaining} trailing byte(s) at offset {offset}")]
    TrailingData { offset: usize, remaining: usize },

    /// The value's variant does not match the type's kind.
    #[error("expected a {expected} value, found {found}")]
    ValueMismatch { expected: String, found: &'static str },

    /// Call schemas must be tuples.
    #[error("call schema must be a tuple, found {found}")]
    SchemaNotTuple { found: String },

    /// The nested depth of the type exceeded the configured limit.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

impl Error {
    /// True for every structural violation found while reading wire data.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedWireData(_)
                | Error::IllegalBool { .. }
                | Error::InvalidUtf8 { .. }
                | Error::NonCanonicalPadding { .. }
                | Error::CountTooLarge { .. }
        )
    }

    pub(crate) fn syntax(input: &str, reason: impl Into<String>) -> Self {
        Error::TypeSyntax { input: input.to_string(), reason: reason.into() }
    }
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
