//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::ValueType;

/// Error type for library
///
/// Any of these aborts the whole table. Offsets inside a table are shared by every field, so a
/// partially decoded table is never returned.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transparent wrapper for [`cri_cursor::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bounds(#[from] cri_cursor::Error),

    /// The buffer does not start with `@UTF`
    #[error("expected @UTF table, found {}", found.escape_ascii())]
    #[diagnostic(code(cri_utf::magic))]
    MagicMismatch {
        /// First four bytes of the buffer
        found: [u8; 4],
    },

    /// A column uses a value type code this library does not know
    #[error("column {column:?} uses unknown value type {code:#04x}")]
    #[diagnostic(code(cri_utf::unsupported_field))]
    UnsupportedField {
        /// Column name
        column: String,
        /// Low five bits of the column's schema byte
        code: u8,
    },

    /// A blob column points outside the buffer
    #[error("blob of {length} bytes at offset {offset:#x} exceeds a {size} byte buffer")]
    #[diagnostic(code(cri_utf::truncated_chunk))]
    TruncatedChunk {
        /// Absolute offset of the blob
        offset: usize,
        /// Declared length of the blob
        length: usize,
        /// Total length of the buffer
        size: usize,
    },

    /// Nested tables go deeper than the configured limit
    ///
    /// This is the truncation raised when recursion passes the cap. It stays apart from
    /// [`Error::TruncatedChunk`], which is a blob running past the end of its buffer.
    #[error("nested tables exceed the maximum depth of {max_depth}")]
    #[diagnostic(
        code(cri_utf::depth),
        help("raise ReadOptions::max_depth if the file is trusted")
    )]
    DepthExceeded {
        /// The limit that was hit
        max_depth: usize,
    },

    /// The declared row count cannot fit in the buffer
    #[error("table declares {rows} rows but the buffer holds only {size} bytes")]
    #[diagnostic(code(cri_utf::row_count))]
    TooManyRows {
        /// Declared row count
        rows: u32,
        /// Total length of the buffer
        size: usize,
    },

    /// Decoding would produce far more cells and copied bytes than the input could describe
    #[error("table expands past the limit of {limit} decoded cells and bytes")]
    #[diagnostic(
        code(cri_utf::expansion),
        help("raise ReadOptions::max_expansion if the file is trusted")
    )]
    ExpansionLimit {
        /// Input size multiplied by `max_expansion`
        limit: usize,
    },

    /// A row handed to the writer has the wrong number of values
    #[error("row has {found} values but the table has {expected} per-row columns")]
    RowLength {
        /// Number of per-row columns
        expected: usize,
        /// Number of values supplied
        found: usize,
    },

    /// A value handed to the writer does not match its column's type
    #[error("column {column:?} holds {expected} values")]
    TypeMismatch {
        /// Column name
        column: String,
        /// Type declared for the column
        expected: ValueType,
    },

    /// The encoded table does not fit the format's offset fields
    #[error("table is too large to encode")]
    TooLarge,
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
