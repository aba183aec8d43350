//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::tag::Tag;

/// Error type for library
///
/// Stored on [`crate::HcaHeader`] rather than returned, so it is cheap to clone and compare.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transparent wrapper for [`cri_cursor::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bounds(#[from] cri_cursor::Error),

    /// A block tag did not match, even with the high bits masked off
    #[error("expected {expected} block, found {}", found.escape_ascii())]
    #[diagnostic(code(cri_hca::magic))]
    MagicMismatch {
        /// The tag that should have been there
        expected: Tag,
        /// The four bytes that were there
        found: [u8; 4],
    },

    /// A field holds a value outside its valid domain
    #[error("{field} {value} is out of range")]
    #[diagnostic(code(cri_hca::range))]
    RangeViolation {
        /// Name of the field
        field: &'static str,
        /// Value that was read
        value: u64,
    },

    /// A block declares more bytes than the buffer holds
    #[error("{tag} block declares {length} bytes but only {remaining} remain")]
    #[diagnostic(code(cri_hca::truncated_chunk))]
    TruncatedChunk {
        /// Tag of the block
        tag: Tag,
        /// Declared payload length
        length: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
