//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`cri_cursor::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bounds(#[from] cri_cursor::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is not an AFS2 archive
    #[error("expected AFS2 archive, found {}", found.escape_ascii())]
    #[diagnostic(code(cri_afs2::magic))]
    MagicMismatch {
        /// The first four bytes of the input
        found: [u8; 4],
    },

    /// a header field holds a value this library cannot handle
    #[error("unsupported {field} {value}")]
    #[diagnostic(code(cri_afs2::unsupported), help("offsets are stored in 2 or 4 bytes"))]
    UnsupportedField {
        /// Name of the field
        field: &'static str,
        /// Value that was read
        value: u8,
    },

    /// an offset does not fit in the configured offset width
    #[error("offset {offset:#x} does not fit in {width} bytes")]
    #[diagnostic(code(cri_afs2::too_large))]
    TooLarge {
        /// The offset that was to be written
        offset: usize,
        /// Width of the offset fields
        width: u8,
    },

    /// unable to find requested entry
    #[error("no entry at index {0}")]
    EntryNotFound(usize),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
