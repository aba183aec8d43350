//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A read or seek went past the end of the underlying buffer
    #[error("reading {wanted} bytes at offset {offset:#x} runs past the end of a {size} byte buffer")]
    #[diagnostic(code(cri::bounds))]
    OutOfBounds {
        /// Position the access started at
        offset: usize,
        /// Number of bytes the access needed
        wanted: usize,
        /// Total length of the buffer
        size: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
