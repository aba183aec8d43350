//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`walkdir::Error`]
    #[error(transparent)]
    WalkDirError(#[from] walkdir::Error),

    /// Transparent wrapper for [`cri_utf::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] cri_utf::error::Error),

    /// Transparent wrapper for [`cri_afs2::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Archive(#[from] cri_afs2::error::Error),

    /// file is not a cue sheet
    #[error("file is not a cue sheet")]
    #[diagnostic(code(cri_acb::not_a_catalog))]
    NotACatalog,

    /// {0} is not a directory
    #[error("{} is not a directory", .0.display())]
    #[diagnostic(code(cri_acb::not_a_directory))]
    NotADirectory(PathBuf),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
