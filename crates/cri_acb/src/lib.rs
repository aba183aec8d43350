//! This library reads **ACB** cue sheets used by CRI middleware and pairs them with the **AWB**
//! archives holding their audio.
//!
//! A cue sheet is an [`cri_utf`] table with a single row. The columns read here are:
//!
//! | Column           | Type   | Description                                                |
//! |------------------|--------|------------------------------------------------------------|
//! | `Name`           | string | Name of the sheet                                          |
//! | `Version`        | u32    | Tool version that wrote the sheet                          |
//! | `CueNameTable`   | table  | One row per cue, the `CueName` column holds its name       |
//! | `WaveformTable`  | table  | One row per waveform, see [`Waveform`]                     |
//! | `AwbFile`        | data   | AFS2 archive embedded in the sheet, may be empty           |
//! | `StreamAwbHash`  | table  | One row per external archive, the `Name` column names it   |
//!
//! Any of them may be missing. An `.acb` and an `.awb` with the same base name in the same
//! directory form an [`ArchivePair`], see [`scan_directory`].
//!

pub mod catalog;
pub mod error;
pub mod pair;
pub mod scan;

pub use catalog::{CueCatalog, StreamRef, Streaming, Waveform};
pub use pair::{decode_pairs, group_sources, ArchivePair, FileRole, Member, SourceFile, SourceGroup};
pub use scan::{scan_directory, ScanOptions, ScanReport};
