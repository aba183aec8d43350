//! This library handles reading from and creating **@UTF** tables used by CRI middleware.
//!
//! # @UTF Table Format Documentation
//!
//! A @UTF table is a generic, recursive key/value table. Cue sheets (`.acb`), audio archive
//! headers and many other CRI containers are @UTF tables, often with further tables nested
//! inside blob columns.
//!
//! ## File Structure
//!
//! A table consists of a header, a column schema, a value region, a string region and a blob
//! region. All multi-byte integers are big endian. Every offset in the header is relative to the
//! first byte after the size field (offset `0x08`).
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `@UTF`                                            |
//! | 0x0004         | Table Size             | 4 bytes: Number of bytes following this field              |
//! | 0x0008         | Version                | 2 bytes: Unused by this library                            |
//! | 0x000A         | Value Offset           | 2 bytes: Start of the per-row value region                 |
//! | 0x000C         | String Offset          | 4 bytes: Start of the string region                        |
//! | 0x0010         | Data Offset            | 4 bytes: Start of the blob region                          |
//! | 0x0014         | Name Offset            | 4 bytes: Table name, relative to the string region         |
//! | 0x0018         | Column Count           | 2 bytes: Number of columns in the schema                   |
//! | 0x001A         | Row Width              | 2 bytes: Size of one row in the value region               |
//! | 0x001C         | Row Count              | 4 bytes: Number of rows                                    |
//!
//! ### Column Schema
//!
//! The schema starts at `0x0020`. Each column is:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Flags                  | 1 byte: storage method (top 3 bits) and type (low 5)    |
//! | 0x0001         | Name                   | 4 bytes: Column name, relative to the string region     |
//! | 0x0005         | Inline Value           | Only present for inline columns, sized by the type      |
//!
//! - **Storage Method**:
//!   - `0`: Absent, the column has no value
//!   - `1`: Inline, one value stored in the schema and shared by every row
//!   - `2` and above: Per row, values are read in order from the value region
//! - **Value Types**:
//!   - `0x10`..`0x17`: `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`
//!   - `0x18`, `0x19`: `f32`, `f64`
//!   - `0x1A`: String, 4 bytes offset into the string region of a NUL terminated string
//!   - `0x1B`: Data, 4 bytes offset into the blob region followed by a 4 byte length
//!
//! Blob values that are themselves @UTF tables are decoded recursively, up to
//! [`ReadOptions::max_depth`] levels.
//!
//! Cells, strings and blobs that point at the same bytes share one decoded copy. A table that would
//! still expand past [`ReadOptions::max_expansion`] units per input byte is refused.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.acb`, `.acf` and others
//! - **Endianness**: Big-endian for all multi-byte integers
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::{is_table, ReadOptions};
pub use types::{Anomaly, Row, StorageMethod, Table, Value, ValueType};
pub use write::TableWriter;

/// Signature at the start of every table
pub const MAGIC: &[u8; 4] = b"@UTF";
