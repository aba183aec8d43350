//! A bounds-checked reader over an immutable byte buffer.
//!
//! Every CRI container reader in this workspace (`@UTF` tables, `AFS2` archives, `HCA` headers)
//! is built on [`ByteCursor`]. The formats mix big endian table data with little endian archive
//! headers, so every multi-byte read names its byte order at the call site:
//!
//! ```
//! use byteorder::{BigEndian, LittleEndian};
//! use cri_cursor::ByteCursor;
//!
//! let mut cursor = ByteCursor::new(&[0x00, 0x01, 0x02, 0x00]);
//! assert_eq!(cursor.read_u16::<BigEndian>()?, 1);
//! assert_eq!(cursor.read_u16::<LittleEndian>()?, 2);
//! assert!(cursor.read_u8().is_err());
//! # Ok::<(), cri_cursor::Error>(())
//! ```
//!
//! Reads never panic. Running off the end of the buffer yields [`Error::OutOfBounds`] and leaves
//! the cursor where it was, so the caller decides whether that is fatal to the whole structure or
//! only to the field being read.

pub mod cursor;
pub mod error;

pub use cursor::ByteCursor;
pub use error::{Error, Result};
