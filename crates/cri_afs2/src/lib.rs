//! This library handles reading from and creating **AFS2** archives used by CRI middleware.
//!
//! # AFS2 Archive Format Documentation
//!
//! An AFS2 archive (`.awb`, or embedded inside a `.acb` cue sheet) bundles many encoded audio
//! streams. It holds no names, entries are identified by index and by a 16-bit id that cue
//! sheets refer to. All multi-byte integers are little endian.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `AFS2`                                         |
//! | 0x0004         | Version                | 1 byte                                                  |
//! | 0x0005         | Offset Width           | 1 byte: `2` or `4`, size of each offset below           |
//! | 0x0006         | Reserved               | 2 bytes                                                 |
//! | 0x0008         | Entry Count            | 4 bytes                                                 |
//! | 0x000C         | Alignment              | 2 bytes: entry data starts on multiples of this         |
//! | 0x000E         | Subkey                 | 2 bytes: mixed into the key of encrypted streams        |
//! | 0x0010         | Entry Ids              | 2 bytes per entry                                       |
//! | ...            | Offsets                | Offset Width bytes, one more than the entry count       |
//!
//! Entry `i` spans from offset `i` rounded up to the alignment, to offset `i + 1`. Data never
//! starts inside the header or the offset table.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.awb`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::{is_archive, Afs2Archive};
pub use types::{Afs2Entry, Afs2Header, Afs2Stats};
pub use write::Afs2Writer;

/// Signature at the start of every archive
pub const MAGIC: &[u8; 4] = b"AFS2";
