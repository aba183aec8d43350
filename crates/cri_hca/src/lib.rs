//! This library handles reading and creating the headers of **HCA** audio streams used by CRI
//! middleware.
//!
//! # HCA Header Format Documentation
//!
//! An HCA stream begins with a chain of tagged blocks describing the audio, followed by fixed
//! size audio blocks starting at the data offset. Only the header is read here, audio blocks are
//! never decoded. All multi-byte integers are big endian.
//!
//! Encrypted streams set the high bit of every byte in every tag, so tags are compared with
//! those bits masked off (see [`Tag::matches`]).
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                        |
//! |----------------|------------------------|----------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `HCA\0`                                   |
//! | 0x0004         | Version                | 2 bytes                                            |
//! | 0x0006         | Data Offset            | 2 bytes: Start of the first audio block            |
//! | 0x0008         | `fmt\0` block          | 16 bytes, see below                                |
//! | 0x0018         | `comp` or `dec\0`      | 16 or 12 bytes                                     |
//! | ...            | Optional blocks        | Until the data offset or an unknown tag            |
//!
//! ### `fmt\0` Block
//!
//! | Offset (bytes) | Field                  | Description                                        |
//! |----------------|------------------------|----------------------------------------------------|
//! | 0x0004         | Channels, Sample Rate  | 4 bytes: channels in the top 8 bits, rate below    |
//! | 0x0008         | Block Count            | 4 bytes                                            |
//! | 0x000C         | Mute Header            | 2 bytes                                            |
//! | 0x000E         | Mute Footer            | 2 bytes                                            |
//!
//! Valid streams have 1 to 16 channels and a sample rate from 1 to `0x7FFFFF`.
//!
//! ### Optional Blocks
//!
//! - `vbr\0`: 2 bytes maximum frame size, 2 bytes noise level
//! - `ath\0`: 2 bytes table selector
//! - `loop`: 4 bytes start block, 4 bytes end block, 2 bytes loop count, 2 reserved
//! - `ciph`: 2 bytes cipher type, `0` none, `1` static, `56` keyed
//! - `rva\0`: 4 bytes volume as `f32`
//! - `comm`: 1 byte length followed by that many bytes of text
//! - `pad\0`: end of the header
//!
//! Every block holds 1024 samples per channel.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.hca`, or embedded in `.awb` and `.acb` archives
//! - **Endianness**: Big-endian for all multi-byte integers
//!

pub mod error;
pub mod read;
pub mod tag;
pub mod types;
pub mod write;

pub use read::is_hca;
pub use tag::Tag;
pub use types::{
    CipherKind, CompressionKind, HcaHeader, LoopRegion, VariableBitrate, SAMPLES_PER_BLOCK,
};
pub use write::HeaderWriter;
