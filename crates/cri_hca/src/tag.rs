//! Block tags and the masked comparison used to recognize them.

use std::fmt;

/// Bits of each tag byte that carry the character. Encrypted streams set the high bit of every
/// byte to obscure the tags.
const MASK: u32 = 0x7F7F7F7F;

/// A four byte block tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Stream signature
    pub const HCA: Tag = Tag(*b"HCA\0");
    /// Channel layout, sample rate and block count
    pub const FMT: Tag = Tag(*b"fmt\0");
    /// Compression parameters
    pub const COMP: Tag = Tag(*b"comp");
    /// Compression parameters, older layout
    pub const DEC: Tag = Tag(*b"dec\0");
    /// Variable bitrate parameters
    pub const VBR: Tag = Tag(*b"vbr\0");
    /// Absolute threshold of hearing table selector
    pub const ATH: Tag = Tag(*b"ath\0");
    /// Loop region
    pub const LOOP: Tag = Tag(*b"loop");
    /// Cipher descriptor
    pub const CIPH: Tag = Tag(*b"ciph");
    /// Relative volume
    pub const RVA: Tag = Tag(*b"rva\0");
    /// Free text comment
    pub const COMM: Tag = Tag(*b"comm");
    /// Padding up to the first block
    pub const PAD: Tag = Tag(*b"pad\0");

    /// Tags that may follow the compression block
    const TRAILING: [Tag; 7] = [
        Tag::VBR,
        Tag::ATH,
        Tag::LOOP,
        Tag::CIPH,
        Tag::RVA,
        Tag::COMM,
        Tag::PAD,
    ];

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(self) -> [u8; 4] {
        self.0
    }

    /// Compare raw bytes against this tag, ignoring the high bit of every byte.
    pub fn matches(self, raw: [u8; 4]) -> bool {
        u32::from_le_bytes(raw) & MASK == u32::from_le_bytes(self.0)
    }

    /// This tag with the high bit set on every non-zero byte, as encrypted streams store it.
    pub fn masked(self) -> [u8; 4] {
        self.0.map(|b| if b == 0 { 0 } else { b | 0x80 })
    }

    /// Find which trailing block tag `raw` is.
    pub fn identify_trailing(raw: [u8; 4]) -> Option<Tag> {
        Self::TRAILING.into_iter().find(|tag| tag.matches(raw))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(4);
        write!(f, "{}", self.0[..end].escape_ascii())
    }
}
