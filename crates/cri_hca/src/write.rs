use bon::Builder;
use tracing::instrument;

use crate::{
    tag::Tag,
    types::{CipherKind, CompressionKind, LoopRegion},
};

/// HCA header generator
///
/// Produces a header followed by padding up to the first audio block, which is enough for
/// anything that only inspects metadata.
///
/// ```
/// use cri_hca::{HcaHeader, HeaderWriter};
///
/// let bytes = HeaderWriter::builder()
///     .channels(2)
///     .sample_rate(48000)
///     .block_count(4688)
///     .build()
///     .to_bytes();
///
/// let header = HcaHeader::decode(&bytes);
/// assert!(header.is_valid());
/// assert_eq!(header.sample_rate, 48000);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct HeaderWriter {
    #[builder(default = 0x0200)]
    pub version: u16,

    pub channels: u8,

    /// Only the low 24 bits are stored
    pub sample_rate: u32,

    pub block_count: u32,

    #[builder(default)]
    pub mute_header: u16,

    #[builder(default)]
    pub mute_footer: u16,

    #[builder(default = 0x0100)]
    pub block_size: u16,

    #[builder(default)]
    pub compression: CompressionKind,

    pub loop_region: Option<LoopRegion>,

    /// Written as a `ciph` block when set
    pub cipher: Option<CipherKind>,

    /// Written as an `rva` block when set
    pub volume: Option<f32>,

    /// Written as a `comm` block when set
    pub comment: Option<String>,

    /// Store every tag with its high bits set
    #[builder(default)]
    pub masked: bool,
}

impl HeaderWriter {
    fn tag(&self, out: &mut Vec<u8>, tag: Tag) {
        if self.masked {
            out.extend_from_slice(&tag.masked());
        } else {
            out.extend_from_slice(&tag.bytes());
        }
    }

    #[instrument(skip(self), level = "trace")]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(0x60);

        self.tag(&mut out, Tag::HCA);
        out.extend_from_slice(&self.version.to_be_bytes());
        // data offset, patched below
        out.extend_from_slice(&[0, 0]);

        self.tag(&mut out, Tag::FMT);
        let packed = (u32::from(self.channels) << 24) | (self.sample_rate & 0xFF_FFFF);
        out.extend_from_slice(&packed.to_be_bytes());
        out.extend_from_slice(&self.block_count.to_be_bytes());
        out.extend_from_slice(&self.mute_header.to_be_bytes());
        out.extend_from_slice(&self.mute_footer.to_be_bytes());

        match self.compression {
            CompressionKind::Comp => {
                self.tag(&mut out, Tag::COMP);
                out.extend_from_slice(&self.block_size.to_be_bytes());
                out.extend_from_slice(&[0x01, 0x0F, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00]);
            }
            CompressionKind::Dec => {
                self.tag(&mut out, Tag::DEC);
                out.extend_from_slice(&self.block_size.to_be_bytes());
                out.extend_from_slice(&[0x01, 0x0F, 0x00, 0x00, 0x00, 0x00]);
            }
        }

        if let Some(region) = self.loop_region {
            self.tag(&mut out, Tag::LOOP);
            out.extend_from_slice(&region.start_block.to_be_bytes());
            out.extend_from_slice(&region.end_block.to_be_bytes());
            out.extend_from_slice(&region.count.to_be_bytes());
            out.extend_from_slice(&[0x04, 0x00]);
        }

        if let Some(cipher) = self.cipher {
            self.tag(&mut out, Tag::CIPH);
            out.extend_from_slice(&cipher.code().to_be_bytes());
        }

        if let Some(volume) = self.volume {
            self.tag(&mut out, Tag::RVA);
            out.extend_from_slice(&volume.to_be_bytes());
        }

        if let Some(comment) = &self.comment {
            // length byte counts the terminator
            let text = &comment.as_bytes()[..comment.len().min(0xFE)];
            self.tag(&mut out, Tag::COMM);
            out.push(text.len() as u8 + 1);
            out.extend_from_slice(text);
            out.push(0);
        }

        self.tag(&mut out, Tag::PAD);
        // checksum slot
        out.extend_from_slice(&[0, 0]);

        let data_offset = out.len() as u16;
        out[6..8].copy_from_slice(&data_offset.to_be_bytes());

        out
    }
}
