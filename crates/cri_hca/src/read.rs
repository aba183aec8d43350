use byteorder::BigEndian;
use cri_cursor::ByteCursor;
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    tag::Tag,
    types::{CompressionKind, HcaHeader, LoopRegion, VariableBitrate},
};

/// Highest channel count a stream may declare
pub const MAX_CHANNELS: u8 = 16;
/// Highest sample rate a stream may declare
pub const MAX_SAMPLE_RATE: u32 = 0x7F_FFFF;

impl HcaHeader {
    /// Read the header at the start of `data`.
    ///
    /// This never fails, check [`HcaHeader::is_valid`] and [`HcaHeader::error`] on the result.
    ///
    /// ```
    /// use cri_hca::HcaHeader;
    ///
    /// let header = HcaHeader::decode(b"RIFF....WAVE");
    /// assert!(!header.is_valid());
    /// assert_eq!(header.size, 12);
    /// ```
    pub fn decode(data: &[u8]) -> HcaHeader {
        let mut header = HcaHeader {
            size: data.len(),
            ..Default::default()
        };

        if let Err(error) = read_header(&mut header, data) {
            debug!(%error, size = data.len(), "invalid HCA header");
            header.error = Some(error);
        }

        header
    }
}

/// Check whether `data` begins with an HCA signature, masked or not.
pub fn is_hca(data: &[u8]) -> bool {
    ByteCursor::new(data)
        .read_array::<4>()
        .is_ok_and(|raw| Tag::HCA.matches(raw))
}

fn expect(cursor: &mut ByteCursor, expected: Tag) -> Result<()> {
    let found = cursor.read_array::<4>()?;
    if !expected.matches(found) {
        return Err(Error::MagicMismatch { expected, found });
    }
    Ok(())
}

fn read_header(header: &mut HcaHeader, data: &[u8]) -> Result<()> {
    let mut cursor = ByteCursor::new(data);

    expect(&mut cursor, Tag::HCA)?;
    header.version = cursor.read_u16::<BigEndian>()?;
    header.data_offset = cursor.read_u16::<BigEndian>()?;

    expect(&mut cursor, Tag::FMT)?;
    let packed = cursor.read_u32::<BigEndian>()?;
    header.channels = (packed >> 24) as u8;
    header.sample_rate = packed & 0xFF_FFFF;
    header.block_count = cursor.read_u32::<BigEndian>()?;
    header.mute_header = cursor.read_u16::<BigEndian>()?;
    header.mute_footer = cursor.read_u16::<BigEndian>()?;

    if !(1..=MAX_CHANNELS).contains(&header.channels) {
        return Err(Error::RangeViolation {
            field: "channel count",
            value: header.channels.into(),
        });
    }
    if !(1..=MAX_SAMPLE_RATE).contains(&header.sample_rate) {
        return Err(Error::RangeViolation {
            field: "sample rate",
            value: header.sample_rate.into(),
        });
    }

    let found = cursor.read_array::<4>()?;
    let compression = if Tag::COMP.matches(found) {
        CompressionKind::Comp
    } else if Tag::DEC.matches(found) {
        CompressionKind::Dec
    } else {
        return Err(Error::MagicMismatch {
            expected: Tag::COMP,
            found,
        });
    };
    header.block_size = cursor.read_u16::<BigEndian>()?;
    cursor.skip(match compression {
        CompressionKind::Comp => 10,
        CompressionKind::Dec => 6,
    })?;
    header.compression = Some(compression);

    read_trailing(header, &mut cursor)
}

/// Optional blocks between the compression block and the first audio block
fn read_trailing(header: &mut HcaHeader, cursor: &mut ByteCursor) -> Result<()> {
    let end = usize::from(header.data_offset).min(cursor.len());

    while cursor.position() + 4 <= end {
        let raw = cursor.read_array::<4>()?;
        let Some(tag) = Tag::identify_trailing(raw) else {
            if raw != [0; 4] {
                debug!(tag = %raw.escape_ascii(), "stopping at unknown block");
            }
            break;
        };
        trace!(%tag, offset = cursor.position() - 4, "block");

        match tag {
            Tag::VBR => {
                header.vbr = Some(VariableBitrate {
                    max_frame_size: cursor.read_u16::<BigEndian>()?,
                    noise_level: cursor.read_u16::<BigEndian>()?,
                });
            }
            Tag::ATH => header.ath_type = Some(cursor.read_u16::<BigEndian>()?),
            Tag::LOOP => {
                header.loop_region = Some(LoopRegion {
                    start_block: cursor.read_u32::<BigEndian>()?,
                    end_block: cursor.read_u32::<BigEndian>()?,
                    count: cursor.read_u16::<BigEndian>()?,
                });
                cursor.skip(2)?;
            }
            Tag::CIPH => header.cipher = cursor.read_u16::<BigEndian>()?.into(),
            Tag::RVA => header.volume = cursor.read_f32::<BigEndian>()?,
            Tag::COMM => {
                let length = usize::from(cursor.read_u8()?);
                let remaining = cursor.remaining();
                let text = cursor.read_fixed(length).map_err(|_| Error::TruncatedChunk {
                    tag,
                    length,
                    remaining,
                })?;
                header.comment = String::from_utf8_lossy(text)
                    .trim_end_matches('\0')
                    .to_string();
            }
            _ => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::Error,
        read::is_hca,
        tag::Tag,
        types::{CipherKind, CompressionKind, HcaHeader},
    };

    // HCA v2.0, 2 channels, 44100 Hz, 100 blocks, dec block, no trailing blocks
    #[rustfmt::skip]
    const MINIMAL: &[u8] = &[
        // HCA, version, data offset
        0x48, 0x43, 0x41, 0x00, 0x02, 0x00, 0x00, 0x28,
        // fmt, channels and rate, blocks, mute header, mute footer
        0x66, 0x6D, 0x74, 0x00, 0x02, 0x00, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x64, 0x00, 0x00, 0x00, 0x00,
        // dec, block size, parameters
        0x64, 0x65, 0x63, 0x00, 0x01, 0x00, 0x0F, 0x0F, 0x00, 0x00, 0x00, 0x00,
        // pad
        0x70, 0x61, 0x64, 0x00,
    ];

    #[traced_test]
    #[test]
    fn decode_minimal() {
        let header = HcaHeader::decode(MINIMAL);

        assert_eq!(header.error, None);
        assert_eq!(header.size, MINIMAL.len());
        assert_eq!(header.version, 0x0200);
        assert_eq!(header.data_offset, 0x28);
        assert_eq!(header.channels, 2);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.block_count, 100);
        assert_eq!(header.block_size, 0x100);
        assert_eq!(header.compression, Some(CompressionKind::Dec));
        assert_eq!(header.cipher, CipherKind::None);
        assert_eq!(header.total_samples(), 102_400);
        assert!(is_hca(MINIMAL));
    }

    #[traced_test]
    #[test]
    fn truncated_fmt_keeps_earlier_fields() {
        let header = HcaHeader::decode(&MINIMAL[..14]);

        assert!(matches!(header.error, Some(Error::Bounds(_))));
        assert_eq!(header.version, 0x0200);
        assert_eq!(header.size, 14);
    }

    #[traced_test]
    #[test]
    fn missing_compression_block() {
        let mut input = MINIMAL.to_vec();
        input[24..28].copy_from_slice(b"xxxx");

        assert_eq!(
            HcaHeader::decode(&input).error,
            Some(Error::MagicMismatch {
                expected: Tag::COMP,
                found: *b"xxxx",
            })
        );
    }

    #[test]
    fn empty_input() {
        let header = HcaHeader::decode(&[]);

        assert!(!header.is_valid());
        assert_eq!(header.size, 0);
        assert!(!is_hca(&[]));
    }
}
