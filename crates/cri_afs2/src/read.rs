//! Types for reading AFS2 archives
//!

use std::{collections::BTreeSet, sync::Arc};

use binrw::BinRead;
use byteorder::LittleEndian;
use cri_cursor::ByteCursor;
use cri_hca::HcaHeader;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Error, Result},
    types::{Afs2Entry, Afs2Header, Afs2Stats},
    MAGIC,
};

/// AFS2 archive reader
///
/// The whole archive is held in memory. Every entry's stream header is read up front, a bad
/// entry is marked invalid without affecting the others.
///
/// ```
/// # fn doit() -> cri_afs2::error::Result<()>
/// # {
/// use cri_afs2::{Afs2Archive, Afs2Writer};
///
/// let mut writer = Afs2Writer::default();
/// writer.push(7, b"not a stream".to_vec());
///
/// let archive = Afs2Archive::decode(&writer.to_bytes()?)?;
/// assert_eq!(archive.len(), 1);
/// assert_eq!(archive.entries()[0].id, 7);
/// assert!(!archive.entries()[0].is_valid());
/// assert_eq!(archive.entry_data(0)?, b"not a stream");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Afs2Archive {
    header: Afs2Header,
    entries: Vec<Afs2Entry>,
    data: Arc<[u8]>,
}

/// Check whether `data` begins with the AFS2 signature.
pub fn is_archive(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

fn align_up(offset: usize, alignment: u16) -> usize {
    let alignment = usize::from(alignment);
    match alignment {
        0 => offset,
        _ if offset % alignment == 0 => offset,
        _ => offset + (alignment - offset % alignment),
    }
}

impl Afs2Archive {
    /// Read an archive from a copy of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::from_shared(Arc::from(data))
    }

    /// Read an archive, keeping `data` for [`Afs2Archive::entry_data`].
    #[instrument(skip(data), fields(size = data.len()), err, level = "debug")]
    pub fn from_shared(data: Arc<[u8]>) -> Result<Self> {
        let mut cursor = ByteCursor::new(&data);

        let found = cursor.read_array::<4>()?;
        if !is_archive(&found) {
            return Err(Error::MagicMismatch { found });
        }
        cursor.set_position(0)?;

        let header = Afs2Header::read(&mut cursor)?;
        let width = header.offset_width;
        if width != 2 && width != 4 {
            return Err(Error::UnsupportedField {
                field: "offset width",
                value: width,
            });
        }

        let count = header.entry_count as usize;
        debug!(
            version = header.version,
            count,
            width,
            alignment = header.alignment,
            "archive"
        );

        // ids, then one more offset than there are entries
        let table_len = count
            .saturating_mul(2 + usize::from(width))
            .saturating_add(usize::from(width));
        if table_len > cursor.remaining() {
            return Err(cri_cursor::Error::OutOfBounds {
                offset: cursor.position(),
                wanted: table_len,
                size: cursor.len(),
            }
            .into());
        }

        let ids = (0..count)
            .map(|_| cursor.read_u16::<LittleEndian>())
            .collect::<cri_cursor::Result<Vec<_>>>()?;
        let offsets = (0..=count)
            .map(|_| match width {
                2 => cursor.read_u16::<LittleEndian>().map(usize::from),
                _ => cursor.read_u32::<LittleEndian>().map(|o| o as usize),
            })
            .collect::<cri_cursor::Result<Vec<_>>>()?;

        let entries = ids
            .into_iter()
            .zip(offsets.windows(2))
            .enumerate()
            .map(|(index, (id, bounds))| {
                let start = align_up(bounds[0], header.alignment);
                let end = bounds[1];
                let stream = read_entry(&data, start, end);
                if let Some(error) = &stream.error {
                    warn!(index, id, start, end, %error, "invalid entry");
                }

                Afs2Entry {
                    index,
                    id,
                    start,
                    end,
                    header: stream,
                }
            })
            .collect();

        Ok(Self {
            header,
            entries,
            data,
        })
    }

    pub fn header(&self) -> &Afs2Header {
        &self.header
    }

    pub fn entries(&self) -> &[Afs2Entry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&Afs2Entry> {
        self.entries.get(index)
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The bytes of an entry, for handing to a stream decoder.
    pub fn entry_data(&self, index: usize) -> Result<&[u8]> {
        let entry = self.entry(index).ok_or(Error::EntryNotFound(index))?;
        Ok(ByteCursor::new(&self.data).slice(entry.range())?)
    }

    /// Summed duration of every valid entry
    pub fn duration_secs(&self) -> f64 {
        self.entries.iter().map(|e| e.header.duration_secs()).sum()
    }

    pub fn stats(&self) -> Afs2Stats {
        let mut sample_rates = BTreeSet::new();
        let mut channels = BTreeSet::new();
        let mut stats = Afs2Stats::default();

        for entry in &self.entries {
            let header = &entry.header;
            if !header.is_valid() {
                stats.invalid += 1;
                continue;
            }

            stats.valid += 1;
            sample_rates.insert(header.sample_rate);
            channels.insert(header.channels);
            if header.is_encrypted() {
                stats.encrypted += 1;
            }
            if header.has_loop() {
                stats.looping += 1;
            }
            stats.duration_secs += header.duration_secs();
        }

        stats.sample_rates = sample_rates.into_iter().collect();
        stats.channels = channels.into_iter().collect();
        stats
    }
}

fn read_entry(data: &[u8], start: usize, end: usize) -> HcaHeader {
    if end < start {
        return HcaHeader::invalid(
            0,
            cri_hca::error::Error::RangeViolation {
                field: "entry end offset",
                value: end as u64,
            },
        );
    }

    match data.get(start..end) {
        Some(bytes) => HcaHeader::decode(bytes),
        None => HcaHeader::invalid(
            end - start,
            cri_cursor::Error::OutOfBounds {
                offset: start,
                wanted: end - start,
                size: data.len(),
            }
            .into(),
        ),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::Error,
        read::{align_up, Afs2Archive},
    };

    // Two entries, 2 byte offsets, 32 byte alignment, offsets [20, 50, 120]
    #[rustfmt::skip]
    fn unaligned_offsets() -> Vec<u8> {
        let mut input = vec![
            0x41, 0x46, 0x53, 0x32, 0x01, 0x02, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
            // ids
            0x0A, 0x00, 0x0B, 0x00,
            // offsets
            0x14, 0x00, 0x32, 0x00, 0x78, 0x00,
        ];
        input.resize(120, 0);
        input
    }

    #[traced_test]
    #[test]
    fn aligns_entry_starts() -> crate::error::Result<()> {
        let archive = Afs2Archive::decode(&unaligned_offsets())?;

        assert_eq!(archive.len(), 2);
        assert_eq!(archive.entries()[0].range(), 32..50);
        assert_eq!(archive.entries()[1].range(), 64..120);
        assert_eq!(archive.entries()[0].id, 0x0A);
        assert_eq!(archive.entries()[1].id, 0x0B);
        assert_eq!(archive.entries()[1].header.size, 56);
        assert_eq!(archive.header().alignment, 32);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn unaligned_archive_keeps_stored_offsets() -> crate::error::Result<()> {
        #[rustfmt::skip]
        let mut input = vec![
            0x41, 0x46, 0x53, 0x32, 0x01, 0x02, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // ids
            0x00, 0x00,
            // offsets
            0x00, 0x00, 0x32, 0x00,
        ];
        input.resize(50, 0);

        let archive = Afs2Archive::decode(&input)?;
        let entry = &archive.entries()[0];

        assert_eq!(entry.range(), 0..50);
        assert_eq!(entry.header.size, 50);
        assert!(!entry.is_valid());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn reject_magic() {
        let mut input = unaligned_offsets();
        input[..4].copy_from_slice(b"AFS3");

        assert!(matches!(
            Afs2Archive::decode(&input),
            Err(Error::MagicMismatch { found }) if &found == b"AFS3"
        ));
    }

    #[traced_test]
    #[test]
    fn reject_offset_width() {
        let mut input = unaligned_offsets();
        input[5] = 3;

        assert!(matches!(
            Afs2Archive::decode(&input),
            Err(Error::UnsupportedField { value: 3, .. })
        ));
    }

    #[traced_test]
    #[test]
    fn truncated_offset_table() {
        let input = unaligned_offsets();

        assert!(matches!(
            Afs2Archive::decode(&input[..24]),
            Err(Error::Bounds(_))
        ));
    }

    #[traced_test]
    #[test]
    fn entry_past_end_is_invalid() -> crate::error::Result<()> {
        let archive = Afs2Archive::decode(&unaligned_offsets()[..100])?;

        assert!(archive.entries()[0].header.error.is_some());
        let last = &archive.entries()[1];
        assert!(matches!(
            last.header.error,
            Some(cri_hca::error::Error::Bounds(_))
        ));
        assert_eq!(last.header.size, 56);
        assert!(archive.entry_data(1).is_err());
        assert!(matches!(archive.entry_data(2), Err(Error::EntryNotFound(2))));

        Ok(())
    }

    #[test]
    fn align() {
        assert_eq!(align_up(0, 32), 0);
        assert_eq!(align_up(1, 32), 32);
        assert_eq!(align_up(50, 32), 64);
        assert_eq!(align_up(64, 32), 64);
        assert_eq!(align_up(50, 0), 50);
    }
}
