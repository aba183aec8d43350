//! Base types for structure of AFS2 archives.

use std::ops::Range;

use binrw::{BinRead, BinWrite};
use cri_hca::HcaHeader;

/// AFS2 archive header
///
/// Always starts with "AFS2". All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"AFS2", little)]
pub struct Afs2Header {
    /// Format revision, `1` or `2` in the wild
    pub version: u8,

    /// Size in bytes of each offset in the offset table, `2` or `4`
    pub offset_width: u8,

    /// Unused, zero in the wild
    pub reserved: u16,

    /// The number of entries stored in the archive
    pub entry_count: u32,

    /// Entry data starts on multiples of this, `0` for none
    pub alignment: u16,

    /// Key mixed into the cipher key of encrypted entries
    pub subkey: u16,
}

impl Afs2Header {
    /// Size of the header on disk, magic included
    pub const SIZE: usize = 16;
}

impl Default for Afs2Header {
    fn default() -> Self {
        Self {
            version: 2,
            offset_width: 4,
            reserved: 0,
            entry_count: 0,
            alignment: 32,
            subkey: 0,
        }
    }
}

/// One stream in an archive
#[derive(Debug, Clone, PartialEq)]
pub struct Afs2Entry {
    /// Position in the archive
    pub index: usize,

    /// Identifier that cue catalogs refer to
    pub id: u16,

    /// Start of the entry data, after alignment
    pub start: usize,

    /// End of the entry data, exclusive
    pub end: usize,

    /// Header of the stream, invalid when the range or the stream is bad
    pub header: HcaHeader,
}

impl Afs2Entry {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }
}

/// Summary over every entry of an archive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Afs2Stats {
    /// Distinct sample rates of valid entries, ascending
    pub sample_rates: Vec<u32>,
    /// Distinct channel counts of valid entries, ascending
    pub channels: Vec<u8>,
    pub valid: usize,
    pub invalid: usize,
    pub encrypted: usize,
    pub looping: usize,
    /// Summed duration of valid entries
    pub duration_secs: f64,
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;

    use crate::types::Afs2Header;

    #[rustfmt::skip]
    const HEADER: &[u8] = &[
        0x41, 0x46, 0x53, 0x32, // AFS2
        0x01, 0x02, 0x00, 0x00, // version, offset width, reserved
        0x03, 0x00, 0x00, 0x00, // entries
        0x20, 0x00, 0x34, 0x12, // alignment, subkey
    ];

    #[test]
    fn read_header() -> binrw::BinResult<()> {
        let header = Afs2Header::read(&mut Cursor::new(HEADER))?;

        assert_eq!(
            header,
            Afs2Header {
                version: 1,
                offset_width: 2,
                reserved: 0,
                entry_count: 3,
                alignment: 32,
                subkey: 0x1234,
            }
        );

        Ok(())
    }

    #[test]
    fn write_header() -> binrw::BinResult<()> {
        let mut out = Cursor::new(Vec::new());
        Afs2Header::read(&mut Cursor::new(HEADER))?.write(&mut out)?;

        assert_eq!(out.into_inner(), HEADER);
        assert_eq!(HEADER.len(), Afs2Header::SIZE);

        Ok(())
    }

    #[test]
    fn reject_magic() {
        let mut input = HEADER.to_vec();
        input[3] = b'3';

        assert!(Afs2Header::read(&mut Cursor::new(input)).is_err());
    }
}
