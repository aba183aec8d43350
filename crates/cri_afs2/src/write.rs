//! Types for creating AFS2 archives
//!

use std::io::Cursor;

use binrw::BinWrite;
use bon::Builder;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    types::Afs2Header,
};

/// Options for how the archive should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct Afs2WriterOptions {
    /// Value of the version byte
    #[builder(default = 2)]
    pub version: u8,

    /// Size in bytes of each offset, `2` or `4`
    #[builder(default = 4)]
    pub offset_width: u8,

    /// Entry data starts on multiples of this, `0` for none
    #[builder(default = 32)]
    pub alignment: u16,

    #[builder(default)]
    pub subkey: u16,
}

impl Default for Afs2WriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// AFS2 archive generator
///
/// ```
/// # fn doit() -> cri_afs2::error::Result<()>
/// # {
/// use cri_afs2::{write::Afs2WriterOptions, Afs2Archive, Afs2Writer};
///
/// let mut writer = Afs2Writer::new(Afs2WriterOptions::builder().offset_width(2).build());
/// writer.push(0, vec![0; 40]);
/// writer.push(1, vec![0; 8]);
///
/// let archive = Afs2Archive::decode(&writer.to_bytes()?)?;
/// assert_eq!(archive.header().offset_width, 2);
/// assert_eq!(archive.entries()[1].len(), 8);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Afs2Writer {
    options: Afs2WriterOptions,
    entries: Vec<(u16, Vec<u8>)>,
}

impl Afs2Writer {
    pub fn new(options: Afs2WriterOptions) -> Self {
        Self {
            options,
            entries: Vec::new(),
        }
    }

    /// Append an entry with the given id.
    pub fn push(&mut self, id: u16, data: Vec<u8>) {
        self.entries.push((id, data));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn offset(&self, out: &mut Vec<u8>, offset: usize) -> Result<()> {
        let width = self.options.offset_width;
        let too_large = || Error::TooLarge { offset, width };

        match width {
            2 => out.extend_from_slice(&u16::try_from(offset).map_err(|_| too_large())?.to_le_bytes()),
            4 => out.extend_from_slice(&u32::try_from(offset).map_err(|_| too_large())?.to_le_bytes()),
            value => {
                return Err(Error::UnsupportedField {
                    field: "offset width",
                    value,
                })
            }
        }

        Ok(())
    }

    /// Lay out the header, ids, offsets and aligned entry data.
    #[instrument(skip(self), fields(entries = self.entries.len()), err, level = "debug")]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let options = self.options;
        let header = Afs2Header {
            version: options.version,
            offset_width: options.offset_width,
            reserved: 0,
            entry_count: u32::try_from(self.entries.len()).map_err(|_| Error::TooLarge {
                offset: self.entries.len(),
                width: 4,
            })?,
            alignment: options.alignment,
            subkey: options.subkey,
        };

        let mut writer = Cursor::new(Vec::new());
        header.write(&mut writer)?;
        let mut out = writer.into_inner();

        for (id, _) in &self.entries {
            out.extend_from_slice(&id.to_le_bytes());
        }

        let table_end =
            out.len() + (self.entries.len() + 1) * usize::from(options.offset_width);

        // the first offset is the unaligned end of the offset table, every other one is the
        // unaligned end of the previous entry
        let mut body = Vec::new();
        let mut ends = Vec::with_capacity(self.entries.len());
        for (_, data) in &self.entries {
            let position = table_end + body.len();
            let padding = match options.alignment {
                0 => 0,
                a => (usize::from(a) - position % usize::from(a)) % usize::from(a),
            };
            body.resize(body.len() + padding, 0);
            body.extend_from_slice(data);
            ends.push(table_end + body.len());
        }

        self.offset(&mut out, table_end)?;
        for end in ends {
            self.offset(&mut out, end)?;
        }
        out.extend_from_slice(&body);

        Ok(out)
    }
}
