//! Projection of a decoded cue sheet onto the fields this library reports.

use cri_afs2::Afs2Archive;
use cri_utf::{ReadOptions, Row, Table};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// How a waveform's data is stored
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Streaming {
    /// In the archive embedded in the cue sheet
    #[default]
    Memory,
    /// In an external `.awb`
    Stream,
    /// Prefetched from memory, then streamed
    Both,
    Other(u8),
}

impl From<u8> for Streaming {
    fn from(value: u8) -> Self {
        match value {
            0 => Streaming::Memory,
            1 => Streaming::Stream,
            2 => Streaming::Both,
            other => Streaming::Other(other),
        }
    }
}

/// Reference to an entry of an external archive
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamRef {
    pub id: u16,
    /// Which external archive, for sheets with several
    pub port: u16,
}

/// One row of the waveform table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Waveform {
    pub id: u16,
    pub streaming: Streaming,
    /// Codec of the waveform, `2` is HCA
    pub encode_type: u8,
    pub memory_awb_id: Option<u16>,
    pub stream_awb: Option<StreamRef>,
}

/// The parts of an `.acb` cue sheet this library reports
///
/// Every field defaults when its column is missing, a sheet is never rejected for lacking one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CueCatalog {
    pub name: String,
    pub version: u32,
    pub cue_names: Vec<String>,
    pub waveforms: Vec<Waveform>,
    /// Archive embedded in the sheet, empty when there is none
    pub memory_awb: Vec<u8>,
    /// Names of the external archives the sheet streams from
    pub stream_awb_names: Vec<String>,
}

fn narrow<T: TryFrom<u64>>(row: &Row, name: &str) -> Option<T> {
    row.u64(name).and_then(|v| T::try_from(v).ok())
}

fn names(table: Option<&Table>, column: &str) -> Vec<String> {
    table
        .map(|t| {
            t.rows
                .iter()
                .filter_map(|row| row.str(column))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Waveform {
    fn from_row(row: &Row) -> Self {
        let stream_awb = narrow(row, "StreamAwbId").map(|id| StreamRef {
            id,
            port: narrow(row, "StreamAwbPortNo").unwrap_or_default(),
        });

        Self {
            id: narrow(row, "Id").unwrap_or_default(),
            streaming: narrow::<u8>(row, "Streaming").unwrap_or_default().into(),
            encode_type: narrow(row, "EncodeType").unwrap_or_default(),
            memory_awb_id: narrow(row, "MemoryAwbId"),
            stream_awb,
        }
    }
}

impl CueCatalog {
    /// Decode an `.acb` buffer and project its root row.
    ///
    /// A buffer that is not a table, or a table without rows, is [`Error::NotACatalog`].
    #[instrument(skip(data), fields(size = data.len()), err, level = "debug")]
    pub fn decode(data: &[u8], options: ReadOptions) -> Result<Self> {
        let table = Table::decode_at(data, 0, options)?.ok_or(Error::NotACatalog)?;
        if table.is_empty() {
            return Err(Error::NotACatalog);
        }
        Ok(Self::from_table(&table))
    }

    /// Project the root row of an already decoded sheet.
    pub fn from_table(table: &Table) -> Self {
        let Some(root) = table.root() else {
            return Self::default();
        };

        let catalog = Self {
            name: root.str("Name").unwrap_or_default().to_string(),
            version: narrow(root, "Version").unwrap_or_default(),
            cue_names: names(root.table("CueNameTable"), "CueName"),
            waveforms: root
                .table("WaveformTable")
                .map(|t| t.rows.iter().map(Waveform::from_row).collect())
                .unwrap_or_default(),
            memory_awb: root.bytes("AwbFile").unwrap_or_default().to_vec(),
            stream_awb_names: names(root.table("StreamAwbHash"), "Name"),
        };

        debug!(
            name = %catalog.name,
            cues = catalog.cue_count(),
            waveforms = catalog.waveform_count(),
            "cue sheet"
        );

        catalog
    }

    pub fn cue_count(&self) -> usize {
        self.cue_names.len()
    }

    pub fn waveform_count(&self) -> usize {
        self.waveforms.len()
    }

    pub fn has_memory_awb(&self) -> bool {
        !self.memory_awb.is_empty()
    }

    pub fn memory_awb_size(&self) -> usize {
        self.memory_awb.len()
    }

    /// Decode the embedded archive, if the sheet has one.
    pub fn memory_archive(&self) -> Option<Result<Afs2Archive>> {
        self.has_memory_awb()
            .then(|| Afs2Archive::decode(&self.memory_awb).map_err(Error::from))
    }
}

#[cfg(test)]
mod test {
    use cri_utf::{Table, TableWriter, Value, ValueType};
    use pretty_assertions::assert_eq;

    use crate::catalog::{CueCatalog, StreamRef, Streaming, Waveform};

    #[test]
    fn missing_columns_default() -> crate::error::Result<()> {
        let bytes = TableWriter::new("Header")
            .column("Name", ValueType::String)
            .row([Value::String("Empty".into())])
            .to_bytes()?;

        let catalog = CueCatalog::from_table(&Table::decode(&bytes)?);

        assert_eq!(
            catalog,
            CueCatalog {
                name: "Empty".into(),
                ..Default::default()
            }
        );
        assert!(!catalog.has_memory_awb());
        assert!(catalog.memory_archive().is_none());

        Ok(())
    }

    #[test]
    fn waveform_references() -> crate::error::Result<()> {
        let bytes = TableWriter::new("Waveform")
            .column("Id", ValueType::U16)
            .column("Streaming", ValueType::U8)
            .constant_column("EncodeType", Value::U8(2))
            .column("MemoryAwbId", ValueType::U16)
            .column("StreamAwbId", ValueType::U16)
            .absent_column("StreamAwbPortNo", ValueType::U16)
            .row([Value::U16(0), Value::U8(0), Value::U16(0), Value::U16(0xFFFF)])
            .row([Value::U16(1), Value::U8(1), Value::U16(0xFFFF), Value::U16(4)])
            .row([Value::U16(2), Value::U8(9), Value::U16(5), Value::U16(5)])
            .to_bytes()?;

        let waveforms = Table::decode(&bytes)?
            .rows
            .iter()
            .map(Waveform::from_row)
            .collect::<Vec<_>>();

        assert_eq!(waveforms[1].streaming, Streaming::Stream);
        assert_eq!(waveforms[1].stream_awb, Some(StreamRef { id: 4, port: 0 }));
        assert_eq!(waveforms[2].streaming, Streaming::Other(9));
        assert_eq!(waveforms[2].memory_awb_id, Some(5));
        assert!(waveforms.iter().all(|w| w.encode_type == 2));

        Ok(())
    }

    #[test]
    fn not_a_catalog() {
        assert!(matches!(
            CueCatalog::decode(b"AFS2", Default::default()),
            Err(crate::error::Error::NotACatalog)
        ));
    }

    #[test]
    fn table_without_rows_is_not_a_catalog() -> crate::error::Result<()> {
        let bytes = TableWriter::new("Header")
            .column("Name", ValueType::String)
            .to_bytes()?;

        assert!(matches!(
            CueCatalog::decode(&bytes, Default::default()),
            Err(crate::error::Error::NotACatalog)
        ));

        Ok(())
    }
}
