//! Types for reading `@UTF` tables
//!

use std::{collections::HashMap, sync::Arc};

use bon::Builder;
use byteorder::BigEndian;
use cri_cursor::ByteCursor;
use tracing::{debug, instrument, trace, warn};

use crate::{
    error::{Error, Result},
    types::{Anomaly, Row, StorageMethod, Table, Value, ValueType},
    MAGIC,
};

/// Default limit for tables nested inside blob columns
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default number of cells and copied bytes a decode may produce per input byte
pub const DEFAULT_MAX_EXPANSION: usize = 16;

/// Size of the fixed header that follows the magic and size fields
const HEADER_SIZE: usize = 24;

/// Options controlling how tables are read
#[derive(Debug, Clone, Copy, Builder)]
pub struct ReadOptions {
    /// How many levels of nested tables are decoded before giving up
    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Cells plus copied string and blob bytes allowed for each byte of input.
    ///
    /// Cells cost one each, nested tables count against the same allowance.
    #[builder(default = DEFAULT_MAX_EXPANSION)]
    pub max_expansion: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The fixed header of a table. Offsets are relative to the end of the size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableHeader {
    value_offset: u16,
    string_offset: u32,
    data_offset: u32,
    name_offset: u32,
    column_count: u16,
    row_width: u16,
    row_count: u32,
}

impl TableHeader {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let _version = cursor.read_u16::<BigEndian>()?;
        Ok(Self {
            value_offset: cursor.read_u16::<BigEndian>()?,
            string_offset: cursor.read_u32::<BigEndian>()?,
            data_offset: cursor.read_u32::<BigEndian>()?,
            name_offset: cursor.read_u32::<BigEndian>()?,
            column_count: cursor.read_u16::<BigEndian>()?,
            row_width: cursor.read_u16::<BigEndian>()?,
            row_count: cursor.read_u32::<BigEndian>()?,
        })
    }
}

impl Table {
    /// Decode the table at the start of `data`.
    ///
    /// ```
    /// # fn doit(data: &[u8]) -> cri_utf::error::Result<()> {
    /// let table = cri_utf::Table::decode(data)?;
    /// for row in &table.rows {
    ///     println!("{:?}", row.str("CueName"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode(data: &[u8]) -> Result<Table> {
        let found = data.get(..4).map_or([0; 4], |m| {
            let mut magic = [0; 4];
            magic.copy_from_slice(m);
            magic
        });

        Self::decode_at(data, 0, ReadOptions::default())?
            .ok_or(Error::MagicMismatch { found })
    }

    /// Decode the table starting at `offset`.
    ///
    /// Returns `Ok(None)` when the bytes there are not a table.
    #[instrument(skip(data), fields(size = data.len()), err, level = "debug")]
    pub fn decode_at(data: &[u8], offset: usize, options: ReadOptions) -> Result<Option<Table>> {
        TableReader::new(options, data.len()).read(data, offset, 0)
    }
}

/// Probe whether `data` starts with a table without decoding it.
pub fn is_table(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// State shared by a table and every table nested in it
struct TableReader {
    options: ReadOptions,
    limit: usize,
    /// Units left from `limit`
    allowance: usize,
}

/// Where a column's value comes from
enum Source {
    Absent,
    Inline(Value),
    Sequential(u8),
}

struct Column {
    name: Arc<str>,
    source: Source,
}

/// One table being read. Strings and blobs are shared between the cells that point at them.
struct Frame<'a> {
    data: &'a [u8],
    depth: usize,
    strings: usize,
    blobs: usize,
    string_cache: HashMap<usize, Arc<str>>,
    blob_cache: HashMap<(usize, usize), Value>,
}

impl TableReader {
    fn new(options: ReadOptions, size: usize) -> Self {
        let limit = size.saturating_mul(options.max_expansion);
        Self {
            options,
            limit,
            allowance: limit,
        }
    }

    fn spend(&mut self, units: usize) -> Result<()> {
        self.allowance = self
            .allowance
            .checked_sub(units)
            .ok_or(Error::ExpansionLimit { limit: self.limit })?;
        Ok(())
    }

    fn read(&mut self, data: &[u8], offset: usize, depth: usize) -> Result<Option<Table>> {
        let mut cursor = ByteCursor::at(data, offset)?;
        if cursor.remaining() < MAGIC.len() || !is_table(&data[offset..]) {
            return Ok(None);
        }
        cursor.skip(MAGIC.len())?;

        let _size = cursor.read_u32::<BigEndian>()?;
        let base = cursor.position();
        let header = TableHeader::read(&mut cursor)?;
        let schema_start = base + HEADER_SIZE;

        if header.row_count as usize > data.len() {
            return Err(Error::TooManyRows {
                rows: header.row_count,
                size: data.len(),
            });
        }
        self.spend((header.row_count as usize).saturating_mul(usize::from(header.column_count)))?;

        let mut frame = Frame {
            data,
            depth,
            strings: base.saturating_add(header.string_offset as usize),
            blobs: base.saturating_add(header.data_offset as usize),
            string_cache: HashMap::new(),
            blob_cache: HashMap::new(),
        };
        let name = self.read_string(&mut frame, header.name_offset as usize)?;

        debug!(
            name = %name,
            rows = header.row_count,
            columns = header.column_count,
            depth,
            "reading table"
        );

        // Inline values sit between the schema bytes and are the same for every row.
        let columns = match header.row_count {
            0 => Vec::new(),
            _ => self.read_schema(&mut frame, schema_start, header.column_count)?,
        };

        let mut values = ByteCursor::at(data, base + header.value_offset as usize)?;
        let mut anomalies = Vec::new();
        let mut rows = Vec::with_capacity(header.row_count as usize);

        for row_index in 0..header.row_count as usize {
            let mut row = Row::default();

            for column in &columns {
                let value = match &column.source {
                    Source::Absent => Value::Absent,
                    Source::Inline(value) => value.clone(),
                    Source::Sequential(code) => {
                        let value = self.read_value(&mut frame, &mut values, *code, &column.name)?;
                        if values.position() > frame.strings && frame.strings > base {
                            let anomaly = Anomaly::ValueRegionOverrun {
                                row: row_index,
                                column: column.name.to_string(),
                                offset: values.position(),
                            };
                            warn!(table = %name, "{anomaly}");
                            anomalies.push(anomaly);
                        }
                        value
                    }
                };

                row.insert(Arc::clone(&column.name), value);
            }

            rows.push(row);
        }

        Ok(Some(Table {
            name: name.to_string(),
            column_count: header.column_count,
            row_width: header.row_width,
            rows,
            anomalies,
        }))
    }

    fn read_schema(
        &mut self,
        frame: &mut Frame<'_>,
        start: usize,
        count: u16,
    ) -> Result<Vec<Column>> {
        let mut schema = ByteCursor::at(frame.data, start)?;
        let mut columns = Vec::with_capacity(usize::from(count));

        for _ in 0..count {
            let flags = schema.read_u8()?;
            let name_offset = schema.read_u32::<BigEndian>()? as usize;
            let name = self.read_string(frame, name_offset)?;

            let (method, code) = StorageMethod::from_flags(flags);
            trace!(column = %name, ?method, code, "column");

            let source = match method {
                StorageMethod::Absent => Source::Absent,
                StorageMethod::Inline => {
                    Source::Inline(self.read_value(frame, &mut schema, code, &name)?)
                }
                StorageMethod::Sequential => Source::Sequential(code),
            };
            columns.push(Column { name, source });
        }

        Ok(columns)
    }

    /// A string from the string region, read once per offset.
    fn read_string(&mut self, frame: &mut Frame<'_>, offset: usize) -> Result<Arc<str>> {
        let start = frame.strings.saturating_add(offset);
        if let Some(s) = frame.string_cache.get(&start) {
            return Ok(Arc::clone(s));
        }

        let s: Arc<str> = ByteCursor::new(frame.data).read_cstr_at(start)?.into();
        self.spend(s.len())?;
        frame.string_cache.insert(start, Arc::clone(&s));
        Ok(s)
    }

    fn read_value(
        &mut self,
        frame: &mut Frame<'_>,
        cursor: &mut ByteCursor<'_>,
        code: u8,
        column: &str,
    ) -> Result<Value> {
        let value_type = ValueType::try_from(code).map_err(|code| Error::UnsupportedField {
            column: column.to_owned(),
            code,
        })?;

        Ok(match value_type {
            ValueType::I8 => Value::I8(cursor.read_i8()?),
            ValueType::U8 => Value::U8(cursor.read_u8()?),
            ValueType::I16 => Value::I16(cursor.read_i16::<BigEndian>()?),
            ValueType::U16 => Value::U16(cursor.read_u16::<BigEndian>()?),
            ValueType::I32 => Value::I32(cursor.read_i32::<BigEndian>()?),
            ValueType::U32 => Value::U32(cursor.read_u32::<BigEndian>()?),
            ValueType::I64 => Value::I64(cursor.read_i64::<BigEndian>()?),
            ValueType::U64 => Value::U64(cursor.read_u64::<BigEndian>()?),
            ValueType::F32 => Value::F32(cursor.read_f32::<BigEndian>()?),
            ValueType::F64 => Value::F64(cursor.read_f64::<BigEndian>()?),
            ValueType::String => {
                let offset = cursor.read_u32::<BigEndian>()? as usize;
                Value::String(self.read_string(frame, offset)?)
            }
            ValueType::Data => {
                let offset = cursor.read_u32::<BigEndian>()? as usize;
                let length = cursor.read_u32::<BigEndian>()? as usize;
                let start = frame.blobs.saturating_add(offset);
                if let Some(value) = frame.blob_cache.get(&(start, length)) {
                    return Ok(value.clone());
                }

                let blob = cursor
                    .slice(start..start.saturating_add(length))
                    .map_err(|_| Error::TruncatedChunk {
                        offset: start,
                        length,
                        size: frame.data.len(),
                    })?;
                let value = self.read_blob(blob, frame.depth, column)?;
                frame.blob_cache.insert((start, length), value.clone());
                value
            }
        })
    }

    /// A blob holds either a nested table or opaque bytes.
    fn read_blob(&mut self, blob: &[u8], depth: usize, column: &str) -> Result<Value> {
        if is_table(blob) {
            if depth >= self.options.max_depth {
                return Err(Error::DepthExceeded {
                    max_depth: self.options.max_depth,
                });
            }

            match self.read(blob, 0, depth + 1) {
                Ok(Some(table)) => return Ok(Value::Table(Arc::new(table))),
                Ok(None) => {}
                Err(err @ (Error::DepthExceeded { .. } | Error::ExpansionLimit { .. })) => {
                    return Err(err)
                }
                Err(err) => debug!(column, %err, "blob looked like a table but did not decode"),
            }
        }

        self.spend(blob.len())?;
        Ok(Value::Data(blob.into()))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{
        error::{Error, Result},
        read::ReadOptions,
        types::{Row, Table, Value},
    };

    #[rustfmt::skip]
    const SINGLE_STRING: [u8; 55] = [
        b'@', b'U', b'T', b'F',
        0x00, 0x00, 0x00, 0x2F,  // Size
        0x00, 0x01,              // Version
        0x00, 0x1D,              // Value offset
        0x00, 0x00, 0x00, 0x21,  // String offset
        0x00, 0x00, 0x00, 0x2F,  // Data offset
        0x00, 0x00, 0x00, 0x00,  // Name offset
        0x00, 0x01,              // Columns
        0x00, 0x04,              // Row width
        0x00, 0x00, 0x00, 0x01,  // Rows
        // Schema
        0x5A, 0x00, 0x00, 0x00, 0x04,
        // Values
        0x00, 0x00, 0x00, 0x09,
        // Strings
        b't', b'b', b'l', 0x00,
        b'N', b'a', b'm', b'e', 0x00,
        b't', b'e', b's', b't', 0x00,
    ];

    #[test]
    fn read_single_string() -> Result<()> {
        let table = Table::decode(&SINGLE_STRING)?;

        assert_eq!(table.name, "tbl");
        assert_eq!(table.column_count, 1);
        assert_eq!(table.row_width, 4);
        assert_eq!(
            table.rows,
            vec![[("Name", Value::String("test".into()))]
                .into_iter()
                .collect::<Row>()]
        );
        assert!(table.anomalies.is_empty());

        Ok(())
    }

    #[test]
    fn read_is_deterministic() -> Result<()> {
        assert_eq!(Table::decode(&SINGLE_STRING)?, Table::decode(&SINGLE_STRING)?);
        Ok(())
    }

    #[test]
    fn read_at_offset() -> Result<()> {
        let mut input = vec![0xEE; 3];
        input.extend_from_slice(&SINGLE_STRING);

        let table = Table::decode_at(&input, 3, ReadOptions::default())?;
        assert_eq!(table.map(|t| t.rows.len()), Some(1));

        Ok(())
    }

    #[test]
    fn read_invalid_magic() {
        let mut input = SINGLE_STRING;
        input[0] = b'#';

        assert_eq!(
            Table::decode_at(&input, 0, ReadOptions::default()),
            Ok(None)
        );
        assert_eq!(
            Table::decode(&input),
            Err(Error::MagicMismatch { found: *b"#UTF" })
        );
        assert_eq!(Table::decode_at(b"@U", 0, ReadOptions::default()), Ok(None));
    }

    #[test]
    fn read_truncated_table() {
        let input = &SINGLE_STRING[..38];
        assert!(matches!(Table::decode(input), Err(Error::Bounds(_))));
    }

    #[test]
    fn read_unknown_value_type() {
        let mut input = SINGLE_STRING;
        input[32] = 0x5C;

        assert_eq!(
            Table::decode(&input),
            Err(Error::UnsupportedField {
                column: "Name".into(),
                code: 0x1C
            })
        );
    }

    #[test]
    fn read_absent_column() -> Result<()> {
        let mut input = SINGLE_STRING;
        input[32] = 0x1A;

        let table = Table::decode(&input)?;
        assert_eq!(table.rows[0].get("Name"), None);
        assert_eq!(table.rows[0].len(), 1);

        Ok(())
    }

    #[test]
    fn read_impossible_row_count() {
        let mut input = SINGLE_STRING;
        input[28..32].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

        assert_eq!(
            Table::decode(&input),
            Err(Error::TooManyRows {
                rows: u32::MAX,
                size: 55
            })
        );
    }

    #[test]
    fn flags_sequential_overrun() -> Result<()> {
        let mut input = SINGLE_STRING;
        // Five one byte rows, but the value region only holds four before the strings start
        input[31] = 0x05;
        input[32] = 0x51;

        let table = Table::decode(&input)?;
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[3].u64("Name"), Some(9));
        assert_eq!(table.rows[4].u64("Name"), Some(b't' as u64));
        assert_eq!(table.anomalies.len(), 1);

        Ok(())
    }
}
