//! Types for writing `@UTF` tables
//!

use indexmap::IndexMap;
use tracing::instrument;

use crate::{
    error::{Error, Result},
    types::{StorageMethod, Table, Value, ValueType},
    MAGIC,
};

#[derive(Debug, Clone, PartialEq)]
enum ColumnKind {
    Absent(ValueType),
    Constant(Value),
    PerRow(ValueType),
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    kind: ColumnKind,
}

/// `@UTF` table generator
///
/// Columns are declared up front with their storage method. Rows then supply one value for each
/// per-row column, in declaration order.
///
/// ```
/// # fn doit() -> cri_utf::error::Result<()> {
/// use cri_utf::{Table, TableWriter, Value, ValueType};
///
/// let bytes = TableWriter::new("CueName")
///     .constant_column("Version", Value::U32(1))
///     .column("CueName", ValueType::String)
///     .column("CueIndex", ValueType::U16)
///     .row([Value::String("bgm_title".into()), Value::U16(0)])
///     .row([Value::String("se_click".into()), Value::U16(1)])
///     .to_bytes()?;
///
/// let table = Table::decode(&bytes)?;
/// assert_eq!(table.rows[1].str("CueName"), Some("se_click"));
/// assert_eq!(table.rows[1].u64("Version"), Some(1));
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableWriter {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

/// String and blob regions collected while encoding
#[derive(Default)]
struct Pools {
    strings: Vec<u8>,
    offsets: IndexMap<String, u32>,
    data: Vec<u8>,
}

impl Pools {
    fn intern(&mut self, s: &str) -> Result<u32> {
        if let Some(offset) = self.offsets.get(s) {
            return Ok(*offset);
        }
        let offset = u32::try_from(self.strings.len()).map_err(|_| Error::TooLarge)?;
        self.strings.extend_from_slice(s.as_bytes());
        self.strings.push(0);
        self.offsets.insert(s.to_owned(), offset);
        Ok(offset)
    }

    fn blob(&mut self, bytes: &[u8]) -> Result<(u32, u32)> {
        let offset = u32::try_from(self.data.len()).map_err(|_| Error::TooLarge)?;
        let length = u32::try_from(bytes.len()).map_err(|_| Error::TooLarge)?;
        self.data.extend_from_slice(bytes);
        Ok((offset, length))
    }
}

impl TableWriter {
    /// Start a table with the given name and no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Rebuild a writer from a decoded table.
    ///
    /// The first row decides the schema: absent values become absent columns and everything
    /// else is stored per row. Every row must have the same columns.
    pub fn from_table(table: &Table) -> Result<Self> {
        let mut writer = Self::new(&table.name);
        let Some(first) = table.root() else {
            return Ok(writer);
        };

        for (name, value) in first.iter() {
            writer = match value.value_type() {
                Some(value_type) => writer.column(&**name, value_type),
                None => writer.absent_column(&**name, ValueType::U8),
            };
        }

        for row in &table.rows {
            let values = writer
                .columns
                .iter()
                .filter(|c| matches!(c.kind, ColumnKind::PerRow(_)))
                .map(|c| row.get(&c.name).cloned().unwrap_or(Value::Absent))
                .collect::<Vec<_>>();
            writer.push_row(values);
        }

        Ok(writer)
    }

    /// Declare a column with no value in any row.
    pub fn absent_column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            kind: ColumnKind::Absent(value_type),
        });
        self
    }

    /// Declare a column whose single value is stored inline in the schema.
    pub fn constant_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.push(Column {
            name: name.into(),
            kind: ColumnKind::Constant(value),
        });
        self
    }

    /// Declare a column with one value per row.
    pub fn column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            kind: ColumnKind::PerRow(value_type),
        });
        self
    }

    /// Append a row of per-row values.
    pub fn row(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.push_row(values);
        self
    }

    /// Append a row of per-row values.
    pub fn push_row(&mut self, values: impl IntoIterator<Item = Value>) {
        self.rows.push(values.into_iter().collect());
    }

    /// Number of rows added so far
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were added
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encode the table.
    #[instrument(skip(self), fields(name = %self.name, rows = self.rows.len()), err)]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut pools = Pools::default();
        let name_offset = pools.intern(&self.name)?;

        let mut schema = Vec::new();
        for column in &self.columns {
            let (method, value_type) = match &column.kind {
                ColumnKind::Absent(t) => (StorageMethod::Absent, *t),
                ColumnKind::PerRow(t) => (StorageMethod::Sequential, *t),
                ColumnKind::Constant(v) => (
                    StorageMethod::Inline,
                    v.value_type().ok_or_else(|| Error::TypeMismatch {
                        column: column.name.clone(),
                        expected: ValueType::U8,
                    })?,
                ),
            };

            schema.push(method.flags(value_type));
            schema.extend_from_slice(&pools.intern(&column.name)?.to_be_bytes());
            if let ColumnKind::Constant(value) = &column.kind {
                write_value(&mut schema, value, &mut pools)?;
            }
        }

        let per_row = self
            .columns
            .iter()
            .filter_map(|c| match c.kind {
                ColumnKind::PerRow(t) => Some((c.name.as_str(), t)),
                _ => None,
            })
            .collect::<Vec<_>>();
        let row_width = per_row.iter().map(|(_, t)| t.width()).sum::<usize>();

        let mut values = Vec::with_capacity(row_width * self.rows.len());
        for row in &self.rows {
            if row.len() != per_row.len() {
                return Err(Error::RowLength {
                    expected: per_row.len(),
                    found: row.len(),
                });
            }
            for ((column, value_type), value) in per_row.iter().zip(row) {
                if value.value_type() != Some(*value_type) {
                    return Err(Error::TypeMismatch {
                        column: (*column).to_owned(),
                        expected: *value_type,
                    });
                }
                write_value(&mut values, value, &mut pools)?;
            }
        }

        let header_size = 24;
        let value_offset = header_size + schema.len();
        let string_offset = value_offset + values.len();
        let data_offset = string_offset + pools.strings.len();
        let size = data_offset + pools.data.len();

        let mut out = Vec::with_capacity(8 + size);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&to_u32(size)?.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&to_u16(value_offset)?.to_be_bytes());
        out.extend_from_slice(&to_u32(string_offset)?.to_be_bytes());
        out.extend_from_slice(&to_u32(data_offset)?.to_be_bytes());
        out.extend_from_slice(&name_offset.to_be_bytes());
        out.extend_from_slice(&to_u16(self.columns.len())?.to_be_bytes());
        out.extend_from_slice(&to_u16(row_width)?.to_be_bytes());
        out.extend_from_slice(&to_u32(self.rows.len())?.to_be_bytes());
        out.extend_from_slice(&schema);
        out.extend_from_slice(&values);
        out.extend_from_slice(&pools.strings);
        out.extend_from_slice(&pools.data);

        Ok(out)
    }
}

fn to_u16(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::TooLarge)
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::TooLarge)
}

/// Append a value in its big endian row encoding.
fn write_value(out: &mut Vec<u8>, value: &Value, pools: &mut Pools) -> Result<()> {
    match value {
        Value::I8(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::U8(v) => out.push(*v),
        Value::I16(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::U16(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::I32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::U32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::I64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::U64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::F32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::F64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::String(s) => out.extend_from_slice(&pools.intern(s)?.to_be_bytes()),
        Value::Data(bytes) => {
            let (offset, length) = pools.blob(bytes)?;
            out.extend_from_slice(&offset.to_be_bytes());
            out.extend_from_slice(&length.to_be_bytes());
        }
        Value::Table(table) => {
            let nested = TableWriter::from_table(table)?.to_bytes()?;
            let (offset, length) = pools.blob(&nested)?;
            out.extend_from_slice(&offset.to_be_bytes());
            out.extend_from_slice(&length.to_be_bytes());
        }
        Value::Absent => {}
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{
        error::{Error, Result},
        types::{Table, Value, ValueType},
        write::TableWriter,
    };

    #[test]
    fn write_single_string() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            b'@', b'U', b'T', b'F',
            0x00, 0x00, 0x00, 0x2F,
            0x00, 0x01,
            0x00, 0x1D,
            0x00, 0x00, 0x00, 0x21,
            0x00, 0x00, 0x00, 0x2F,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x01,
            0x00, 0x04,
            0x00, 0x00, 0x00, 0x01,
            0x5A, 0x00, 0x00, 0x00, 0x04,
            0x00, 0x00, 0x00, 0x09,
            b't', b'b', b'l', 0x00,
            b'N', b'a', b'm', b'e', 0x00,
            b't', b'e', b's', b't', 0x00,
        ];

        let actual = TableWriter::new("tbl")
            .column("Name", ValueType::String)
            .row([Value::String("test".into())])
            .to_bytes()?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn write_rejects_wrong_arity() {
        let result = TableWriter::new("tbl")
            .column("A", ValueType::U8)
            .column("B", ValueType::U8)
            .row([Value::U8(1)])
            .to_bytes();

        assert_eq!(
            result,
            Err(Error::RowLength {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn write_rejects_wrong_type() {
        let result = TableWriter::new("tbl")
            .column("A", ValueType::U8)
            .row([Value::U16(1)])
            .to_bytes();

        assert_eq!(
            result,
            Err(Error::TypeMismatch {
                column: "A".into(),
                expected: ValueType::U8
            })
        );
    }

    #[test]
    fn rewrite_decoded_table() -> Result<()> {
        let original = TableWriter::new("Waveform")
            .column("Id", ValueType::U16)
            .column("Volume", ValueType::F32)
            .column("Name", ValueType::String)
            .row([Value::U16(0), Value::F32(0.5), Value::String("a".into())])
            .row([Value::U16(1), Value::F32(1.0), Value::String("b".into())])
            .to_bytes()?;

        let decoded = Table::decode(&original)?;
        let rewritten = TableWriter::from_table(&decoded)?.to_bytes()?;

        assert_eq!(rewritten, original);

        Ok(())
    }
}
