//! Value tree produced by the table reader.

use std::sync::Arc;

use derive_more::derive::{Constructor, Deref, Display, IntoIterator};
use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Storage method selected by the top three bits of a column's schema byte
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StorageMethod {
    /// The column has no value in any row
    Absent,

    /// The value follows the column's schema bytes and is shared by every row
    Inline,

    /// The value is read from the value region, one per row
    Sequential,
}

impl StorageMethod {
    /// Split a schema byte into its storage method and value type code.
    pub fn from_flags(flags: u8) -> (StorageMethod, u8) {
        let method = match (flags >> 5) & 0x7 {
            0 => StorageMethod::Absent,
            1 => StorageMethod::Inline,
            _ => StorageMethod::Sequential,
        };
        (method, flags & 0x1F)
    }

    /// Build the schema byte for this method and value type.
    pub fn flags(self, value_type: ValueType) -> u8 {
        let method = match self {
            StorageMethod::Absent => 0,
            StorageMethod::Inline => 1,
            StorageMethod::Sequential => 2,
        };
        (method << 5) | value_type as u8
    }
}

/// Type of a column's values, from the bottom five bits of its schema byte
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum ValueType {
    #[display("i8")]
    I8 = 0x10,
    #[display("u8")]
    U8 = 0x11,
    #[display("i16")]
    I16 = 0x12,
    #[display("u16")]
    U16 = 0x13,
    #[display("i32")]
    I32 = 0x14,
    #[display("u32")]
    U32 = 0x15,
    #[display("i64")]
    I64 = 0x16,
    #[display("u64")]
    U64 = 0x17,
    #[display("f32")]
    F32 = 0x18,
    #[display("f64")]
    F64 = 0x19,
    #[display("string")]
    String = 0x1A,
    #[display("data")]
    Data = 0x1B,
}

impl ValueType {
    /// Number of bytes a value of this type occupies in a row
    pub fn width(self) -> usize {
        match self {
            ValueType::I8 | ValueType::U8 => 1,
            ValueType::I16 | ValueType::U16 => 2,
            ValueType::I32 | ValueType::U32 | ValueType::F32 | ValueType::String => 4,
            ValueType::I64 | ValueType::U64 | ValueType::F64 | ValueType::Data => 8,
        }
    }
}

impl TryFrom<u8> for ValueType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x10 => ValueType::I8,
            0x11 => ValueType::U8,
            0x12 => ValueType::I16,
            0x13 => ValueType::U16,
            0x14 => ValueType::I32,
            0x15 => ValueType::U32,
            0x16 => ValueType::I64,
            0x17 => ValueType::U64,
            0x18 => ValueType::F32,
            0x19 => ValueType::F64,
            0x1A => ValueType::String,
            0x1B => ValueType::Data,
            other => return Err(other),
        })
    }
}

/// A single cell of a table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),

    /// A blob that decoded as a nested table
    Table(Arc<Table>),

    /// A blob that is not a table
    Data(Arc<[u8]>),

    /// The column stores nothing for this row
    Absent,
}

impl Value {
    /// The column type this value is stored as, `None` for [`Value::Absent`].
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Value::I8(_) => ValueType::I8,
            Value::U8(_) => ValueType::U8,
            Value::I16(_) => ValueType::I16,
            Value::U16(_) => ValueType::U16,
            Value::I32(_) => ValueType::I32,
            Value::U32(_) => ValueType::U32,
            Value::I64(_) => ValueType::I64,
            Value::U64(_) => ValueType::U64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::String(_) => ValueType::String,
            Value::Table(_) | Value::Data(_) => ValueType::Data,
            Value::Absent => return None,
        })
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Any integer that fits in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => Some(v),
            Value::I8(v) => u64::try_from(v).ok(),
            Value::I16(v) => u64::try_from(v).ok(),
            Value::I32(v) => u64::try_from(v).ok(),
            Value::I64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any integer that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Floats, and integers converted to floating point.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            _ => self
                .as_i64()
                .map(|v| v as f64)
                .or_else(|| self.as_u64().map(|v| v as f64)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    /// Raw bytes of a blob that did not decode as a table.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Data(d) => Some(d.as_ref()),
            _ => None,
        }
    }
}

/// One row of a table, columns in schema order
///
/// Column names are shared with every other row of the table.
#[derive(Debug, Clone, Default, PartialEq, Constructor, Deref, IntoIterator)]
#[into_iterator(owned, ref)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Row(IndexMap<Arc<str>, Value>);

impl Row {
    /// Look up a column, treating [`Value::Absent`] the same as a missing column.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_absent())
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.get(name).and_then(Value::as_table)
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(Value::as_bytes)
    }

    pub(crate) fn insert(&mut self, name: Arc<str>, value: Value) {
        self.0.insert(name, value);
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Something about a table that decoded but looks implausible
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Anomaly {
    /// A per-row value was read past the start of the string region
    #[display("row {row} column {column:?} read past the value region (offset {offset:#x})")]
    ValueRegionOverrun {
        row: usize,
        column: String,
        offset: usize,
    },
}

/// A decoded `@UTF` table
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Table {
    /// Name of the table from the string region
    pub name: String,

    /// Number of columns in the schema
    pub column_count: u16,

    /// Size of one row in the value region, as declared by the header
    pub row_width: u16,

    /// Rows in file order
    pub rows: Vec<Row>,

    /// Problems noticed while decoding that did not stop it
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub anomalies: Vec<Anomaly>,
}

impl Table {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first row. Container tables such as an ACB header hold exactly one.
    pub fn root(&self) -> Option<&Row> {
        self.rows.first()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::types::{Row, StorageMethod, Value, ValueType};

    #[test]
    fn split_schema_flags() {
        assert_eq!(StorageMethod::from_flags(0x1A), (StorageMethod::Absent, 0x1A));
        assert_eq!(StorageMethod::from_flags(0x3A), (StorageMethod::Inline, 0x1A));
        assert_eq!(StorageMethod::from_flags(0x5A), (StorageMethod::Sequential, 0x1A));
        assert_eq!(StorageMethod::from_flags(0xB3), (StorageMethod::Sequential, 0x13));
    }

    #[test]
    fn flags_round_trip() {
        for method in [
            StorageMethod::Absent,
            StorageMethod::Inline,
            StorageMethod::Sequential,
        ] {
            let flags = method.flags(ValueType::U16);
            assert_eq!(StorageMethod::from_flags(flags), (method, 0x13));
        }
    }

    #[test]
    fn unknown_value_type() {
        assert_eq!(ValueType::try_from(0x1B), Ok(ValueType::Data));
        assert_eq!(ValueType::try_from(0x1C), Err(0x1C));
        assert_eq!(ValueType::try_from(0x00), Err(0x00));
    }

    #[test]
    fn integer_widening() {
        assert_eq!(Value::U8(7).as_u64(), Some(7));
        assert_eq!(Value::I16(-1).as_u64(), None);
        assert_eq!(Value::I16(-1).as_i64(), Some(-1));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::U32(3).as_f64(), Some(3.0));
        assert_eq!(Value::String("3".into()).as_u64(), None);
    }

    #[test]
    fn absent_reads_as_missing() {
        let row: Row = [("Name", Value::Absent), ("Id", Value::U16(4))]
            .into_iter()
            .collect();

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("Name"), None);
        assert_eq!(row.u64("Id"), Some(4));
        assert_eq!(row.get("Missing"), None);
    }
}
