//! Core data model types for typed sheet access.
//!
//! Normalized sheets hold schema-less [`Record`]s. Each sheet the build reads is described by a
//! [`SheetRow`] type with a [`Schema`] (a list of typed [`Field`]s), checked against the sheet
//! header before any row is decoded. Cross-sheet links are [`RowRef`]s: typed positional
//! references into a named sheet.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde_json::Value as JsonValue;

use crate::error::{DatamineError, DatamineResult};

/// One normalized row: column name to cell value.
pub type Record = serde_json::Map<String, JsonValue>;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Nullable 0-based row index into another sheet.
    RowIndex,
    /// Boolean flag.
    Bool,
    /// Nullable UTF-8 string.
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// The columns a record type reads from its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Fails with [`DatamineError::SchemaMismatch`] unless every field is a header column.
    ///
    /// Extra header columns are allowed; the export carries far more than the build reads.
    pub fn check_header(&self, sheet: &str, header: &[String]) -> DatamineResult<()> {
        let missing: Vec<&str> = self
            .field_names()
            .filter(|name| !header.iter().any(|h| h == name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatamineError::SchemaMismatch {
                sheet: sheet.to_string(),
                message: format!("missing required column(s): {}", missing.join(", ")),
            })
        }
    }
}

/// A record type decoded from one row of a known sheet.
pub trait SheetRow: Sized {
    /// Filename of the sheet in the export, e.g. `"WorldAreas.dat"`.
    const SHEET: &'static str;

    /// Columns this type reads.
    fn schema() -> Schema;

    /// Decode one row. The header has already been checked against [`Self::schema`].
    fn from_record(reader: &RecordReader<'_>) -> DatamineResult<Self>;
}

/// Typed cell access for one record, reporting errors with sheet/row/column context.
#[derive(Debug, Clone, Copy)]
pub struct RecordReader<'a> {
    sheet: &'a str,
    row: usize,
    record: &'a Record,
}

impl<'a> RecordReader<'a> {
    pub fn new(sheet: &'a str, row: usize, record: &'a Record) -> Self {
        Self { sheet, row, record }
    }

    /// Read a nullable string cell.
    pub fn utf8(&self, column: &str) -> DatamineResult<Option<String>> {
        let v = self.cell(column)?;
        if v.is_null() {
            return Ok(None);
        }
        v.as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| self.parse_error(column, v, "expected string"))
    }

    /// Read a string cell that identifies the row; null is a parse error.
    pub fn id(&self, column: &str) -> DatamineResult<String> {
        let v = self.cell(column)?;
        v.as_str()
            .map(str::to_string)
            .ok_or_else(|| self.parse_error(column, v, "expected non-null string id"))
    }

    /// Read a boolean cell. Flags are never null in the export.
    pub fn bool(&self, column: &str) -> DatamineResult<bool> {
        let v = self.cell(column)?;
        v.as_bool()
            .ok_or_else(|| self.parse_error(column, v, "expected bool"))
    }

    /// Read a nullable row-index cell.
    pub fn row_index(&self, column: &str) -> DatamineResult<Option<usize>> {
        let v = self.cell(column)?;
        if v.is_null() {
            return Ok(None);
        }
        let n = v
            .as_u64()
            .ok_or_else(|| self.parse_error(column, v, "expected non-negative integer row index"))?;
        usize::try_from(n)
            .map(Some)
            .map_err(|_| self.parse_error(column, v, "row index out of range"))
    }

    fn cell(&self, column: &str) -> DatamineResult<&'a JsonValue> {
        self.record
            .get(column)
            .ok_or_else(|| DatamineError::SchemaMismatch {
                sheet: self.sheet.to_string(),
                message: format!("row {} has no column '{column}'", self.row),
            })
    }

    fn parse_error(&self, column: &str, raw: &JsonValue, message: &str) -> DatamineError {
        DatamineError::ParseError {
            sheet: self.sheet.to_string(),
            row: self.row,
            column: column.to_string(),
            raw: raw.to_string(),
            message: message.to_string(),
        }
    }
}

/// A positional reference to row `index` of the sheet behind `T`.
///
/// Resolved only through [`crate::processing::SheetSet::resolve`].
pub struct RowRef<T> {
    index: usize,
    _row: PhantomData<fn() -> T>,
}

impl<T> RowRef<T> {
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _row: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T: SheetRow> RowRef<T> {
    /// Filename of the referenced sheet.
    pub fn sheet(&self) -> &'static str {
        T::SHEET
    }
}

impl<T> Clone for RowRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RowRef<T> {}

impl<T> PartialEq for RowRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for RowRef<T> {}

impl<T> Hash for RowRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: SheetRow> fmt::Debug for RowRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowRef({}[{}])", T::SHEET, self.index)
    }
}

impl<T: SheetRow> fmt::Display for RowRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", T::SHEET, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::{DataType, Field, RecordReader, Schema};
    use crate::error::DatamineError;
    use serde_json::json;

    fn record(v: serde_json::Value) -> super::Record {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn schema_index_of_works() {
        let schema = Schema::new(vec![
            Field::new("Id", DataType::Utf8),
            Field::new("IsTown", DataType::Bool),
        ]);
        assert_eq!(schema.index_of("Id"), Some(0));
        assert_eq!(schema.index_of("IsTown"), Some(1));
        assert_eq!(schema.index_of("missing"), None);
    }

    #[test]
    fn check_header_reports_every_missing_column() {
        let schema = Schema::new(vec![
            Field::new("Id", DataType::Utf8),
            Field::new("Name", DataType::Utf8),
            Field::new("IsTown", DataType::Bool),
        ]);
        let header = vec!["Id".to_string(), "Extra".to_string()];
        let err = schema.check_header("WorldAreas.dat", &header).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("WorldAreas.dat"));
        assert!(msg.contains("Name, IsTown"));
    }

    #[test]
    fn reader_decodes_nullable_cells() {
        let rec = record(json!({"Id": "G1_town", "Key": null, "Idx": 4, "Flag": true}));
        let r = RecordReader::new("WorldAreas.dat", 0, &rec);
        assert_eq!(r.utf8("Id").unwrap(), Some("G1_town".to_string()));
        assert_eq!(r.row_index("Key").unwrap(), None);
        assert_eq!(r.row_index("Idx").unwrap(), Some(4));
        assert!(r.bool("Flag").unwrap());
    }

    #[test]
    fn reader_rejects_wrong_types() {
        let rec = record(json!({"Idx": -1, "Flag": null, "Id": 3}));
        let r = RecordReader::new("AtlasNode.dat", 7, &rec);
        match r.row_index("Idx").unwrap_err() {
            DatamineError::ParseError { row, column, .. } => {
                assert_eq!(row, 7);
                assert_eq!(column, "Idx");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(r.bool("Flag").is_err());
        assert!(r.utf8("Id").is_err());
        assert!(matches!(
            r.utf8("Absent").unwrap_err(),
            DatamineError::SchemaMismatch { .. }
        ));
    }
}
