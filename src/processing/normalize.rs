//! Sheet normalization: header + positional rows into header + named records.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DatamineError, DatamineResult};
use crate::types::{Record, RecordReader, RowRef, SheetRow};

/// One header entry as exported. Only the column name is used; type metadata is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
}

impl RawColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A sheet as the extractor writes it: rows are aligned positionally to `header`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSheet {
    pub filename: String,
    pub header: Vec<RawColumn>,
    pub data: Vec<Vec<JsonValue>>,
}

/// A sheet whose rows are records keyed by column name.
///
/// Every record holds exactly the keys in `header`, and record order mirrors row order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSheet {
    pub filename: String,
    pub header: Vec<String>,
    pub data: Vec<Record>,
}

impl NormalizedSheet {
    /// Pair every row with the header.
    ///
    /// Fails with [`DatamineError::MalformedRow`] if a row's length differs from the header's,
    /// and with [`DatamineError::DuplicateColumn`] if the header repeats a name.
    pub fn from_raw(raw: RawSheet) -> DatamineResult<Self> {
        let RawSheet {
            filename,
            header,
            data,
        } = raw;
        let header: Vec<String> = header.into_iter().map(|c| c.name).collect();

        let mut seen = HashSet::with_capacity(header.len());
        for name in &header {
            if !seen.insert(name.as_str()) {
                return Err(DatamineError::DuplicateColumn {
                    sheet: filename,
                    column: name.clone(),
                });
            }
        }

        let mut records = Vec::with_capacity(data.len());
        for (row, values) in data.into_iter().enumerate() {
            if values.len() != header.len() {
                return Err(DatamineError::MalformedRow {
                    sheet: filename,
                    row,
                    expected: header.len(),
                    actual: values.len(),
                });
            }
            records.push(header.iter().cloned().zip(values).collect::<Record>());
        }

        Ok(Self {
            filename,
            header,
            data: records,
        })
    }

    /// Back to the positional form, in header order.
    pub fn to_raw(&self) -> RawSheet {
        RawSheet {
            filename: self.filename.clone(),
            header: self.header.iter().map(RawColumn::new).collect(),
            data: self
                .data
                .iter()
                .map(|rec| {
                    self.header
                        .iter()
                        .map(|k| rec.get(k).cloned().unwrap_or(JsonValue::Null))
                        .collect()
                })
                .collect(),
        }
    }

    /// Number of rows in the sheet.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Decode every row as `T`, after checking the header against `T`'s schema.
    pub fn rows<T: SheetRow>(&self) -> DatamineResult<Vec<T>> {
        T::schema().check_header(&self.filename, &self.header)?;
        self.data
            .iter()
            .enumerate()
            .map(|(i, rec)| T::from_record(&RecordReader::new(&self.filename, i, rec)))
            .collect()
    }
}

/// All normalized sheets of one export, keyed by filename. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSet {
    sheets: BTreeMap<String, NormalizedSheet>,
}

impl SheetSet {
    /// Normalize every raw sheet (in parallel on the current rayon pool).
    pub fn normalize(raw: Vec<RawSheet>) -> DatamineResult<Self> {
        let normalized = raw
            .into_par_iter()
            .map(NormalizedSheet::from_raw)
            .collect::<DatamineResult<Vec<_>>>()?;

        let mut sheets = BTreeMap::new();
        for sheet in normalized {
            if sheets.contains_key(&sheet.filename) {
                return Err(DatamineError::DuplicateSheet {
                    sheet: sheet.filename,
                });
            }
            sheets.insert(sheet.filename.clone(), sheet);
        }
        Ok(Self { sheets })
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Total row count across all sheets.
    pub fn row_count(&self) -> usize {
        self.sheets.values().map(NormalizedSheet::row_count).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    /// Look up a sheet by filename.
    pub fn sheet(&self, name: &str) -> DatamineResult<&NormalizedSheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| DatamineError::MissingSheet {
                sheet: name.to_string(),
            })
    }

    /// Decode every row of `T`'s sheet.
    pub fn rows<T: SheetRow>(&self) -> DatamineResult<Vec<T>> {
        self.sheet(T::SHEET)?.rows()
    }

    /// The record a reference points at. `from` names the referencing field for diagnostics.
    pub fn record<T: SheetRow>(&self, r: RowRef<T>, from: impl fmt::Display) -> DatamineResult<&Record> {
        let sheet = self.sheet(T::SHEET)?;
        sheet
            .data
            .get(r.index())
            .ok_or_else(|| DatamineError::DanglingReference {
                sheet: T::SHEET.to_string(),
                row: r.index(),
                from: from.to_string(),
            })
    }

    /// Follow a reference and decode the target row.
    pub fn resolve<T: SheetRow>(&self, r: RowRef<T>, from: impl fmt::Display) -> DatamineResult<T> {
        let sheet = self.sheet(T::SHEET)?;
        T::schema().check_header(&sheet.filename, &sheet.header)?;
        let rec = self.record(r, from)?;
        T::from_record(&RecordReader::new(T::SHEET, r.index(), rec))
    }
}

#[cfg(test)]
mod tests {
    use super::{NormalizedSheet, RawColumn, RawSheet, SheetSet};
    use crate::error::DatamineError;
    use crate::sheets::ItemVisualIdentityRow;
    use crate::types::RowRef;
    use serde_json::json;

    fn raw(filename: &str, header: &[&str], data: Vec<Vec<serde_json::Value>>) -> RawSheet {
        RawSheet {
            filename: filename.to_string(),
            header: header.iter().map(|h| RawColumn::new(*h)).collect(),
            data,
        }
    }

    fn visuals() -> RawSheet {
        raw(
            "ItemVisualIdentity.dat",
            &["Id", "DDSFile"],
            vec![
                vec![json!("a"), json!("art/a.dds")],
                vec![json!("b"), json!(null)],
            ],
        )
    }

    #[test]
    fn from_raw_pairs_rows_with_header_in_order() {
        let sheet = NormalizedSheet::from_raw(visuals()).unwrap();
        assert_eq!(sheet.header, vec!["Id", "DDSFile"]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.data[0]["Id"], json!("a"));
        assert_eq!(sheet.data[0]["DDSFile"], json!("art/a.dds"));
        assert_eq!(sheet.data[1]["DDSFile"], json!(null));
        assert!(sheet.data.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn from_raw_rejects_short_rows() {
        let bad = raw("X.dat", &["A", "B"], vec![vec![json!(1), json!(2)], vec![json!(1)]]);
        match NormalizedSheet::from_raw(bad).unwrap_err() {
            DatamineError::MalformedRow {
                sheet,
                row,
                expected,
                actual,
            } => {
                assert_eq!(sheet, "X.dat");
                assert_eq!(row, 1);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_raw_rejects_long_rows_and_duplicate_columns() {
        let long = raw("X.dat", &["A"], vec![vec![json!(1), json!(2)]]);
        assert!(matches!(
            NormalizedSheet::from_raw(long).unwrap_err(),
            DatamineError::MalformedRow { actual: 2, .. }
        ));

        let dup = raw("X.dat", &["A", "A"], vec![]);
        assert!(matches!(
            NormalizedSheet::from_raw(dup).unwrap_err(),
            DatamineError::DuplicateColumn { .. }
        ));
    }

    #[test]
    fn to_raw_then_normalize_is_identity() {
        let sheet = NormalizedSheet::from_raw(visuals()).unwrap();
        let again = NormalizedSheet::from_raw(sheet.to_raw()).unwrap();
        assert_eq!(again, sheet);
        assert_eq!(sheet.to_raw(), visuals());
    }

    #[test]
    fn sheet_set_rejects_duplicate_filenames() {
        let err = SheetSet::normalize(vec![visuals(), visuals()]).unwrap_err();
        assert!(matches!(err, DatamineError::DuplicateSheet { .. }));
    }

    #[test]
    fn resolve_follows_reference_and_reports_dangling() {
        let set = SheetSet::normalize(vec![visuals()]).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.row_count(), 2);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["ItemVisualIdentity.dat"]);

        let row: ItemVisualIdentityRow = set.resolve(RowRef::new(0), "test").unwrap();
        assert_eq!(row.dds_file.as_deref(), Some("art/a.dds"));

        let err = set
            .resolve::<ItemVisualIdentityRow>(RowRef::new(9), "UniqueMaps.dat[0]")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("UniqueMaps.dat[0]"));
        assert!(msg.contains("no row 9"));
    }

    #[test]
    fn missing_sheet_is_reported_by_name() {
        let set = SheetSet::default();
        let err = set.rows::<ItemVisualIdentityRow>().unwrap_err();
        assert_eq!(err.to_string(), "missing sheet ItemVisualIdentity.dat");
    }
}
