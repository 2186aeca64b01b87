//! JSON parsing for extractor output.
//!
//! Both the aggregate export and each language file are a JSON array of sheets:
//! `[{"filename": "WorldAreas.dat", "header": [{"name": "Id", ...}, ...], "data": [[...], ...]}]`.
//! Header entries may carry extra metadata; only `name` is kept.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{DatamineError, DatamineResult};
use crate::processing::RawSheet;

/// Read and parse a sheet array from disk.
///
/// A missing file is reported as [`DatamineError::InputNotFound`].
pub fn parse_sheets_from_path(path: impl AsRef<Path>) -> DatamineResult<Vec<RawSheet>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DatamineError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => DatamineError::Io(e),
    })?;
    parse_sheets_from_str(&text)
}

/// Parse a sheet array from an in-memory string.
pub fn parse_sheets_from_str(input: &str) -> DatamineResult<Vec<RawSheet>> {
    Ok(serde_json::from_str(input)?)
}
