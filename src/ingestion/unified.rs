//! Loading a whole export directory.
//!
//! The extractor writes (by default under `dist/`):
//!
//! - `all.json`: every sheet the build needs, as one sheet array
//! - `lang/<code>.json`: the localized sheets for one language, same shape
//!
//! [`load_export`] reads all of it into memory in one pass. Language files are read in
//! parallel on the current rayon pool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{DatamineError, DatamineResult};
use crate::processing::RawSheet;

use super::json::parse_sheets_from_path;

/// Where the extractor's output lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    /// Export root directory.
    pub root: PathBuf,
    /// Aggregate sheet file, relative to `root`.
    pub aggregate_file: PathBuf,
    /// Directory of per-language files, relative to `root`.
    pub lang_dir: PathBuf,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self::new("dist")
    }
}

impl ExportLayout {
    /// The default file names under a custom root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            aggregate_file: PathBuf::from("all.json"),
            lang_dir: PathBuf::from("lang"),
        }
    }

    pub fn aggregate_path(&self) -> PathBuf {
        self.root.join(&self.aggregate_file)
    }

    pub fn lang_path(&self) -> PathBuf {
        self.root.join(&self.lang_dir)
    }
}

/// Raw sheets of one export: the aggregate sheets plus sheets per language code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportInput {
    pub sheets: Vec<RawSheet>,
    pub langs: BTreeMap<String, Vec<RawSheet>>,
}

impl ExportInput {
    /// Total raw row count, across languages too.
    pub fn row_count(&self) -> usize {
        let rows = |sheets: &[RawSheet]| sheets.iter().map(|s| s.data.len()).sum::<usize>();
        rows(&self.sheets) + self.langs.values().map(|l| rows(l)).sum::<usize>()
    }
}

/// Read the aggregate file and every language file of `layout`.
pub fn load_export(layout: &ExportLayout) -> DatamineResult<ExportInput> {
    require_exists(&layout.root)?;
    let sheets = parse_sheets_from_path(layout.aggregate_path())?;

    let langs = discover_languages(layout)?
        .into_par_iter()
        .map(|(code, path)| Ok((code, parse_sheets_from_path(&path)?)))
        .collect::<DatamineResult<BTreeMap<_, _>>>()?;

    Ok(ExportInput { sheets, langs })
}

/// Map language code (file stem) to file path for every `*.json` in the language directory.
pub fn discover_languages(layout: &ExportLayout) -> DatamineResult<BTreeMap<String, PathBuf>> {
    let dir = layout.lang_path();
    if !dir.is_dir() {
        return Err(DatamineError::InputNotFound { path: dir });
    }

    let pattern = format!("{}/*.json", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut out = BTreeMap::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(std::io::Error::from)?;
        if !path.is_file() {
            continue;
        }
        if let Some(code) = path.file_stem().and_then(|s| s.to_str()) {
            out.insert(code.to_string(), path.clone());
        }
    }
    Ok(out)
}

fn require_exists(path: &Path) -> DatamineResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DatamineError::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}
