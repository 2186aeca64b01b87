use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for every build stage.
pub type DatamineResult<T> = Result<T, DatamineError>;

/// Error type returned by loading, normalization, resolution, joining and localization.
///
/// Every variant is fatal for the run: the driver stops and no output document is produced.
#[derive(Debug, Error)]
pub enum DatamineError {
    /// Underlying I/O error (e.g. permission denied, broken stdout).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The export (or the output document) is not valid JSON for the expected shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The language-file pattern could not be compiled.
    #[error("invalid language file pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The worker pool could not be started.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An expected input file or directory does not exist.
    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// A row does not have one value per header column.
    #[error("malformed row {row} in {sheet}: expected {expected} values, found {actual}")]
    MalformedRow {
        sheet: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A header names the same column twice.
    #[error("duplicate column '{column}' in {sheet}")]
    DuplicateColumn { sheet: String, column: String },

    /// Two sheets in one export share a filename.
    #[error("duplicate sheet {sheet}")]
    DuplicateSheet { sheet: String },

    /// A sheet the build reads is absent from the export.
    #[error("missing sheet {sheet}")]
    MissingSheet { sheet: String },

    /// A sheet lacks a column its record type needs.
    #[error("schema mismatch in {sheet}: {message}")]
    SchemaMismatch { sheet: String, message: String },

    /// A cell could not be read as its column's [`crate::types::DataType`].
    #[error("failed to parse value in {sheet} row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        sheet: String,
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A positional reference points past the end of its target sheet.
    #[error("dangling reference from {from}: {sheet} has no row {row}")]
    DanglingReference {
        sheet: String,
        row: usize,
        from: String,
    },

    /// A join needed a value that is null or empty.
    #[error("missing required field '{field}' in {sheet} row {row}: {raw}")]
    MissingRequiredField {
        sheet: String,
        row: usize,
        field: String,
        /// The offending source record.
        raw: serde_json::Value,
    },
}
