//! Reading the extractor's output.
//!
//! Most callers should use [`load_export`] (from [`unified`]), which reads the aggregate sheet
//! file and every language file of an [`ExportLayout`] into an [`ExportInput`].
//!
//! The parser for a single sheet array lives in [`json`].

pub mod json;
pub mod unified;

pub use unified::{discover_languages, load_export, ExportInput, ExportLayout};
