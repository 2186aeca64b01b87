//! The output document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::processing::{AreaRecord, LocalizationBundle};

/// A header + positional rows table, the same encoding the export uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub data: Vec<Vec<JsonValue>>,
}

impl Table {
    /// Encode areas with the fixed [`AreaRecord::HEADER`], even when `areas` is empty.
    pub fn from_areas(areas: &[AreaRecord]) -> Self {
        Self {
            header: AreaRecord::HEADER.iter().map(|h| h.to_string()).collect(),
            data: areas.iter().map(AreaRecord::to_row).collect(),
        }
    }

    /// Rows as records keyed by header column.
    pub fn records(&self) -> impl Iterator<Item = BTreeMap<&str, &JsonValue>> {
        self.data
            .iter()
            .map(|row| self.header.iter().map(String::as_str).zip(row).collect())
    }
}

/// Everything the log watcher needs: the area table and per-language lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datamine {
    pub world_areas: Table,
    /// Keyed by language code (the language file's stem).
    pub lang: BTreeMap<String, LocalizationBundle>,
}
