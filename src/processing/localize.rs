//! Per-language lookups restricted to the areas the join kept.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DatamineResult;
use crate::processing::{AreaRecord, SheetSet};
use crate::sheets::{AreaNameRow, BackendErrorRow};

/// `BackendErrors.dat` id of the "You have entered {area}" message.
pub const ENTERED_AREA: &str = "EnteredArea";

/// Localized lookups for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationBundle {
    /// Error code to message text; holds at most [`ENTERED_AREA`].
    pub backend_errors: BTreeMap<String, Option<String>>,
    /// Area id to display name, for kept areas only.
    pub world_areas: BTreeMap<String, Option<String>>,
}

/// Ids of the kept areas.
pub fn area_ids(areas: &[AreaRecord]) -> HashSet<&str> {
    areas.iter().map(|a| a.id.as_str()).collect()
}

/// Build one language's lookups from its normalized sheets.
///
/// Later rows win when an id repeats.
pub fn localize(sheets: &SheetSet, kept: &HashSet<&str>) -> DatamineResult<LocalizationBundle> {
    let world_areas = sheets
        .rows::<AreaNameRow>()?
        .into_iter()
        .filter(|row| kept.contains(row.id.as_str()))
        .map(|row| (row.id, row.name))
        .collect();

    let backend_errors = sheets
        .rows::<BackendErrorRow>()?
        .into_iter()
        .filter(|row| row.id == ENTERED_AREA)
        .map(|row| (row.id, row.text))
        .collect();

    Ok(LocalizationBundle {
        backend_errors,
        world_areas,
    })
}
