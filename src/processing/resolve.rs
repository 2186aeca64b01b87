//! Entity resolvers for `UniqueMaps.dat` and `AtlasNode.dat`.
//!
//! Each source row is followed through `ItemVisualIdentityKey` to an art path (and, for atlas
//! nodes, through `AtlasRegionsKey` to a region name; a node must also carry its own `DDSFile`). Resolution is fail-fast: the first row
//! with a missing join value aborts the build.

use serde_json::Value as JsonValue;

use crate::error::{DatamineError, DatamineResult};
use crate::processing::SheetSet;
use crate::sheets::{AtlasNodeRow, ItemVisualIdentityRow, UniqueMapRow, WorldAreaRow};
use crate::types::{RowRef, SheetRow};

/// An area icon resolved from one row of a source sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualIdentity {
    /// Position of the source row in its own sheet.
    pub source_row: usize,
    /// The source row's `WorldAreasKey`.
    pub world_area: RowRef<WorldAreaRow>,
    /// `DDSFile` of the referenced `ItemVisualIdentity.dat` row.
    pub item_visual_identity: String,
}

/// A resolved `AtlasNode.dat` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasNodeIdentity {
    pub visual: VisualIdentity,
    /// The node's own `DDSFile`.
    pub dds_file: String,
    /// `Name` of the referenced `AtlasRegions.dat` row.
    pub atlas_region: String,
}

/// Resolve every `UniqueMaps.dat` row, in sheet order.
pub fn resolve_unique_maps(sheets: &SheetSet) -> DatamineResult<Vec<VisualIdentity>> {
    sheets
        .rows::<UniqueMapRow>()?
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            resolve_visual(
                sheets,
                RowRef::<UniqueMapRow>::new(i),
                row.world_area,
                row.item_visual_identity,
            )
        })
        .collect()
}

/// Resolve every `AtlasNode.dat` row, in sheet order.
pub fn resolve_atlas_nodes(sheets: &SheetSet) -> DatamineResult<Vec<AtlasNodeIdentity>> {
    sheets
        .rows::<AtlasNodeRow>()?
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let source = RowRef::<AtlasNodeRow>::new(i);
            let visual = resolve_visual(sheets, source, row.world_area, row.item_visual_identity)?;
            let dds_file = required_text(sheets, source, "DDSFile", row.dds_file)?;

            let region_ref = required(sheets, source, "AtlasRegionsKey", row.atlas_region)?;
            let region = sheets.resolve(region_ref, format!("{source}.AtlasRegionsKey"))?;
            let atlas_region = required_text(sheets, source, "AtlasRegionsKey -> Name", region.name)?;

            Ok(AtlasNodeIdentity {
                visual,
                dds_file,
                atlas_region,
            })
        })
        .collect()
}

fn resolve_visual<S: SheetRow>(
    sheets: &SheetSet,
    source: RowRef<S>,
    world_area: Option<RowRef<WorldAreaRow>>,
    item_visual_identity: Option<RowRef<ItemVisualIdentityRow>>,
) -> DatamineResult<VisualIdentity> {
    let world_area = required(sheets, source, "WorldAreasKey", world_area)?;
    let visual_ref = required(sheets, source, "ItemVisualIdentityKey", item_visual_identity)?;
    let visual = sheets.resolve(visual_ref, format!("{source}.ItemVisualIdentityKey"))?;
    let item_visual_identity =
        required_text(sheets, source, "ItemVisualIdentityKey -> DDSFile", visual.dds_file)?;

    Ok(VisualIdentity {
        source_row: source.index(),
        world_area,
        item_visual_identity,
    })
}

fn required<S: SheetRow, T>(
    sheets: &SheetSet,
    source: RowRef<S>,
    field: &str,
    value: Option<T>,
) -> DatamineResult<T> {
    value.ok_or_else(|| missing_field(sheets, source, field))
}

fn required_text<S: SheetRow>(
    sheets: &SheetSet,
    source: RowRef<S>,
    field: &str,
    value: Option<String>,
) -> DatamineResult<String> {
    required(sheets, source, field, value.filter(|s| !s.is_empty()))
}

fn missing_field<S: SheetRow>(sheets: &SheetSet, source: RowRef<S>, field: &str) -> DatamineError {
    let raw = sheets
        .record(source, source)
        .map(|rec| JsonValue::Object(rec.clone()))
        .unwrap_or(JsonValue::Null);
    DatamineError::MissingRequiredField {
        sheet: S::SHEET.to_string(),
        row: source.index(),
        field: field.to_string(),
        raw,
    }
}
