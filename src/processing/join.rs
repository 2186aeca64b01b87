//! The area join: world areas + resolved icons into the filtered [`AreaRecord`] list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::processing::{AtlasNodeIdentity, VisualIdentity};
use crate::sheets::WorldAreaRow;

/// How a resolved icon is matched to a world area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AreaMatch {
    /// The icon's row position in its own sheet equals the area's row position.
    ///
    /// This assumes `UniqueMaps.dat`/`AtlasNode.dat` share `WorldAreas.dat`'s ordering, which
    /// the export does not guarantee.
    #[default]
    SourcePosition,
    /// The icon's `WorldAreasKey` value equals the area's row position.
    ///
    /// This is the export's real foreign key.
    WorldAreasKey,
}

impl AreaMatch {
    /// The `WorldAreas.dat` position `identity` attaches to.
    pub fn area_index(self, identity: &VisualIdentity) -> usize {
        match self {
            Self::SourcePosition => identity.source_row,
            Self::WorldAreasKey => identity.world_area.index(),
        }
    }
}

/// One row of the output area table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "IsTown")]
    pub is_town: bool,
    #[serde(rename = "IsHideout")]
    pub is_hideout: bool,
    #[serde(rename = "IsMapArea")]
    pub is_map_area: bool,
    #[serde(rename = "IsUniqueMapArea")]
    pub is_unique_map_area: bool,
    #[serde(rename = "ItemVisualIdentity")]
    pub item_visual_identity: Option<String>,
    /// Position of the area in the exported `WorldAreas.dat`.
    #[serde(rename = "RowID")]
    pub row_id: usize,
}

impl AreaRecord {
    /// Output column order.
    pub const HEADER: [&'static str; 7] = [
        "Id",
        "IsTown",
        "IsHideout",
        "IsMapArea",
        "IsUniqueMapArea",
        "ItemVisualIdentity",
        "RowID",
    ];

    /// Maps, unique maps, towns and hideouts.
    pub fn is_relevant(&self) -> bool {
        self.is_map_area || self.is_unique_map_area || self.is_town || self.is_hideout
    }

    /// Map areas without an icon are duplicates or boss arenas.
    pub fn is_map_without_visual(&self) -> bool {
        self.is_map_area && self.item_visual_identity.is_none()
    }

    /// Values in [`Self::HEADER`] order.
    pub fn to_row(&self) -> Vec<JsonValue> {
        vec![
            JsonValue::from(self.id.as_str()),
            JsonValue::from(self.is_town),
            JsonValue::from(self.is_hideout),
            JsonValue::from(self.is_map_area),
            JsonValue::from(self.is_unique_map_area),
            self.item_visual_identity
                .as_deref()
                .map_or(JsonValue::Null, JsonValue::from),
            JsonValue::from(self.row_id),
        ]
    }
}

/// Row counts for one join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub considered: usize,
    pub kept: usize,
    pub dropped_irrelevant: usize,
    pub dropped_without_visual: usize,
}

/// Output of [`join_areas`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaJoin {
    pub areas: Vec<AreaRecord>,
    pub stats: JoinStats,
}

/// Build the filtered area list, in `WorldAreas.dat` order.
///
/// A unique-map icon takes precedence over an atlas-node icon. When several identities match
/// the same area under `area_match`, the last one in sheet order wins.
pub fn join_areas(
    world_areas: &[WorldAreaRow],
    unique_maps: &[VisualIdentity],
    atlas_nodes: &[AtlasNodeIdentity],
    area_match: AreaMatch,
) -> AreaJoin {
    let unique_by_area = index_by_area(unique_maps.iter(), area_match);
    let atlas_by_area = index_by_area(atlas_nodes.iter().map(|n| &n.visual), area_match);

    let mut stats = JoinStats {
        considered: world_areas.len(),
        ..JoinStats::default()
    };
    let mut areas = Vec::new();

    for (row_id, area) in world_areas.iter().enumerate() {
        let item_visual_identity = unique_by_area
            .get(&row_id)
            .or_else(|| atlas_by_area.get(&row_id))
            .map(|path| path.to_string());

        let record = AreaRecord {
            id: area.id.clone(),
            is_town: area.is_town,
            is_hideout: area.is_hideout,
            is_map_area: area.is_map_area,
            is_unique_map_area: area.is_unique_map_area,
            item_visual_identity,
            row_id,
        };

        if !record.is_relevant() {
            stats.dropped_irrelevant += 1;
        } else if record.is_map_without_visual() {
            stats.dropped_without_visual += 1;
        } else {
            areas.push(record);
        }
    }

    stats.kept = areas.len();
    AreaJoin { areas, stats }
}

fn index_by_area<'a>(
    identities: impl Iterator<Item = &'a VisualIdentity>,
    area_match: AreaMatch,
) -> HashMap<usize, &'a str> {
    identities
        .map(|v| (area_match.area_index(v), v.item_visual_identity.as_str()))
        .collect()
}
