//! Record types for the export sheets the build reads.
//!
//! Each type names only the columns it uses; foreign keys are kept as [`RowRef`]s so they can
//! only be followed through [`crate::processing::SheetSet::resolve`].

use crate::error::DatamineResult;
use crate::types::{DataType, Field, RecordReader, RowRef, Schema, SheetRow};

/// A playable zone (`WorldAreas.dat`), with its classification flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldAreaRow {
    pub id: String,
    pub is_town: bool,
    pub is_hideout: bool,
    pub is_map_area: bool,
    pub is_unique_map_area: bool,
}

impl SheetRow for WorldAreaRow {
    const SHEET: &'static str = "WorldAreas.dat";

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Id", DataType::Utf8),
            Field::new("IsTown", DataType::Bool),
            Field::new("IsHideout", DataType::Bool),
            Field::new("IsMapArea", DataType::Bool),
            Field::new("IsUniqueMapArea", DataType::Bool),
        ])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            id: r.id("Id")?,
            is_town: r.bool("IsTown")?,
            is_hideout: r.bool("IsHideout")?,
            is_map_area: r.bool("IsMapArea")?,
            is_unique_map_area: r.bool("IsUniqueMapArea")?,
        })
    }
}

/// `UniqueMaps.dat`: a unique map and its icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueMapRow {
    pub world_area: Option<RowRef<WorldAreaRow>>,
    pub item_visual_identity: Option<RowRef<ItemVisualIdentityRow>>,
}

impl SheetRow for UniqueMapRow {
    const SHEET: &'static str = "UniqueMaps.dat";

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("WorldAreasKey", DataType::RowIndex),
            Field::new("ItemVisualIdentityKey", DataType::RowIndex),
        ])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            world_area: r.row_index("WorldAreasKey")?.map(RowRef::new),
            item_visual_identity: r.row_index("ItemVisualIdentityKey")?.map(RowRef::new),
        })
    }
}

/// `AtlasNode.dat`: a regular map's node on the atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasNodeRow {
    pub world_area: Option<RowRef<WorldAreaRow>>,
    pub item_visual_identity: Option<RowRef<ItemVisualIdentityRow>>,
    pub atlas_region: Option<RowRef<AtlasRegionRow>>,
    /// The node's own atlas art.
    pub dds_file: Option<String>,
}

impl SheetRow for AtlasNodeRow {
    const SHEET: &'static str = "AtlasNode.dat";

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("WorldAreasKey", DataType::RowIndex),
            Field::new("ItemVisualIdentityKey", DataType::RowIndex),
            Field::new("AtlasRegionsKey", DataType::RowIndex),
            Field::new("DDSFile", DataType::Utf8),
        ])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            world_area: r.row_index("WorldAreasKey")?.map(RowRef::new),
            item_visual_identity: r.row_index("ItemVisualIdentityKey")?.map(RowRef::new),
            atlas_region: r.row_index("AtlasRegionsKey")?.map(RowRef::new),
            dds_file: r.utf8("DDSFile")?,
        })
    }
}

/// `ItemVisualIdentity.dat`: art asset paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemVisualIdentityRow {
    pub dds_file: Option<String>,
}

impl SheetRow for ItemVisualIdentityRow {
    const SHEET: &'static str = "ItemVisualIdentity.dat";

    fn schema() -> Schema {
        Schema::new(vec![Field::new("DDSFile", DataType::Utf8)])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            dds_file: r.utf8("DDSFile")?,
        })
    }
}

/// `AtlasRegions.dat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasRegionRow {
    pub name: Option<String>,
}

impl SheetRow for AtlasRegionRow {
    const SHEET: &'static str = "AtlasRegions.dat";

    fn schema() -> Schema {
        Schema::new(vec![Field::new("Name", DataType::Utf8)])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            name: r.utf8("Name")?,
        })
    }
}

/// Localized `WorldAreas.dat`: only the display name is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaNameRow {
    pub id: String,
    pub name: Option<String>,
}

impl SheetRow for AreaNameRow {
    const SHEET: &'static str = "WorldAreas.dat";

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Id", DataType::Utf8),
            Field::new("Name", DataType::Utf8),
        ])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            id: r.id("Id")?,
            name: r.utf8("Name")?,
        })
    }
}

/// Localized `BackendErrors.dat`: server message templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendErrorRow {
    pub id: String,
    pub text: Option<String>,
}

impl SheetRow for BackendErrorRow {
    const SHEET: &'static str = "BackendErrors.dat";

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Id", DataType::Utf8),
            Field::new("Text", DataType::Utf8),
        ])
    }

    fn from_record(r: &RecordReader<'_>) -> DatamineResult<Self> {
        Ok(Self {
            id: r.id("Id")?,
            text: r.utf8("Text")?,
        })
    }
}
