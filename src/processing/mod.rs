//! The four build stages, in dependency order.
//!
//! - [`normalize`]: raw header + rows into a [`SheetSet`] of named records
//! - [`resolve`]: `UniqueMaps.dat` / `AtlasNode.dat` rows into [`VisualIdentity`]s
//! - [`join`]: `WorldAreas.dat` + identities into the filtered [`AreaRecord`] list
//! - [`localize`]: per-language [`LocalizationBundle`]s restricted to the kept areas
//!
//! Each stage is a pure function over read-only inputs. [`crate::execution::Pipeline`] runs
//! them in order and stops at the first error.
//!
//! ## Example: one town, one iconed map
//!
//! ```rust
//! use area_datamine::processing::{
//!     join_areas, resolve_atlas_nodes, resolve_unique_maps, AreaMatch, RawColumn, RawSheet, SheetSet,
//! };
//! use area_datamine::sheets::WorldAreaRow;
//! use serde_json::json;
//!
//! fn sheet(name: &str, header: &[&str], data: Vec<Vec<serde_json::Value>>) -> RawSheet {
//!     RawSheet {
//!         filename: name.to_string(),
//!         header: header.iter().map(|h| RawColumn::new(*h)).collect(),
//!         data,
//!     }
//! }
//!
//! let flags = ["Id", "IsTown", "IsHideout", "IsMapArea", "IsUniqueMapArea"];
//! let sheets = SheetSet::normalize(vec![
//!     sheet("WorldAreas.dat", &flags, vec![
//!         vec![json!("G1_town"), json!(true), json!(false), json!(false), json!(false)],
//!         vec![json!("MapWorldsExample"), json!(false), json!(false), json!(true), json!(false)],
//!     ]),
//!     sheet("ItemVisualIdentity.dat", &["DDSFile"], vec![vec![json!("art/x.dds")]]),
//!     sheet("AtlasRegions.dat", &["Name"], vec![vec![json!("A1")]]),
//!     sheet("UniqueMaps.dat", &["WorldAreasKey", "ItemVisualIdentityKey"], vec![]),
//!     sheet("AtlasNode.dat", &["WorldAreasKey", "ItemVisualIdentityKey", "AtlasRegionsKey", "DDSFile"], vec![
//!         vec![json!(1), json!(0), json!(0), json!("art/node.dds")],
//!     ]),
//! ])?;
//!
//! let world_areas = sheets.rows::<WorldAreaRow>()?;
//! let uniques = resolve_unique_maps(&sheets)?;
//! let atlas = resolve_atlas_nodes(&sheets)?;
//! let joined = join_areas(&world_areas, &uniques, &atlas, AreaMatch::WorldAreasKey);
//!
//! assert_eq!(joined.areas.len(), 2);
//! assert_eq!(joined.areas[0].item_visual_identity, None);
//! assert_eq!(joined.areas[1].item_visual_identity.as_deref(), Some("art/x.dds"));
//! # Ok::<(), area_datamine::DatamineError>(())
//! ```

pub mod join;
pub mod localize;
pub mod normalize;
pub mod output;
pub mod resolve;

pub use join::{join_areas, AreaJoin, AreaMatch, AreaRecord, JoinStats};
pub use localize::{area_ids, localize, LocalizationBundle, ENTERED_AREA};
pub use normalize::{NormalizedSheet, RawColumn, RawSheet, SheetSet};
pub use output::{Datamine, Table};
pub use resolve::{resolve_atlas_nodes, resolve_unique_maps, AtlasNodeIdentity, VisualIdentity};
