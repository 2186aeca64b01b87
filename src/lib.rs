//! `area-datamine` turns a game data export into the small, denormalized area document a
//! log-watching application consumes.
//!
//! The export holds hundreds of sheets whose rows reference each other by row position. The
//! build resolves the handful of references the consumer needs, once, so the consumer never
//! needs the schema or the join logic.
//!
//! ## Stages
//!
//! 1. **Normalize** ([`processing::normalize`]): every sheet's header + positional rows become
//!    named records. A row whose length differs from its header fails the build.
//! 2. **Resolve** ([`processing::resolve`]): `UniqueMaps.dat` and `AtlasNode.dat` rows follow
//!    `ItemVisualIdentityKey` (and `AtlasRegionsKey`) to an icon path (and region name).
//! 3. **Join** ([`processing::join`]): each `WorldAreas.dat` row gets its icon, then only maps,
//!    unique maps, towns and hideouts are kept, minus map areas with no icon.
//! 4. **Localize** ([`processing::localize`]): per language, area names of kept areas and the
//!    `EnteredArea` message.
//!
//! [`execution::Pipeline`] runs them in order and stops at the first error; nothing is
//! produced from a failed run.
//!
//! ## Quick example: build from a directory
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use area_datamine::execution::{BuildOptions, Pipeline, StdErrObserver};
//! use area_datamine::ingestion::ExportLayout;
//!
//! # fn main() -> Result<(), area_datamine::DatamineError> {
//! let pipeline = Pipeline::new(BuildOptions {
//!     observer: Some(Arc::new(StdErrObserver)),
//!     ..Default::default()
//! })?;
//! // Reads dist/all.json and dist/lang/*.json.
//! let doc = pipeline.build_from_layout(&ExportLayout::default())?;
//! println!("{}", serde_json::to_string_pretty(&doc)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: reading the extractor's output from disk
//! - [`processing`]: the four stages and the output document
//! - [`execution`]: the pipeline driver, observers and metrics
//! - [`sheets`]: record types for the sheets the build reads
//! - [`types`]: schemas, typed record access and positional references
//! - [`error`]: the error type shared by every stage

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod sheets;
pub mod types;

pub use error::{DatamineError, DatamineResult};
