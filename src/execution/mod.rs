//! The build driver.
//!
//! [`Pipeline`] runs the stages of [`crate::processing`] in dependency order on its own rayon
//! pool and provides:
//!
//! - Fail-fast execution: the first error stops the run and no document is returned
//! - Parallel normalization of sheets and parallel localization across languages
//! - Real-time metrics + observer hooks for monitoring

mod observer;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::DatamineResult;
use crate::ingestion::{load_export, ExportInput, ExportLayout};
use crate::processing::{
    area_ids, join_areas, localize, resolve_atlas_nodes, resolve_unique_maps, AreaJoin, AreaMatch,
    AtlasNodeIdentity, Datamine, LocalizationBundle, SheetSet, Table, VisualIdentity,
};
use crate::sheets::WorldAreaRow;

pub use observer::{
    BuildEvent, BuildMetrics, BuildMetricsSnapshot, BuildObserver, BuildSeverity, CompositeObserver,
    FileObserver, Stage, StdErrObserver,
};

/// Configuration for the [`Pipeline`].
#[derive(Clone)]
pub struct BuildOptions {
    /// Number of worker threads.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// How resolved icons are matched to world areas.
    pub area_match: AreaMatch,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn BuildObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: BuildSeverity,
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("num_threads", &self.num_threads)
            .field("area_match", &self.area_match)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            num_threads: None,
            area_match: AreaMatch::default(),
            observer: None,
            alert_at_or_above: BuildSeverity::Critical,
        }
    }
}

type Normalized = (SheetSet, BTreeMap<String, SheetSet>);
type Resolved = (Vec<WorldAreaRow>, Vec<VisualIdentity>, Vec<AtlasNodeIdentity>);
type Localized = BTreeMap<String, LocalizationBundle>;

/// Runs a whole build: load (optional), normalize, resolve, join, localize.
pub struct Pipeline {
    pool: ThreadPool,
    opts: BuildOptions,
    metrics: Arc<BuildMetrics>,
}

impl Pipeline {
    /// Create a pipeline with its own thread pool. `num_threads == Some(0)` is treated as 1.
    pub fn new(opts: BuildOptions) -> DatamineResult<Self> {
        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);
        let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

        Ok(Self {
            pool,
            opts,
            metrics: Arc::new(BuildMetrics::new()),
        })
    }

    /// Attach an observer for build events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.opts.observer = Some(observer);
        self
    }

    /// Get a handle to real-time build metrics.
    pub fn metrics(&self) -> Arc<BuildMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Load the export described by `layout` and build from it.
    pub fn build_from_layout(&self, layout: &ExportLayout) -> DatamineResult<Datamine> {
        self.pool.install(|| {
            let start = self.begin();
            let input = self.stage(Stage::Load, ExportInput::row_count, || load_export(layout))?;
            self.build_impl(input, start)
        })
    }

    /// Build from an already-loaded export.
    pub fn build(&self, input: ExportInput) -> DatamineResult<Datamine> {
        self.pool.install(|| {
            let start = self.begin();
            self.build_impl(input, start)
        })
    }

    fn begin(&self) -> Instant {
        self.metrics.begin_run();
        self.emit(BuildEvent::RunStarted);
        Instant::now()
    }

    fn build_impl(&self, input: ExportInput, start: Instant) -> DatamineResult<Datamine> {
        let ExportInput { sheets, langs } = input;

        let normalized = self.stage(Stage::Normalize, normalized_rows, || {
            let sheets = SheetSet::normalize(sheets)?;
            let langs = langs
                .into_par_iter()
                .map(|(code, raw)| Ok((code, SheetSet::normalize(raw)?)))
                .collect::<DatamineResult<BTreeMap<_, _>>>()?;
            Ok((sheets, langs))
        })?;
        self.metrics
            .on_normalized(normalized_sheets(&normalized), normalized_rows(&normalized));
        let (sheets, langs) = normalized;

        let (world_areas, unique_maps, atlas_nodes) = self.stage(
            Stage::Resolve,
            |(_, u, a): &Resolved| u.len() + a.len(),
            || {
                let world_areas = sheets.rows::<WorldAreaRow>()?;
                let unique_maps = resolve_unique_maps(&sheets)?;
                let atlas_nodes = resolve_atlas_nodes(&sheets)?;
                Ok((world_areas, unique_maps, atlas_nodes))
            },
        )?;
        self.metrics.on_resolved(unique_maps.len() + atlas_nodes.len());

        let joined = self.stage(
            Stage::Join,
            |j: &AreaJoin| j.areas.len(),
            || {
                Ok(join_areas(
                    &world_areas,
                    &unique_maps,
                    &atlas_nodes,
                    self.opts.area_match,
                ))
            },
        )?;
        self.metrics.on_joined(joined.areas.len());
        self.emit(BuildEvent::AreasFiltered(joined.stats));

        let kept = area_ids(&joined.areas);
        let lang = self.stage(Stage::Localize, |l: &Localized| l.len(), || {
            langs
                .par_iter()
                .map(|(code, lang_sheets)| {
                    let bundle = localize(lang_sheets, &kept)?;
                    self.metrics.on_language();
                    self.emit(BuildEvent::LanguageFinished {
                        lang: code.clone(),
                        world_areas: bundle.world_areas.len(),
                        backend_errors: bundle.backend_errors.len(),
                    });
                    Ok((code.clone(), bundle))
                })
                .collect::<DatamineResult<Localized>>()
        })?;

        let out = Datamine {
            world_areas: Table::from_areas(&joined.areas),
            lang,
        };

        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(BuildEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });
        Ok(out)
    }

    /// Run one stage, reporting its row count on success or its error on failure.
    fn stage<T>(
        &self,
        stage: Stage,
        rows: impl FnOnce(&T) -> usize,
        run: impl FnOnce() -> DatamineResult<T>,
    ) -> DatamineResult<T> {
        let start = Instant::now();
        match run() {
            Ok(out) => {
                self.emit(BuildEvent::StageFinished {
                    stage,
                    rows: rows(&out),
                    elapsed: start.elapsed(),
                });
                Ok(out)
            }
            Err(e) => {
                if let Some(obs) = &self.opts.observer {
                    let sev = BuildSeverity::of(&e);
                    obs.on_failure(stage, sev, &e);
                    if sev >= self.opts.alert_at_or_above {
                        obs.on_alert(stage, sev, &e);
                    }
                }
                Err(e)
            }
        }
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(obs) = &self.opts.observer {
            obs.on_event(&event);
        }
    }
}

fn normalized_sheets((sheets, langs): &Normalized) -> usize {
    sheets.len() + langs.values().map(SheetSet::len).sum::<usize>()
}

fn normalized_rows((sheets, langs): &Normalized) -> usize {
    sheets.row_count() + langs.values().map(SheetSet::row_count).sum::<usize>()
}
