use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::DatamineError;
use crate::processing::JoinStats;

/// Build stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    Normalize,
    Resolve,
    Join,
    Localize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Normalize => "normalize",
            Self::Resolve => "resolve",
            Self::Join => "join",
            Self::Localize => "localize",
        };
        f.write_str(name)
    }
}

/// Severity classification used for failure callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildSeverity {
    /// Bad input data; the export needs fixing.
    Error,
    /// Infrastructure failure (missing input, I/O, thread pool).
    Critical,
}

impl BuildSeverity {
    pub fn of(error: &DatamineError) -> Self {
        match error {
            DatamineError::Io(_)
            | DatamineError::InputNotFound { .. }
            | DatamineError::ThreadPool(_) => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Events emitted by the pipeline.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    RunStarted,
    StageFinished {
        stage: Stage,
        rows: usize,
        elapsed: Duration,
    },
    AreasFiltered(JoinStats),
    LanguageFinished {
        lang: String,
        world_areas: usize,
        backend_errors: usize,
    },
    RunFinished {
        elapsed: Duration,
        metrics: BuildMetricsSnapshot,
    },
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted => write!(f, "run started"),
            Self::StageFinished {
                stage,
                rows,
                elapsed,
            } => write!(f, "stage={stage} rows={rows} elapsed={elapsed:?}"),
            Self::AreasFiltered(s) => write!(
                f,
                "areas considered={} kept={} dropped_irrelevant={} dropped_without_visual={}",
                s.considered, s.kept, s.dropped_irrelevant, s.dropped_without_visual
            ),
            Self::LanguageFinished {
                lang,
                world_areas,
                backend_errors,
            } => write!(
                f,
                "lang={lang} world_areas={world_areas} backend_errors={backend_errors}"
            ),
            Self::RunFinished { elapsed, metrics } => {
                write!(f, "run finished elapsed={elapsed:?} {metrics}")
            }
        }
    }
}

/// Observer interface for build progress and failures.
///
/// Implementors can record metrics, logs, or trigger alerts. Implementations must not write
/// to stdout, which carries the output document.
pub trait BuildObserver: Send + Sync {
    /// Called for every progress event.
    fn on_event(&self, _event: &BuildEvent) {}

    /// Called when a stage fails.
    fn on_failure(&self, _stage: Stage, _severity: BuildSeverity, _error: &DatamineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        self.on_failure(stage, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn BuildObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn BuildObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl BuildObserver for CompositeObserver {
    fn on_event(&self, event: &BuildEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }

    fn on_failure(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        for o in &self.observers {
            o.on_failure(stage, severity, error);
        }
    }

    fn on_alert(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        for o in &self.observers {
            o.on_alert(stage, severity, error);
        }
    }
}

/// Logs build events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl BuildObserver for StdErrObserver {
    fn on_event(&self, event: &BuildEvent) {
        eprintln!("[datamine] {event}");
    }

    fn on_failure(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        eprintln!("[datamine][{severity:?}] stage={stage} err={error}");
    }

    fn on_alert(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        eprintln!("[ALERT][datamine][{severity:?}] stage={stage} err={error}");
    }
}

/// Appends build events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl BuildObserver for FileObserver {
    fn on_event(&self, event: &BuildEvent) {
        self.append_line(&format!("{} {event}", unix_ts()));
    }

    fn on_failure(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        self.append_line(&format!(
            "{} fail severity={severity:?} stage={stage} err={error}",
            unix_ts()
        ));
    }

    fn on_alert(&self, stage: Stage, severity: BuildSeverity, error: &DatamineError) {
        self.append_line(&format!(
            "{} ALERT severity={severity:?} stage={stage} err={error}",
            unix_ts()
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Counters for the current (or last) build run.
///
/// The pipeline updates these during the run; callers can snapshot them at any time.
pub struct BuildMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,
    sheets_normalized: AtomicU64,
    rows_normalized: AtomicU64,
    identities_resolved: AtomicU64,
    areas_kept: AtomicU64,
    languages_localized: AtomicU64,
}

impl BuildMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            sheets_normalized: AtomicU64::new(0),
            rows_normalized: AtomicU64::new(0),
            identities_resolved: AtomicU64::new(0),
            areas_kept: AtomicU64::new(0),
            languages_localized: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.sheets_normalized.store(0, Ordering::SeqCst);
        self.rows_normalized.store(0, Ordering::SeqCst);
        self.identities_resolved.store(0, Ordering::SeqCst);
        self.areas_kept.store(0, Ordering::SeqCst);
        self.languages_localized.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_normalized(&self, sheets: usize, rows: usize) {
        let _ = self.sheets_normalized.fetch_add(sheets as u64, Ordering::SeqCst);
        let _ = self.rows_normalized.fetch_add(rows as u64, Ordering::SeqCst);
    }

    pub fn on_resolved(&self, identities: usize) {
        let _ = self.identities_resolved.fetch_add(identities as u64, Ordering::SeqCst);
    }

    pub fn on_joined(&self, kept: usize) {
        self.areas_kept.store(kept as u64, Ordering::SeqCst);
    }

    pub fn on_language(&self) {
        let _ = self.languages_localized.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> BuildMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        BuildMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            sheets_normalized: self.sheets_normalized.load(Ordering::SeqCst),
            rows_normalized: self.rows_normalized.load(Ordering::SeqCst),
            identities_resolved: self.identities_resolved.load(Ordering::SeqCst),
            areas_kept: self.areas_kept.load(Ordering::SeqCst),
            languages_localized: self.languages_localized.load(Ordering::SeqCst),
        }
    }
}

impl Default for BuildMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`BuildMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub sheets_normalized: u64,
    pub rows_normalized: u64,
    pub identities_resolved: u64,
    pub areas_kept: u64,
    pub languages_localized: u64,
}

impl fmt::Display for BuildMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, sheets={}, rows={}, identities={}, areas_kept={}, languages={}, elapsed={:?}",
            self.run_id,
            self.sheets_normalized,
            self.rows_normalized,
            self.identities_resolved,
            self.areas_kept,
            self.languages_localized,
            self.elapsed
        )
    }
}
