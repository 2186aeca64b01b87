use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use area_datamine::execution::{
    BuildEvent, BuildObserver, BuildOptions, BuildSeverity, CompositeObserver, FileObserver, Pipeline, Stage,
};
use area_datamine::ingestion::ExportLayout;
use area_datamine::DatamineError;

#[derive(Default)]
struct RecordingObserver {
    stages: Mutex<Vec<Stage>>,
    languages: Mutex<Vec<String>>,
    failures: Mutex<Vec<(Stage, BuildSeverity)>>,
    alerts: Mutex<Vec<(Stage, BuildSeverity)>>,
}

impl BuildObserver for RecordingObserver {
    fn on_event(&self, event: &BuildEvent) {
        match event {
            BuildEvent::StageFinished { stage, .. } => self.stages.lock().unwrap().push(*stage),
            BuildEvent::LanguageFinished { lang, .. } => self.languages.lock().unwrap().push(lang.clone()),
            _ => {}
        }
    }

    fn on_failure(&self, stage: Stage, severity: BuildSeverity, _error: &DatamineError) {
        self.failures.lock().unwrap().push((stage, severity));
    }

    fn on_alert(&self, stage: Stage, severity: BuildSeverity, _error: &DatamineError) {
        self.alerts.lock().unwrap().push((stage, severity));
    }
}

fn pipeline_with(obs: Arc<dyn BuildObserver>) -> Pipeline {
    Pipeline::new(BuildOptions {
        num_threads: Some(2),
        observer: Some(obs),
        alert_at_or_above: BuildSeverity::Critical,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn successful_build_reports_every_stage_in_order() {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline = pipeline_with(obs.clone());
    pipeline
        .build_from_layout(&ExportLayout::new("tests/fixtures/dist"))
        .unwrap();

    assert_eq!(
        *obs.stages.lock().unwrap(),
        vec![Stage::Load, Stage::Normalize, Stage::Resolve, Stage::Join, Stage::Localize]
    );
    let mut langs = obs.languages.lock().unwrap().clone();
    langs.sort();
    assert_eq!(langs, vec!["en", "fr"]);
    assert!(obs.failures.lock().unwrap().is_empty());

    let snap = pipeline.metrics().snapshot();
    assert_eq!(snap.run_id, 1);
    assert_eq!(snap.sheets_normalized, 5 + 2 * 2);
    assert_eq!(snap.identities_resolved, 4);
    assert_eq!(snap.areas_kept, 4);
    assert_eq!(snap.languages_localized, 2);
    assert!(snap.elapsed.is_some());
}

#[test]
fn missing_input_is_critical_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let _ = pipeline_with(obs.clone())
        .build_from_layout(&ExportLayout::new("tests/fixtures/does_not_exist"))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![(Stage::Load, BuildSeverity::Critical)]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![(Stage::Load, BuildSeverity::Critical)]);
    assert!(obs.stages.lock().unwrap().is_empty());
}

#[test]
fn bad_data_fails_without_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let _ = pipeline_with(obs.clone())
        .build_from_layout(&ExportLayout::new("tests/fixtures/broken"))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![(Stage::Resolve, BuildSeverity::Error)]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    assert_eq!(*obs.stages.lock().unwrap(), vec![Stage::Load, Stage::Normalize]);
}

#[test]
fn file_observer_appends_through_composite() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let log = std::env::temp_dir().join(format!("area-datamine-observer-{nanos}.log"));

    let recording = Arc::new(RecordingObserver::default());
    let file: Arc<dyn BuildObserver> = Arc::new(FileObserver::new(&log));
    let rec: Arc<dyn BuildObserver> = recording.clone();
    let composite = CompositeObserver::new(vec![file, rec]);
    let pipeline = Pipeline::new(BuildOptions {
        num_threads: Some(1),
        ..Default::default()
    })
    .unwrap()
    .with_observer(Arc::new(composite));

    let _ = pipeline
        .build_from_layout(&ExportLayout::new("tests/fixtures/broken"))
        .unwrap_err();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("run started"));
    assert!(text.contains("stage=load"));
    assert!(text.contains("fail severity=Error stage=resolve"));
    assert!(!text.contains("ALERT"));
    assert_eq!(recording.failures.lock().unwrap().len(), 1);
}
