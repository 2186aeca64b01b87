//! Build the area document from `dist/` and print it to stdout.
//!
//! Progress goes to stderr. On failure nothing is printed to stdout and the exit status is 1.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use area_datamine::execution::{BuildOptions, Pipeline, StdErrObserver};
use area_datamine::ingestion::ExportLayout;
use area_datamine::DatamineResult;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("area-datamine: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> DatamineResult<()> {
    let pipeline = Pipeline::new(BuildOptions {
        observer: Some(Arc::new(StdErrObserver)),
        ..Default::default()
    })?;
    let doc = pipeline.build_from_layout(&ExportLayout::default())?;

    // Serialize fully before writing so a failure never leaves partial output.
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
