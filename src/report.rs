use std::fmt::Write;
use std::path::Path;

use serde_json::json;

use crate::clean::CleaningOutcome;

pub fn build_summary(raw_path: &Path, outcome: &CleaningOutcome) -> String {
    let summary = &outcome.summary;
    let mut output = String::new();

    let _ = writeln!(output, "Read {} rows from {}", summary.input_rows, raw_path.display());
    let _ = writeln!(
        output,
        "Dropped {} rows with missing or invalid data ({} incomplete, {} with zero latitude).",
        summary.dropped_total(),
        summary.dropped_missing,
        summary.dropped_zero_latitude
    );

    match &outcome.output {
        Some(path) => {
            let _ = writeln!(output, "Cleaning finished. Saved to {}", path.display());
        }
        None => {
            let _ = writeln!(output, "Dry run: no file written.");
        }
    }
    let _ = writeln!(output, "Total accidents kept: {}", summary.output_rows);

    output
}

pub fn build_json(raw_path: &Path, outcome: &CleaningOutcome) -> serde_json::Value {
    json!({
        "input": raw_path.to_string_lossy(),
        "output": outcome.output.as_ref().map(|path| path.to_string_lossy().to_string()),
        "summary": outcome.summary,
    })
}
