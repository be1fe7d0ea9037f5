//! Offline dataset export: behavior log → feature CSV.
//!
//! Rows are built with the same extractor the tracker runs before calling the
//! classifier, so exported features match what the classifier sees live.

use std::path::Path;

use anyhow::{Context, Result};
use agni_common::FeatureRecord;
use agni_common::constants::FEATURE_NAMES;

use crate::store::read_log;

/// Outcome of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub labelled: usize,
    pub skipped: usize,
}

/// Write one CSV row per logged submission.
///
/// Columns are the classifier feature names followed by `label`, which is
/// left empty for unlabelled submissions.
pub fn export_csv(log_path: &Path, out_path: &Path) -> Result<ExportSummary> {
    let (records, skipped) = read_log(log_path)
        .with_context(|| format!("Failed to read behavior log {}", log_path.display()))?;

    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("Failed to create {}", out_path.display()))?;

    let header = FEATURE_NAMES.iter().copied().chain(std::iter::once("label"));
    writer.write_record(header)?;

    let mut labelled = 0;
    for record in &records {
        let features = FeatureRecord::from_payload(&record.payload);
        let label = record.label.map(|l| l.to_string()).unwrap_or_default();
        if record.label.is_some() {
            labelled += 1;
        }

        let row = features
            .to_row()
            .iter()
            .map(|v| v.to_string())
            .chain(std::iter::once(label))
            .collect::<Vec<_>>();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    tracing::info!(
        rows = records.len(),
        labelled,
        skipped,
        out = %out_path.display(),
        "Dataset exported"
    );

    Ok(ExportSummary {
        rows: records.len(),
        labelled,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("behavior.jsonl");
        let out = dir.path().join("dataset.csv");

        let lines = [
            r#"{"prompt":"p","answer":"yes","reaction_time":250,"keystrokes":[{"key":"y","time":0},{"key":"e","time":100},{"key":"s","time":250}],"mouseMovements":[{"x":0,"y":0,"time":0},{"x":3,"y":4,"time":10}],"timestamp":"2025-01-01T00:00:00Z","label":1}"#,
            r#"{"prompt":"p","answer":"","reaction_time":90,"timestamp":"2025-01-01T00:00:01Z"}"#,
            "{broken",
        ];
        std::fs::write(&log, lines.join("\n")).unwrap();

        let summary = export_csv(&log, &out).unwrap();
        assert_eq!(
            summary,
            ExportSummary {
                rows: 2,
                labelled: 1,
                skipped: 1
            }
        );

        let csv = std::fs::read_to_string(&out).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("reaction_time,answer_length,avg_key_interval,std_key_interval,mouse_distance,mouse_avg_speed,mouse_movements,label")
        );
        assert_eq!(lines.next(), Some("250,3,125,25,5,0.5,2,1"));
        assert_eq!(lines.next(), Some("90,0,0,0,0,0,0,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_missing_log_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_csv(&dir.path().join("nope.jsonl"), &dir.path().join("out.csv"));
        assert!(err.is_err());
    }
}
