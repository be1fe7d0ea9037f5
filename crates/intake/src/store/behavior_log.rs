//! Append-only behavior log (one JSON object per line).

use std::path::{Path, PathBuf};

use agni_common::{AgniError, IntakePayload};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// A logged submission. The nonce is never written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    #[serde(flatten)]
    pub payload: IntakePayload,

    /// RFC 3339 receive time
    pub timestamp: String,

    /// Training label (0 = human, 1 = bot); set on generated bot records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<u8>,
}

impl StoredSubmission {
    pub fn new(mut payload: IntakePayload) -> Self {
        payload.nonce = None;
        Self {
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
            label: None,
        }
    }
}

/// Serialized appender for the behavior log file
pub struct BehaviorLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BehaviorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one submission as a single line
    pub async fn append(&self, record: &StoredSubmission) -> Result<(), AgniError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(store_err)?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(store_err)?;
        file.write_all(&line).await.map_err(store_err)?;
        file.flush().await.map_err(store_err)?;

        Ok(())
    }
}

fn store_err(err: std::io::Error) -> AgniError {
    AgniError::Store(err.to_string())
}

/// Read every parseable line of a behavior log.
///
/// Returns the records plus the number of lines that could not be parsed.
pub fn read_log(path: &Path) -> Result<(Vec<StoredSubmission>, usize), AgniError> {
    let raw = std::fs::read_to_string(path).map_err(store_err)?;

    let mut records = Vec::new();
    let mut skipped = 0;
    for (lineno, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<StoredSubmission>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(line = lineno + 1, error = %e, "Skipping unreadable log entry");
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agni_common::KeyEvent;

    fn payload(answer: &str) -> IntakePayload {
        IntakePayload {
            prompt: "Books or movies?".to_string(),
            answer: answer.to_string(),
            reaction_time: 3100,
            keystrokes: vec![KeyEvent::new("b", 900)],
            mouse_movements: vec![],
            nonce: Some("secret".to_string()),
        }
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = BehaviorLog::new(dir.path().join("nested/behavior.jsonl"));

        log.append(&StoredSubmission::new(payload("books"))).await.unwrap();
        log.append(&StoredSubmission::new(payload("movies"))).await.unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(!raw.contains("secret"));
        assert!(raw.contains("\"mouseMovements\""));

        let (records, skipped) = read_log(log.path()).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(records[1].payload.answer, "movies");
        assert!(records[0].payload.nonce.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&records[0].timestamp).is_ok());
    }

    #[test]
    fn test_read_skips_garbage_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(
            &path,
            "{\"prompt\":\"p\",\"answer\":\"a\",\"reaction_time\":1,\"timestamp\":\"t\",\"label\":1}\nnot json\n\n",
        )
        .unwrap();

        let (records, skipped) = read_log(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, Some(1));
        assert_eq!(skipped, 1);
    }
}
