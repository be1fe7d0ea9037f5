//! Synthetic bot submissions for seeding the training set.
//!
//! Live traffic arrives unlabelled. These records carry the bot label so an
//! export has at least one labelled class to train on.

use agni_common::{IntakePayload, KeyEvent, PointerEvent};
use anyhow::Result;
use rand::Rng;

use crate::store::{BehaviorLog, StoredSubmission};

/// Label value for bot rows in the exported dataset
pub const BOT_LABEL: u8 = 1;

const BOT_PROMPT: &str = "Are you a bot?";
const BOT_ANSWER: &str = "yes";
const TYPED_TEXT: &str = "automate";
const POINTER_STEPS: usize = 30;

/// One labelled bot submission: a fast reaction, 5-15 ms key gaps, and a
/// pointer that creeps diagonally in 1-5 px steps.
pub fn bot_submission(rng: &mut impl Rng) -> StoredSubmission {
    let mut at = 1000;
    let keystrokes = TYPED_TEXT
        .chars()
        .map(|c| {
            at += rng.random_range(5..=15);
            KeyEvent::new(c.to_string(), at)
        })
        .collect();

    let (mut x, mut y) = (rng.random_range(100..=200), rng.random_range(100..=200));
    let mut at = 0;
    let mouse_movements = (0..POINTER_STEPS)
        .map(|_| {
            x += rng.random_range(1..=5);
            y += rng.random_range(1..=5);
            at += rng.random_range(5..=15);
            PointerEvent::new(x, y, at)
        })
        .collect();

    let payload = IntakePayload {
        prompt: BOT_PROMPT.to_string(),
        answer: BOT_ANSWER.to_string(),
        reaction_time: rng.random_range(100..=300),
        keystrokes,
        mouse_movements,
        nonce: None,
    };

    let mut record = StoredSubmission::new(payload);
    record.label = Some(BOT_LABEL);
    record
}

/// Append `count` bot submissions to the log
pub async fn append_bots(log: &BehaviorLog, count: usize) -> Result<usize> {
    let records: Vec<_> = {
        let mut rng = rand::rng();
        (0..count).map(|_| bot_submission(&mut rng)).collect()
    };

    for record in &records {
        log.append(record).await?;
    }

    tracing::info!(count, path = %log.path().display(), "Bot submissions generated");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::export_csv;
    use agni_common::FeatureRecord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bot_profile() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let record = bot_submission(&mut rng);
            assert_eq!(record.label, Some(BOT_LABEL));
            assert!((100..=300).contains(&record.payload.reaction_time));

            let features = FeatureRecord::from_payload(&record.payload);
            assert_eq!(features.answer_length, 3);
            assert_eq!(features.mouse_event_count, 30);
            assert!((5.0..=15.0).contains(&features.avg_key_interval_ms));
            assert!(features.std_key_interval_ms <= 5.0);

            for pair in record.payload.mouse_movements.windows(2) {
                assert!((1..=5).contains(&(pair[1].x - pair[0].x)));
                assert!((1..=5).contains(&(pair[1].y - pair[0].y)));
                assert!(pair[1].offset_ms > pair[0].offset_ms);
            }
        }
    }

    #[tokio::test]
    async fn test_generated_bots_export_as_labelled_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = BehaviorLog::new(dir.path().join("behavior.jsonl"));
        let out = dir.path().join("dataset.csv");

        assert_eq!(append_bots(&log, 5).await.unwrap(), 5);

        let summary = export_csv(log.path(), &out).unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.labelled, 5);
        assert_eq!(summary.skipped, 0);

        let csv = std::fs::read_to_string(&out).unwrap();
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);
        for row in rows {
            assert!(row.ends_with(",30,1"), "unexpected row {row}");
            assert!(row.split(',').nth(1) == Some("3"));
        }
    }
}
