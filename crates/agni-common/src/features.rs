//! Feature extraction over an attempt's input logs.
//!
//! Every function here is pure and total: degenerate inputs (no keys, a
//! single pointer sample) produce zeroed values instead of errors.

use serde::{Deserialize, Serialize};

use crate::types::{IntakePayload, KeyEvent, PointerEvent};

/// Numeric summary of an attempt, as consumed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Milliseconds between attempt start and submission
    #[serde(rename = "reaction_time")]
    pub reaction_time_ms: u64,

    /// Answer length in characters
    pub answer_length: usize,

    /// Mean gap between consecutive key presses
    #[serde(rename = "avg_key_interval")]
    pub avg_key_interval_ms: f64,

    /// Population standard deviation of the key gaps
    #[serde(rename = "std_key_interval")]
    pub std_key_interval_ms: f64,

    /// Total pointer path length in pixels
    pub mouse_distance: f64,

    /// Path length divided by the last pointer offset (px/ms)
    pub mouse_avg_speed: f64,

    /// Number of pointer samples
    #[serde(rename = "mouse_movements")]
    pub mouse_event_count: usize,
}

impl FeatureRecord {
    /// Build a record from raw logs when the reaction time is already known.
    pub fn from_logs(
        reaction_time_ms: u64,
        answer: &str,
        keys: &[KeyEvent],
        pointers: &[PointerEvent],
    ) -> Self {
        let intervals = key_intervals(keys);
        let mouse_distance = path_length(pointers);

        Self {
            reaction_time_ms,
            answer_length: answer.chars().count(),
            avg_key_interval_ms: mean(&intervals),
            std_key_interval_ms: population_std(&intervals),
            mouse_distance,
            mouse_avg_speed: mouse_distance / total_mouse_time_ms(pointers),
            mouse_event_count: pointers.len(),
        }
    }

    /// Rebuild the record for a logged intake payload.
    pub fn from_payload(payload: &IntakePayload) -> Self {
        Self::from_logs(
            payload.reaction_time,
            &payload.answer,
            &payload.keystrokes,
            &payload.mouse_movements,
        )
    }

    /// Values in classifier column order (see [`crate::constants::FEATURE_NAMES`]).
    pub fn to_row(&self) -> [f64; 7] {
        [
            self.reaction_time_ms as f64,
            self.answer_length as f64,
            self.avg_key_interval_ms,
            self.std_key_interval_ms,
            self.mouse_distance,
            self.mouse_avg_speed,
            self.mouse_event_count as f64,
        ]
    }
}

/// Gaps between consecutive key presses; empty with fewer than two keys.
///
/// Gaps are signed, so an out-of-order log yields negative intervals.
pub fn key_intervals(keys: &[KeyEvent]) -> Vec<f64> {
    keys.windows(2)
        .map(|w| w[1].offset_ms as f64 - w[0].offset_ms as f64)
        .collect()
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation with the denominator floored at 1.
pub fn population_std(values: &[f64]) -> f64 {
    let avg = mean(values);
    let squared: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    (squared / values.len().max(1) as f64).sqrt()
}

/// Sum of Euclidean distances between consecutive pointer samples.
pub fn path_length(pointers: &[PointerEvent]) -> f64 {
    pointers
        .windows(2)
        .map(|w| {
            let dx = f64::from(w[1].x) - f64::from(w[0].x);
            let dy = f64::from(w[1].y) - f64::from(w[0].y);
            dx.hypot(dy)
        })
        .sum()
}

/// Offset of the last pointer sample, or 1 when there are none.
///
/// A trailing sample at offset 0 also yields 1 so the speed stays finite.
pub fn total_mouse_time_ms(pointers: &[PointerEvent]) -> f64 {
    match pointers.last() {
        Some(last) if last.offset_ms > 0 => last.offset_ms as f64,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(offsets: &[u64]) -> Vec<KeyEvent> {
        offsets.iter().map(|&t| KeyEvent::new("k", t)).collect()
    }

    #[test]
    fn test_key_rhythm_example() {
        let record = FeatureRecord::from_logs(400, "abc", &keys(&[0, 100, 250]), &[]);
        assert_eq!(record.avg_key_interval_ms, 125.0);
        assert_eq!(record.std_key_interval_ms, 25.0);
        assert_eq!(record.answer_length, 3);
        assert_eq!(record.reaction_time_ms, 400);
    }

    #[test]
    fn test_pointer_example() {
        let pointers = [PointerEvent::new(0, 0, 0), PointerEvent::new(3, 4, 10)];
        let record = FeatureRecord::from_logs(0, "", &[], &pointers);
        assert_eq!(record.mouse_distance, 5.0);
        assert_eq!(record.mouse_avg_speed, 0.5);
        assert_eq!(record.mouse_event_count, 2);
    }

    #[test]
    fn test_degenerate_inputs_are_zeroed() {
        for offsets in [&[][..], &[42][..]] {
            let record = FeatureRecord::from_logs(10, "", &keys(offsets), &[]);
            assert_eq!(record.avg_key_interval_ms, 0.0);
            assert_eq!(record.std_key_interval_ms, 0.0);
            assert_eq!(record.mouse_distance, 0.0);
            assert_eq!(record.mouse_avg_speed, 0.0);
            assert_eq!(record.mouse_event_count, 0);
        }
    }

    #[test]
    fn test_equal_intervals_have_zero_std() {
        let record = FeatureRecord::from_logs(0, "", &keys(&[0, 50, 100, 150, 200]), &[]);
        assert_eq!(record.avg_key_interval_ms, 50.0);
        assert_eq!(record.std_key_interval_ms, 0.0);
    }

    #[test]
    fn test_out_of_order_keys_give_negative_gaps() {
        assert_eq!(key_intervals(&keys(&[0, 300, 200])), vec![300.0, -100.0]);

        let record = FeatureRecord::from_logs(0, "", &keys(&[0, 300, 200]), &[]);
        assert_eq!(record.avg_key_interval_ms, 100.0);
        assert_eq!(record.std_key_interval_ms, 200.0);
    }

    #[test]
    fn test_distance_never_decreases_as_samples_arrive() {
        let samples = [
            PointerEvent::new(10, 10, 0),
            PointerEvent::new(13, 14, 5),
            PointerEvent::new(13, 14, 9),
            PointerEvent::new(-20, 7, 30),
            PointerEvent::new(0, 0, 31),
        ];

        let mut previous = 0.0;
        for n in 0..=samples.len() {
            let d = path_length(&samples[..n]);
            assert!(d >= previous);
            previous = d;
        }
    }

    #[test]
    fn test_answer_length_counts_characters() {
        let record = FeatureRecord::from_logs(0, "héllo ☕", &[], &[]);
        assert_eq!(record.answer_length, 7);
    }

    #[test]
    fn test_serializes_with_classifier_names() {
        let record = FeatureRecord::from_logs(900, "yes", &keys(&[0, 10, 20]), &[]);
        let json = serde_json::to_value(record).unwrap();
        for name in crate::constants::FEATURE_NAMES {
            assert!(json.get(name).is_some(), "missing {name}");
        }
        assert_eq!(json["mouse_movements"], 0);
    }

    #[test]
    fn test_from_payload_uses_logged_reaction_time() {
        let payload = IntakePayload {
            prompt: "Tea or Coffee?".to_string(),
            answer: "tea".to_string(),
            reaction_time: 2500,
            keystrokes: keys(&[1000, 1200]),
            mouse_movements: vec![],
            nonce: None,
        };
        let record = FeatureRecord::from_payload(&payload);
        assert_eq!(record.reaction_time_ms, 2500);
        assert_eq!(record.avg_key_interval_ms, 200.0);
        assert_eq!(record.to_row()[0], 2500.0);
    }
}
