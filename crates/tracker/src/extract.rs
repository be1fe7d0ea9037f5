//! Feature Extractor entry point for a live attempt.

use std::time::Instant;

use agni_common::{FeatureRecord, KeyEvent, PointerEvent};

use crate::session::Attempt;

/// Summarize an attempt's logs as of `submitted_at`.
///
/// Total over all inputs; see [`agni_common::features`] for the reductions.
pub fn extract(
    attempt: &Attempt,
    keys: &[KeyEvent],
    pointers: &[PointerEvent],
    submitted_at: Instant,
    answer: &str,
) -> FeatureRecord {
    FeatureRecord::from_logs(attempt.elapsed_ms(submitted_at), answer, keys, pointers)
}
