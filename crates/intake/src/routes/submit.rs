//! Submission intake endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use agni_common::constants::messages;
use agni_common::{AgniError, IntakeAck, IntakePayload};

use super::ApiError;
use crate::state::{AppState, IntakeStats};
use crate::store::StoredSubmission;

/// Accept one attempt payload.
///
/// Returns:
/// - 200: Submission recorded
/// - 400: Malformed body or no nonce
/// - 403: Nonce already used (replay)
/// - 500: Nonce store or log failure
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<IntakePayload>, JsonRejection>,
) -> Result<Json<IntakeAck>, ApiError> {
    let Json(mut payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Malformed submission");
        AgniError::Validation(rejection.body_text())
    })?;

    let nonce = match payload.nonce.take().filter(|n| !n.trim().is_empty()) {
        Some(nonce) => nonce,
        None => {
            IntakeStats::bump(&state.stats.missing_nonce);
            return Err(AgniError::MissingNonce.into());
        }
    };

    let fresh = state.nonces.claim(&nonce).await.inspect_err(|e| {
        IntakeStats::bump(&state.stats.store_errors);
        tracing::error!(error = %e, "Nonce store failure");
    })?;

    if !fresh {
        IntakeStats::bump(&state.stats.replays_blocked);
        tracing::warn!(nonce = %nonce, "Replay attack detected");
        return Err(AgniError::ReplayDetected(nonce).into());
    }

    tracing::info!(
        nonce = %nonce,
        keystrokes = payload.keystrokes.len(),
        pointer_samples = payload.mouse_movements.len(),
        "Submission accepted"
    );

    if let Err(e) = state.log.append(&StoredSubmission::new(payload)).await {
        IntakeStats::bump(&state.stats.store_errors);
        tracing::error!(error = %e, path = ?state.log.path(), "Failed to append behavior log");

        // Nothing was recorded, so the client may resubmit with this nonce
        if let Err(release_err) = state.nonces.release(&nonce).await {
            tracing::error!(error = %release_err, nonce = %nonce, "Failed to release nonce");
        }
        return Err(e.into());
    }

    IntakeStats::bump(&state.stats.accepted);
    Ok(Json(IntakeAck::new(messages::RECORDED)))
}
