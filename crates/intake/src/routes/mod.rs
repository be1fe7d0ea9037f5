//! HTTP route handlers for the intake service.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use agni_common::constants::messages;
use agni_common::{AgniError, IntakeAck};

use crate::state::AppState;

mod health;
mod submit;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = if state.config.cors_allow_any {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/stats", get(health::stats))

        // Intake
        .route("/api/submit", post(submit::submit))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )

        // Add shared state
        .with_state(state)
}

/// Domain error rendered as `{"message": ...}` with a matching status.
///
/// Internal details stay in the logs; clients only see the fixed messages.
#[derive(Debug)]
pub struct ApiError(pub AgniError);

impl From<AgniError> for ApiError {
    fn from(err: AgniError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self.0 {
            AgniError::MissingNonce => messages::MISSING_NONCE,
            AgniError::ReplayDetected(_) => messages::REPLAY_DETECTED,
            AgniError::Validation(_) => messages::INVALID_PAYLOAD,
            _ => messages::INTERNAL,
        };
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(IntakeAck::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::{NonceStore, read_log};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let config = AppConfig {
            log_path: dir.path().join("behavior.jsonl").display().to_string(),
            ..Default::default()
        };
        AppState::with_store(config, NonceStore::memory())
    }

    async fn post_json(router: &Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/submit")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn submission(nonce: Option<&str>) -> Value {
        let mut body = json!({
            "prompt": "Mountains or beaches?",
            "answer": "beaches",
            "reaction_time": 4200,
            "keystrokes": [{ "key": "b", "time": 1500 }, { "key": "e", "time": 1650 }],
            "mouseMovements": [{ "x": 1, "y": 2, "time": 30 }]
        });
        if let Some(nonce) = nonce {
            body["nonce"] = json!(nonce);
        }
        body
    }

    #[tokio::test]
    async fn test_accepts_then_blocks_replay() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let router = create_router(state.clone());

        let (status, body) = post_json(&router, submission(Some("tok-1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::RECORDED);

        let (status, body) = post_json(&router, submission(Some("tok-1"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], messages::REPLAY_DETECTED);

        let (records, _) = read_log(state.log.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload.answer, "beaches");
        assert_eq!(records[0].payload.keystrokes.len(), 2);
        assert!(records[0].payload.nonce.is_none());

        let response = router
            .clone()
            .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let stats: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stats["accepted"], 1);
        assert_eq!(stats["replays_blocked"], 1);
    }

    #[tokio::test]
    async fn test_missing_or_blank_nonce() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let router = create_router(state.clone());

        for body in [submission(None), submission(Some("  "))] {
            let (status, reply) = post_json(&router, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(reply["message"], messages::MISSING_NONCE);
        }
        assert!(!state.log.path().exists());
    }

    #[tokio::test]
    async fn test_log_failure_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the log file should be makes the append fail
        let log_path = dir.path().join("taken");
        std::fs::create_dir(&log_path).unwrap();
        let config = AppConfig {
            log_path: log_path.display().to_string(),
            ..Default::default()
        };
        let router = create_router(AppState::with_store(config, NonceStore::memory()));

        let (status, body) = post_json(&router, submission(Some("tok-9"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], messages::INTERNAL);
    }

    #[tokio::test]
    async fn test_failed_append_frees_nonce_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("behavior.jsonl");
        std::fs::create_dir(&log_path).unwrap();
        let config = AppConfig {
            log_path: log_path.display().to_string(),
            ..Default::default()
        };
        let state = AppState::with_store(config, NonceStore::memory());
        let router = create_router(state.clone());

        let (status, _) = post_json(&router, submission(Some("tok"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        std::fs::remove_dir(&log_path).unwrap();
        let (status, body) = post_json(&router, submission(Some("tok"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::RECORDED);

        let (status, _) = post_json(&router, submission(Some("tok"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (records, _) = read_log(state.log.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_message() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let router = create_router(state.clone());

        for (content_type, raw) in [
            ("application/json", "{not json"),
            ("application/json", r#"{"prompt":"p","nonce":"tok-5"}"#),
            ("text/plain", "hello"),
        ] {
            let request = Request::builder()
                .method("POST")
                .uri("/api/submit")
                .header("content-type", content_type)
                .body(Body::from(raw))
                .unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["message"], messages::INVALID_PAYLOAD);
        }

        // A rejected body never burns its nonce
        let (status, _) = post_json(&router, submission(Some("tok-5"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(test_state(&dir));

        for (uri, field, expected) in [("/health", "status", "ok"), ("/ready", "nonce_store", "memory")] {
            let response = router
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body[field], expected);
        }
    }
}
