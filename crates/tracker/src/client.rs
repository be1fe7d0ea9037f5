//! Outbound collaborators: verification intake and classifier.

use std::future::Future;
use std::time::Duration;

use agni_common::{AgniError, FeatureRecord, IntakeAck, IntakePayload, Verdict};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::TrackerConfig;

/// Receives the raw attempt payload (outbound call A)
pub trait VerificationIntake {
    fn submit(
        &self,
        payload: &IntakePayload,
    ) -> impl Future<Output = Result<IntakeAck, AgniError>> + Send;
}

/// Turns a feature record into a verdict (outbound call B)
pub trait Classifier {
    fn classify(
        &self,
        features: &FeatureRecord,
    ) -> impl Future<Output = Result<Verdict, AgniError>> + Send;
}

/// JSON-over-HTTP client for both endpoints
#[derive(Clone)]
pub struct HttpVerifier {
    client: Client,
    intake_url: String,
    predict_url: String,
}

impl HttpVerifier {
    /// `timeout` is left to the transport; `None` means reqwest's default (no timeout)
    pub fn new(
        intake_url: impl Into<String>,
        predict_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AgniError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AgniError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            intake_url: intake_url.into(),
            predict_url: predict_url.into(),
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, AgniError> {
        Self::new(
            config.intake_url.clone(),
            config.predict_url.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, AgniError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AgniError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AgniError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<IntakeAck>(&bytes)
                .ok()
                .and_then(|ack| ack.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(AgniError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl VerificationIntake for HttpVerifier {
    async fn submit(&self, payload: &IntakePayload) -> Result<IntakeAck, AgniError> {
        let ack: IntakeAck = self.post_json(&self.intake_url, payload).await?;
        tracing::debug!(message = ?ack.message, "Intake acknowledged");
        Ok(ack)
    }
}

impl Classifier for HttpVerifier {
    async fn classify(&self, features: &FeatureRecord) -> Result<Verdict, AgniError> {
        let raw: Verdict = self.post_json(&self.predict_url, features).await?;
        Ok(Verdict::new(raw.label, raw.confidence))
    }
}
