//! Submission flow: owns the session and sequences the two outbound calls.

use agni_common::{AgniError, Verdict};

use crate::client::{Classifier, VerificationIntake};
use crate::clock::{Clock, SystemClock};
use crate::presenter::{Presenter, Status};
use crate::session::{AttemptSnapshot, Session, Subscription};
use crate::simulate::simulate_bot;

/// Single owner of the live session and its collaborators
pub struct Controller<I, K, P, C: Clock = SystemClock> {
    session: Session<C>,
    intake: I,
    classifier: K,
    presenter: P,
}

impl<I, K, P, C> Controller<I, K, P, C>
where
    I: VerificationIntake,
    K: Classifier,
    P: Presenter,
    C: Clock,
{
    pub fn new(session: Session<C>, intake: I, classifier: K, presenter: P) -> Self {
        Self {
            session,
            intake,
            classifier,
            presenter,
        }
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<C> {
        &mut self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Start a new attempt and hand out its input subscription
    pub fn begin(&mut self) -> Subscription {
        self.session.begin()
    }

    /// Start over, discarding the verdict and status
    pub fn reset(&mut self) -> Subscription {
        let sub = self.session.reset();
        self.presenter.status(Status::Idle);
        sub
    }

    /// Replace the logs with simulated bot input
    pub fn simulate_bot(&mut self) {
        simulate_bot(&mut self.session);
        self.presenter.status(Status::Simulated);
    }

    /// Submit the current attempt.
    ///
    /// A blank answer fails locally with [`AgniError::Validation`] and no
    /// network traffic. Any failure of either call leaves the logs intact so
    /// the attempt can be submitted again.
    pub async fn submit(&mut self) -> Result<Verdict, AgniError> {
        if self.session.answer().trim().is_empty() {
            self.set_status(Status::Invalid);
            return Err(AgniError::Validation("answer is blank".to_string()));
        }

        self.session.set_submitting(true);
        self.set_status(Status::Submitting);

        let snapshot = self.session.snapshot();
        let result = self.exchange(&snapshot).await;

        self.session.set_submitting(false);
        match &result {
            Ok(verdict) => {
                tracing::info!(
                    token = %snapshot.attempt.token,
                    label = %verdict.label,
                    confidence = verdict.confidence,
                    "Verdict received"
                );
                self.session.set_verdict(*verdict);
                self.set_status(Status::for_verdict(verdict));
                self.presenter.verdict(verdict);
            }
            Err(err) => {
                tracing::warn!(
                    token = %snapshot.attempt.token,
                    error = %err,
                    "Submission failed"
                );
                self.set_status(Status::Failed);
            }
        }

        result
    }

    /// Intake first, then the classifier; the second call only runs if the
    /// first succeeded.
    ///
    /// The intake accepts a token once, so after an acknowledged intake call
    /// a resubmission of the same attempt goes straight to the classifier.
    async fn exchange(&mut self, snapshot: &AttemptSnapshot) -> Result<Verdict, AgniError> {
        if self.session.intake_acked() {
            tracing::debug!(token = %snapshot.attempt.token, "Intake already acknowledged");
        } else {
            let payload = snapshot.intake_payload();
            self.intake.submit(&payload).await?;
            self.session.set_intake_acked(true);
        }

        let features = snapshot.features();
        tracing::debug!(token = %snapshot.attempt.token, ?features, "Features extracted");

        self.classifier.classify(&features).await
    }

    fn set_status(&mut self, status: Status) {
        self.session.set_status(status);
        self.presenter.status(status);
    }
}
