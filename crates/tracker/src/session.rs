//! Session Recorder: one live verification attempt and its input logs.

use std::collections::HashSet;
use std::time::Instant;

use agni_common::constants::{PROMPTS, TOKEN_BYTES};
use agni_common::{FeatureRecord, IntakePayload, KeyEvent, PointerEvent, Verdict};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

use crate::clock::{Clock, SystemClock};
use crate::extract::extract;
use crate::presenter::Status;

/// A single verification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Prompt shown to the user
    pub prompt: String,
    /// Opaque single-use token, sent to the intake as `nonce`
    pub token: String,
    /// When the attempt began
    pub started_at: Instant,
}

impl Attempt {
    /// Whole milliseconds from the attempt start to `at` (0 if `at` is earlier)
    pub fn elapsed_ms(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.started_at).as_millis() as u64
    }
}

/// Handle tying an input source to the attempt that was live when it subscribed.
///
/// Events delivered through a handle from an earlier attempt are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    token: String,
}

impl Subscription {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Frozen copy of an attempt taken at submit time
#[derive(Debug, Clone)]
pub struct AttemptSnapshot {
    pub attempt: Attempt,
    pub answer: String,
    pub keys: Vec<KeyEvent>,
    pub pointers: Vec<PointerEvent>,
    pub submitted_at: Instant,
}

impl AttemptSnapshot {
    pub fn reaction_time_ms(&self) -> u64 {
        self.attempt.elapsed_ms(self.submitted_at)
    }

    /// Raw payload for the verification intake
    pub fn intake_payload(&self) -> IntakePayload {
        IntakePayload {
            prompt: self.attempt.prompt.clone(),
            answer: self.answer.clone(),
            reaction_time: self.reaction_time_ms(),
            keystrokes: self.keys.clone(),
            mouse_movements: self.pointers.clone(),
            nonce: Some(self.attempt.token.clone()),
        }
    }

    pub fn features(&self) -> FeatureRecord {
        extract(
            &self.attempt,
            &self.keys,
            &self.pointers,
            self.submitted_at,
            &self.answer,
        )
    }
}

/// Owns the live attempt, its answer buffer, and its ordered input logs.
pub struct Session<C: Clock = SystemClock> {
    clock: C,
    prompts: Vec<String>,
    attempt: Attempt,
    answer: String,
    keys: Vec<KeyEvent>,
    pointers: Vec<PointerEvent>,
    status: Status,
    verdict: Option<Verdict>,
    submitting: bool,
    intake_acked: bool,
    issued: HashSet<String>,
}

impl Session<SystemClock> {
    /// Session on the wall clock with the built-in prompt set
    pub fn new() -> Self {
        Self::with_clock(SystemClock, Vec::new())
    }
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Session<C> {
    /// Create a session and begin its first attempt.
    ///
    /// An empty `prompts` list falls back to the built-in set.
    pub fn with_clock(clock: C, prompts: Vec<String>) -> Self {
        let prompts = if prompts.is_empty() {
            PROMPTS.iter().map(|p| p.to_string()).collect()
        } else {
            prompts
        };

        let started_at = clock.now();
        let mut session = Self {
            clock,
            prompts,
            attempt: Attempt {
                prompt: String::new(),
                token: String::new(),
                started_at,
            },
            answer: String::new(),
            keys: Vec::new(),
            pointers: Vec::new(),
            status: Status::Idle,
            verdict: None,
            submitting: false,
            intake_acked: false,
            issued: HashSet::new(),
        };
        session.begin();
        session
    }

    /// Start a fresh attempt: new prompt, new token, start instant = now,
    /// empty logs and answer.
    pub fn begin(&mut self) -> Subscription {
        let prompt = self.pick_prompt();
        let token = self.fresh_token();

        self.attempt = Attempt {
            prompt,
            token,
            started_at: self.clock.now(),
        };
        self.answer.clear();
        self.keys.clear();
        self.pointers.clear();
        self.intake_acked = false;

        tracing::debug!(
            token = %self.attempt.token,
            prompt = %self.attempt.prompt,
            "Attempt started"
        );

        self.subscribe()
    }

    /// `begin()` plus clearing the verdict, status, and in-flight flag
    pub fn reset(&mut self) -> Subscription {
        self.status = Status::Idle;
        self.verdict = None;
        self.submitting = false;
        self.begin()
    }

    /// Subscription bound to the current attempt
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            token: self.attempt.token.clone(),
        }
    }

    /// True while `sub` belongs to the live attempt
    pub fn is_current(&self, sub: &Subscription) -> bool {
        sub.token == self.attempt.token
    }

    /// Append a key press stamped with the current offset
    pub fn record_key(&mut self, key: impl Into<String>) {
        let floor = self.keys.last().map_or(0, |k| k.offset_ms);
        let offset_ms = self.offset_now().max(floor);
        self.keys.push(KeyEvent::new(key, offset_ms));
    }

    /// Append a pointer position stamped with the current offset
    pub fn record_pointer(&mut self, x: i32, y: i32) {
        let floor = self.pointers.last().map_or(0, |p| p.offset_ms);
        let offset_ms = self.offset_now().max(floor);
        self.pointers.push(PointerEvent::new(x, y, offset_ms));
    }

    /// Freeze the attempt for submission
    pub fn snapshot(&self) -> AttemptSnapshot {
        AttemptSnapshot {
            attempt: self.attempt.clone(),
            answer: self.answer.clone(),
            keys: self.keys.clone(),
            pointers: self.pointers.clone(),
            submitted_at: self.clock.now(),
        }
    }

    /// Replace both logs wholesale (used by bot simulation)
    pub fn replace_logs(&mut self, keys: Vec<KeyEvent>, pointers: Vec<PointerEvent>) {
        self.keys = keys;
        self.pointers = pointers;
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    pub fn prompt(&self) -> &str {
        &self.attempt.prompt
    }

    pub fn token(&self) -> &str {
        &self.attempt.token
    }

    pub fn keys(&self) -> &[KeyEvent] {
        &self.keys
    }

    pub fn pointers(&self) -> &[PointerEvent] {
        &self.pointers
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    pub(crate) fn answer_mut(&mut self) -> &mut String {
        &mut self.answer
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn set_verdict(&mut self, verdict: Verdict) {
        self.verdict = Some(verdict);
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Whether the intake already accepted this attempt's token
    pub fn intake_acked(&self) -> bool {
        self.intake_acked
    }

    pub fn set_intake_acked(&mut self, acked: bool) {
        self.intake_acked = acked;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn offset_now(&self) -> u64 {
        self.attempt.elapsed_ms(self.clock.now())
    }

    fn pick_prompt(&self) -> String {
        let idx = rand::rng().random_range(0..self.prompts.len());
        self.prompts[idx].clone()
    }

    /// Random URL-safe token, never repeated within this session
    fn fresh_token(&mut self) -> String {
        loop {
            let mut bytes = [0u8; TOKEN_BYTES];
            rand::rng().fill(&mut bytes);
            let token = URL_SAFE_NO_PAD.encode(bytes);
            if self.issued.insert(token.clone()) {
                return token;
            }
        }
    }
}
