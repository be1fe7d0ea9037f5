//! Input subscription and scripted replay.
//!
//! An input source holds a [`Subscription`] and pushes [`InputEvent`]s through
//! [`Session::deliver`]. Once the session is reset the old subscription goes
//! inert and its events are dropped.

use std::path::Path;
use std::time::Duration;

use agni_common::AgniError;
use serde::Deserialize;

use crate::clock::{Clock, ManualClock};
use crate::session::{Session, Subscription};

/// Raw input from the user's devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(String),
    Pointer { x: i32, y: i32 },
}

/// Receiver side of an input subscription
pub trait InputHandler {
    fn on_key(&mut self, key: &str);
    fn on_pointer(&mut self, x: i32, y: i32);
}

impl InputEvent {
    pub fn dispatch<H: InputHandler + ?Sized>(&self, handler: &mut H) {
        match self {
            Self::Key(key) => handler.on_key(key),
            Self::Pointer { x, y } => handler.on_pointer(*x, *y),
        }
    }
}

/// Apply a key press to a text field: printable characters append,
/// `Backspace` deletes, everything else leaves the text alone.
pub fn edit_text(text: &mut String, key: &str) {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => text.push(c),
        _ if key == "Backspace" => {
            text.pop();
        }
        _ => {}
    }
}

/// The session acts as the focused answer field: every key is logged and
/// also edits the answer.
impl<C: Clock> InputHandler for Session<C> {
    fn on_key(&mut self, key: &str) {
        self.record_key(key);
        edit_text(self.answer_mut(), key);
    }

    fn on_pointer(&mut self, x: i32, y: i32) {
        self.record_pointer(x, y);
    }
}

impl<C: Clock> Session<C> {
    /// Route an event from `sub` into the live attempt.
    ///
    /// Returns false when the subscription belongs to an earlier attempt.
    pub fn deliver(&mut self, sub: &Subscription, event: &InputEvent) -> bool {
        if !self.is_current(sub) {
            tracing::debug!(token = %sub.token(), "Dropping input for stale attempt");
            return false;
        }
        event.dispatch(self);
        true
    }
}

/// One scripted event at a fixed offset from the attempt start
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptedInput {
    Key { at_ms: u64, key: String },
    Pointer { at_ms: u64, x: i32, y: i32 },
}

impl ScriptedInput {
    pub fn at_ms(&self) -> u64 {
        match self {
            Self::Key { at_ms, .. } | Self::Pointer { at_ms, .. } => *at_ms,
        }
    }

    pub fn event(&self) -> InputEvent {
        match self {
            Self::Key { key, .. } => InputEvent::Key(key.clone()),
            Self::Pointer { x, y, .. } => InputEvent::Pointer { x: *x, y: *y },
        }
    }
}

/// A recorded input sequence that can be played back into a session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplayScript {
    /// Events; sorted by offset on load
    pub events: Vec<ScriptedInput>,

    /// When to submit, relative to the attempt start (defaults to the last event)
    #[serde(default)]
    pub submit_at_ms: Option<u64>,
}

impl ReplayScript {
    pub fn from_json(raw: &str) -> Result<Self, AgniError> {
        let mut script: Self = serde_json::from_str(raw)?;
        script.events.sort_by_key(ScriptedInput::at_ms);
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AgniError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AgniError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Offset at which the attempt should be submitted
    pub fn submit_offset_ms(&self) -> u64 {
        let last = self.events.last().map_or(0, ScriptedInput::at_ms);
        self.submit_at_ms.unwrap_or(last).max(last)
    }

    /// Play back on a manual clock with no real waiting.
    ///
    /// The clock must be the one driving `session`. Offsets are relative to
    /// the clock position when this is called.
    pub fn play_instant(
        &self,
        session: &mut Session<ManualClock>,
        sub: &Subscription,
        clock: &ManualClock,
    ) -> usize {
        let base = clock.elapsed_ms();
        let mut delivered = 0;
        for scripted in &self.events {
            clock.set(base + scripted.at_ms());
            if session.deliver(sub, &scripted.event()) {
                delivered += 1;
            }
        }
        clock.set(base + self.submit_offset_ms());
        delivered
    }

    /// Play back in real time, sleeping between events.
    pub async fn play_realtime<C: Clock>(
        &self,
        session: &mut Session<C>,
        sub: &Subscription,
    ) -> usize {
        let start = tokio::time::Instant::now();
        let mut delivered = 0;
        for scripted in &self.events {
            tokio::time::sleep_until(start + Duration::from_millis(scripted.at_ms())).await;
            if session.deliver(sub, &scripted.event()) {
                delivered += 1;
            }
        }
        tokio::time::sleep_until(start + Duration::from_millis(self.submit_offset_ms())).await;
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "submit_at_ms": 900,
        "events": [
            { "at_ms": 300, "key": "h" },
            { "at_ms": 0, "x": 10, "y": 10 },
            { "at_ms": 450, "key": "i" },
            { "at_ms": 500, "key": "Shift" },
            { "at_ms": 600, "key": "!" },
            { "at_ms": 700, "key": "Backspace" },
            { "at_ms": 750, "x": 13, "y": 14 }
        ]
    }"#;

    #[test]
    fn test_edit_text() {
        let mut text = String::new();
        for key in ["a", "b", "Backspace", "Enter", "é", "Tab"] {
            edit_text(&mut text, key);
        }
        assert_eq!(text, "aé");
    }

    #[test]
    fn test_script_parses_and_sorts() {
        let script = ReplayScript::from_json(SCRIPT).unwrap();
        assert_eq!(script.events.len(), 7);
        assert_eq!(script.events[0], ScriptedInput::Pointer { at_ms: 0, x: 10, y: 10 });
        assert_eq!(script.submit_offset_ms(), 900);
    }

    #[test]
    fn test_instant_replay_into_session() {
        let clock = ManualClock::new();
        let mut session = Session::with_clock(clock.clone(), Vec::new());
        let sub = session.subscribe();
        let script = ReplayScript::from_json(SCRIPT).unwrap();

        let delivered = script.play_instant(&mut session, &sub, &clock);
        assert_eq!(delivered, 7);

        let offsets: Vec<u64> = session.keys().iter().map(|k| k.offset_ms).collect();
        assert_eq!(offsets, vec![300, 450, 500, 600, 700]);
        assert_eq!(session.answer(), "hi");
        assert_eq!(session.pointers().len(), 2);

        let features = session.snapshot().features();
        assert_eq!(features.reaction_time_ms, 900);
        assert_eq!(features.mouse_distance, 5.0);
        assert_eq!(features.mouse_avg_speed, 5.0 / 750.0);
    }

    #[test]
    fn test_bundled_demo_script() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/human_replay.json");
        let script = ReplayScript::load(path).unwrap();

        let clock = ManualClock::new();
        let mut session = Session::with_clock(clock.clone(), Vec::new());
        let sub = session.subscribe();
        script.play_instant(&mut session, &sub, &clock);

        assert_eq!(session.answer(), "Sunny");
        assert_eq!(session.snapshot().reaction_time_ms(), 3900);
    }

    #[test]
    fn test_stale_subscription_is_ignored() {
        let clock = ManualClock::new();
        let mut session = Session::with_clock(clock, Vec::new());
        let old = session.subscribe();
        session.reset();

        assert!(!session.deliver(&old, &InputEvent::Key("x".to_string())));
        assert!(session.keys().is_empty());
        assert!(session.answer().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_replay_waits_between_events() {
        let mut session = Session::new();
        let sub = session.subscribe();
        let script = ReplayScript::from_json(
            r#"{ "events": [ { "at_ms": 0, "key": "o" }, { "at_ms": 40, "key": "k" } ] }"#,
        )
        .unwrap();

        let started = tokio::time::Instant::now();
        let delivered = script.play_realtime(&mut session, &sub).await;

        assert_eq!(delivered, 2);
        assert_eq!(session.answer(), "ok");
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
