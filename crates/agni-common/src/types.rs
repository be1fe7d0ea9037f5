//! Core types shared across Agni components.
//!
//! Field names on the wire follow what the intake service and the classifier
//! expect, so several fields carry `serde` renames.

use serde::{Deserialize, Serialize};

/// A single key press, relative to the attempt start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key identifier as reported by the input source (e.g. `"a"`, `"Backspace"`)
    pub key: String,

    /// Milliseconds since the attempt started
    #[serde(rename = "time")]
    pub offset_ms: u64,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, offset_ms: u64) -> Self {
        Self {
            key: key.into(),
            offset_ms,
        }
    }
}

/// A pointer position sample, relative to the attempt start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,

    /// Milliseconds since the attempt started
    #[serde(rename = "time")]
    pub offset_ms: u64,
}

impl PointerEvent {
    pub fn new(x: i32, y: i32, offset_ms: u64) -> Self {
        Self { x, y, offset_ms }
    }
}

/// Raw attempt payload sent to the verification intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakePayload {
    /// Prompt the user answered
    pub prompt: String,

    /// Answer text as typed
    pub answer: String,

    /// Milliseconds between attempt start and submission
    pub reaction_time: u64,

    /// Full ordered key log
    #[serde(default)]
    pub keystrokes: Vec<KeyEvent>,

    /// Full ordered pointer log
    #[serde(default, rename = "mouseMovements")]
    pub mouse_movements: Vec<PointerEvent>,

    /// Attempt token, single-use on the intake side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Acknowledgement body returned by the intake service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeAck {
    #[serde(default)]
    pub message: Option<String>,
}

impl IntakeAck {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Classifier label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Human,
    Bot,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier verdict for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,

    /// Confidence in `label`, within [0, 1]
    pub confidence: f64,
}

impl Verdict {
    /// Build a verdict, clamping confidence into [0, 1].
    ///
    /// NaN is treated as zero confidence.
    pub fn new(label: Label, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    pub fn is_human(&self) -> bool {
        self.label == Label::Human
    }

    /// Confidence as a percentage string with two decimals, e.g. `"93.20%"`
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}
