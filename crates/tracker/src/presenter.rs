//! Presentation surface: status text and verdict rendering.

use std::io::Write;

use agni_common::Verdict;

/// User-facing status of the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    /// Blank answer, nothing was sent
    Invalid,
    Submitting,
    Human,
    Bot,
    /// Intake or classifier call failed
    Failed,
    /// Bot input was simulated and awaits submission
    Simulated,
}

impl Status {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Invalid => "Please enter an answer before submitting.",
            Self::Submitting => "Submitting...",
            Self::Human => "You're verified as human!",
            Self::Bot => "Bot-like behavior detected! Access Denied",
            Self::Failed => "Submission failed.",
            Self::Simulated => "Simulated bot input. You can now submit.",
        }
    }

    /// Status matching a classifier verdict
    pub fn for_verdict(verdict: &Verdict) -> Self {
        if verdict.is_human() {
            Self::Human
        } else {
            Self::Bot
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives status changes and verdicts from the controller
pub trait Presenter {
    fn status(&mut self, status: Status);
    fn verdict(&mut self, verdict: &Verdict);
}

/// Discards everything
impl Presenter for () {
    fn status(&mut self, _status: Status) {}
    fn verdict(&mut self, _verdict: &Verdict) {}
}

/// Line-oriented presenter writing to any `Write` sink
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!(error = %err, "Failed to write status line");
        }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn status(&mut self, status: Status) {
        if status != Status::Idle {
            self.line(status.message());
        }
    }

    fn verdict(&mut self, verdict: &Verdict) {
        let text = format!(
            "{} (confidence: {})",
            verdict.label.as_str().to_uppercase(),
            verdict.confidence_percent()
        );
        self.line(&text);
    }
}
