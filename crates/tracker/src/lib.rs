//! # Tracker - Agni behavioral data collector
//!
//! Records how a user answers a short prompt (key rhythm, pointer motion),
//! reduces the recording to a [`FeatureRecord`](agni_common::FeatureRecord),
//! and asks a remote classifier whether the behavior looks human.
//!
//! ## Flow
//! ```text
//! input source → Session (record) → snapshot → intake  (raw payload)
//!                                           ↘ extract → classifier → Presenter
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod extract;
pub mod input;
pub mod presenter;
pub mod session;
pub mod simulate;

pub use client::{Classifier, HttpVerifier, VerificationIntake};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::Controller;
pub use extract::extract;
pub use input::{InputEvent, InputHandler, ReplayScript};
pub use presenter::{ConsolePresenter, Presenter, Status};
pub use session::{Attempt, AttemptSnapshot, Session, Subscription};
