//! # Agni Common
//!
//! Shared types and utilities used across Agni components.
//!
//! ## Modules
//! - `types` - Wire types (KeyEvent, PointerEvent, IntakePayload, Verdict)
//! - `features` - FeatureRecord extraction from input logs
//! - `error` - Common error types
//! - `constants` - Prompt set, endpoints, and other shared constants

pub mod constants;
pub mod error;
pub mod features;
pub mod types;

pub use error::AgniError;
pub use features::FeatureRecord;
pub use types::*;
