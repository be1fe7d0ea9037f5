//! Intake persistence: replay protection and the behavior log.

mod behavior_log;
mod nonce;

pub use behavior_log::{BehaviorLog, StoredSubmission, read_log};
pub use nonce::NonceStore;
