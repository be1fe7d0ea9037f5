//! Shared constants for Agni components.

/// Built-in prompt set; one is drawn uniformly at random per attempt
pub const PROMPTS: &[&str] = &[
    "What's your favorite color?",
    "Pizza or Burger?",
    "Favorite movie?",
    "A dream travel destination?",
    "What's your favorite hobby?",
    "Tea or Coffee?",
    "Morning person or night owl?",
    "Books or movies?",
    "Rainy days or sunny days?",
    "What's your go-to comfort food?",
    "Mountains or beaches?",
    "Which season do you like the most?",
    "What's your favorite board game?",
    "Cats or dogs?",
];

/// Classifier feature columns, in training order
pub const FEATURE_NAMES: [&str; 7] = [
    "reaction_time",
    "answer_length",
    "avg_key_interval",
    "std_key_interval",
    "mouse_distance",
    "mouse_avg_speed",
    "mouse_movements",
];

/// Default verification intake endpoint
pub const DEFAULT_INTAKE_URL: &str = "http://localhost:5000/api/submit";

/// Default classifier endpoint
pub const DEFAULT_PREDICT_URL: &str = "http://localhost:5000/api/predict";

/// Default intake HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

/// Default behavior log location
pub const DEFAULT_LOG_PATH: &str = "data/behavior_log.jsonl";

/// How long a claimed nonce is remembered in Redis (24 hours)
pub const DEFAULT_NONCE_TTL_SECS: u64 = 86_400;

/// Raw bytes behind an attempt token
pub const TOKEN_BYTES: usize = 16;

/// Redis key prefixes
pub mod redis_keys {
    /// Claimed nonce: nonce:{token}
    pub const NONCE_PREFIX: &str = "nonce:";
}

/// Intake response messages
pub mod messages {
    pub const MISSING_NONCE: &str = "Missing nonce";
    pub const INVALID_PAYLOAD: &str = "Invalid submission";
    pub const REPLAY_DETECTED: &str = "Replay attack detected";
    pub const RECORDED: &str = "Submission recorded";
    pub const INTERNAL: &str = "Something went wrong";
}
