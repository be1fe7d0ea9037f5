//! Canned bot-like input for exercising the pipeline end to end.

use agni_common::{KeyEvent, PointerEvent};

use crate::clock::Clock;
use crate::presenter::Status;
use crate::session::Session;

/// Answer typed by the simulated bot
pub const BOT_ANSWER: &str = "yes";

/// Gap between simulated key presses
pub const BOT_KEY_INTERVAL_MS: u64 = 10;

/// Number of simulated pointer samples
pub const BOT_POINTER_SAMPLES: i32 = 10;

/// Fill the session with machine-regular input. Nothing is submitted.
///
/// Keys land every 10 ms; the pointer moves in a straight line, 5 px right
/// and 2 px down every 5 ms.
pub fn simulate_bot<C: Clock>(session: &mut Session<C>) {
    let keys = BOT_ANSWER
        .chars()
        .enumerate()
        .map(|(i, c)| KeyEvent::new(c.to_string(), i as u64 * BOT_KEY_INTERVAL_MS))
        .collect();

    let pointers = (0..BOT_POINTER_SAMPLES)
        .map(|i| PointerEvent::new(100 + i * 5, 100 + i * 2, i as u64 * 5))
        .collect();

    session.set_answer(BOT_ANSWER);
    session.replace_logs(keys, pointers);
    session.set_status(Status::Simulated);

    tracing::info!(token = %session.token(), "Simulated bot input");
}
