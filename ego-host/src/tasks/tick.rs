//! Tick task
//!
//! Paces the device at the configured period. A tick the device task has
//! not picked up yet is overwritten, so a slow tick never queues up a burst.

use embassy_time::{Duration, Ticker};
use tracing::info;

use crate::channels::TICK_SIGNAL;

#[embassy_executor::task]
pub async fn tick_task(period_ms: u64) {
    info!(period_ms, "tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(period_ms));
    let mut tick = 0u64;

    loop {
        ticker.next().await;
        tick += 1;
        TICK_SIGNAL.signal(tick);
    }
}
