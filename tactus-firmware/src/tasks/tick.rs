//! Tick source tasks
//!
//! `tick_task` generates the base tick with an embassy Ticker and raises
//! the `TICK` signal; `scan_task` waits on the signal and runs the tick
//! engine. The split mirrors the classic ISR-to-task notification
//! hand-off: the handler body never executes in interrupt context, and
//! the single-slot signal guarantees at most one pending notification
//! (multiple missed ticks coalesce instead of queuing).

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Ticker};

use tactus_core::scheduler::{TickEngine, BASE_TICK_US};

use crate::channels::TICK;

/// Tick task - raises the tick signal once per base period
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started, base period {} us", BASE_TICK_US);

    let mut ticker = Ticker::every(Duration::from_micros(BASE_TICK_US as u64));

    loop {
        ticker.next().await;
        TICK.signal(());
    }
}

/// Scan task - runs the tick engine once per tick notification
#[embassy_executor::task]
pub async fn scan_task(mut engine: TickEngine<'static, CriticalSectionRawMutex>) {
    info!("Scan task started");

    loop {
        TICK.wait().await;
        engine.tick();
    }
}
