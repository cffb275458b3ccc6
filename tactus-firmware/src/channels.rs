//! Inter-task communication statics
//!
//! The queues and signals shared between the scan task and the dispatch
//! loop. Uses embassy-sync primitives for safe cross-context hand-off.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use tactus_core::nav::ChannelLocks;
use tactus_core::queue::{
    SharedEventQueue, ANALOG_QUEUE_LEN, DIGITAL_QUEUE_LEN, TOUCH_QUEUE_LEN,
};

/// Base-tick notification from the tick task to the scan task.
///
/// `Signal` overwrites rather than queues, so a scan task that falls
/// behind coalesces pending ticks instead of bursting to catch up.
pub static TICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Digital scan events awaiting the dispatch loop.
pub static DIGITAL_EVENTS: SharedEventQueue<CriticalSectionRawMutex, DIGITAL_QUEUE_LEN> =
    SharedEventQueue::new();

/// Touch scan events awaiting the dispatch loop.
pub static TOUCH_EVENTS: SharedEventQueue<CriticalSectionRawMutex, TOUCH_QUEUE_LEN> =
    SharedEventQueue::new();

/// Aggregated analog events awaiting the dispatch loop.
pub static ANALOG_EVENTS: SharedEventQueue<CriticalSectionRawMutex, ANALOG_QUEUE_LEN> =
    SharedEventQueue::new();

/// Analog channel-lock flags shared between the dispatch loop and the
/// pot scanner.
pub static NAV_LOCKS: ChannelLocks = ChannelLocks::new();
