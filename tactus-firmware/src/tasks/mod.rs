//! Embassy async tasks
//!
//! The tick task and the scan task form the tick source: the timer
//! interrupt only wakes the executor, the handler body always runs in
//! task context.

pub mod tick;

pub use tick::{scan_task, tick_task};
