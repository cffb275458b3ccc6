//! Tick scheduling
//!
//! Everything executed in the periodic scheduler-task context: the tick
//! divider that multiplexes the base tick into per-domain cadences, and
//! the tick engine that owns the scanner drivers and runs one domain
//! action per tick.

pub mod divider;
pub mod engine;

pub use divider::{Domain, DividerConfig, TickDivider, BASE_TICK_US};
pub use engine::TickEngine;
