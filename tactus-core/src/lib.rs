//! Board-agnostic control core for Tactus control surfaces
//!
//! This crate contains all scheduling and event-delivery logic that does
//! not depend on specific hardware implementations:
//!
//! - Hardware abstraction traits (scanners, device, page, display, output)
//! - Tick divider multiplexing one hardware tick into scan cadences
//! - Bounded event queues bridging the scan and dispatch contexts
//! - Navigation-lock arbitration of the shared navigation pot channel
//! - The per-frame dispatch loop routing events to device/page/callbacks
//!
//! The crate is split along execution contexts: [`scheduler::TickEngine`]
//! is owned by the periodic scheduler task, [`dispatch::Dispatcher`] by the
//! cooperative main loop. The only state shared between the two are the
//! event queues, the analog channel-lock flags, and the device/output
//! capability cells.

#![no_std]
#![deny(unsafe_code)]

pub mod dispatch;
pub mod event;
pub mod nav;
pub mod queue;
pub mod scheduler;
pub mod traits;
