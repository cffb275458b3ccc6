//! Capability traits for external collaborators
//!
//! The core never talks to hardware or higher-level logic directly; every
//! optional module (scanners, device, page, display, output, storage) is a
//! capability slot filled with an implementation of one of these traits.
//! Dispatch is a presence check plus a call through the trait.

pub mod device;
pub mod display;
pub mod output;
pub mod page;
pub mod scan;
pub mod storage;

pub use device::{ControlMode, Device};
pub use display::Display;
pub use output::OutputDriver;
pub use page::Page;
pub use scan::{AnalogScanner, DigitalScanner, TouchScanner};
pub use storage::Storage;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;

/// A module slot shared between the scheduler task and the dispatch loop.
///
/// Only two modules cross contexts: the device (for the scan-context
/// analog bypass) and the output driver (periodic refresh vs per-frame
/// flush). Each access is a scoped `lock` of bounded duration.
pub type SharedModule<'a, M, T> = Mutex<M, RefCell<&'a mut T>>;

/// Shared device slot.
pub type SharedDevice<'a, M> = SharedModule<'a, M, dyn Device + 'a>;

/// Shared output-driver slot.
pub type SharedOutput<'a, M> = SharedModule<'a, M, dyn OutputDriver + 'a>;
