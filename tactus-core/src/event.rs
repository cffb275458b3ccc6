//! Input event model
//!
//! Every hardware change that travels through the core is a `(port, value)`
//! pair. Ports are domain-local indices; the dispatch loop offsets touch
//! ports past the digital range before delivery so the two domains never
//! collide.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single input change: which port moved and to what value.
///
/// Digital and touch events carry 1 (pressed/touched) or 0 (released).
/// Analog events carry the range-mapped control value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// Domain-local port index
    pub port: u8,
    /// Signed event magnitude
    pub value: i16,
}

impl Event {
    /// Create an event
    pub const fn new(port: u8, value: i16) -> Self {
        Self { port, value }
    }
}

/// Event class as seen by page logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Switch semantics (digital inputs and capacitive touch)
    Digital,
    /// Continuous-control semantics (analog inputs)
    Analog,
}

/// Which execution context is offering an event to the device module.
///
/// Device arbitration sees events twice: once directly from the scan
/// context (low-latency bypass) and once from the frame drain. The device
/// can tell the two apart, e.g. to smooth only scan-context samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Origin {
    /// Delivered by the main dispatch loop while draining a queue
    Frame,
    /// Delivered directly from the scheduler-task scan context
    Scan,
}
