//! Tick divider
//!
//! Converts the single hardware base tick into several independent logical
//! periods. Each domain has a counter compared against a fixed divisor;
//! counters are checked in a fixed priority order and at most one domain
//! action fires per base tick, which bounds worst-case per-tick work to a
//! single domain action.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Base tick period driving the whole scheduler, in microseconds.
pub const BASE_TICK_US: u32 = 250;

/// One category of periodic work multiplexed onto the base tick.
///
/// Variant order is scheduling priority: when two domains reach their
/// divisor on the same tick, the earlier variant fires and the later one
/// is deferred to the next free tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Domain {
    /// 1 ms aggregate callback
    Millis,
    /// Digital input scan (~2 ms)
    DigitalScan,
    /// Capacitive touch scan (~3 ms)
    TouchScan,
    /// Analog aggregation (~10 ms)
    AnalogScan,
    /// Buffered output flush (~30 ms)
    OutputFlush,
}

/// Divisors for each domain, in counts of the base tick.
///
/// The defaults give the canonical cadences at a 250 us base tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DividerConfig {
    /// Millis callback divisor (default 4 = 1 ms)
    pub millis: u32,
    /// Digital scan divisor (default 8 = 2 ms)
    pub digital: u32,
    /// Touch scan divisor (default 12 = 3 ms)
    pub touch: u32,
    /// Analog aggregation divisor (default 40 = 10 ms)
    pub analog: u32,
    /// Output flush divisor (default 120 = 30 ms)
    pub output: u32,
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self {
            millis: 4,
            digital: 8,
            touch: 12,
            analog: 40,
            output: 120,
        }
    }
}

/// A (divisor, counter) slot for one domain.
#[derive(Debug, Clone, Copy)]
struct Slot {
    domain: Domain,
    divisor: u32,
    counter: u32,
}

/// The priority cascade of domain slots.
///
/// Invoked exactly once per base tick from the scheduler task; delivery is
/// serialized by the tick signal, so `advance` is never reentrant.
#[derive(Debug)]
pub struct TickDivider {
    slots: [Slot; 5],
}

impl TickDivider {
    /// Create a divider with the canonical divisors.
    pub fn new() -> Self {
        Self::with_config(DividerConfig::default())
    }

    /// Create a divider with explicit divisors.
    pub fn with_config(config: DividerConfig) -> Self {
        let slot = |domain, divisor| Slot {
            domain,
            divisor,
            counter: 0,
        };
        Self {
            slots: [
                slot(Domain::Millis, config.millis),
                slot(Domain::DigitalScan, config.digital),
                slot(Domain::TouchScan, config.touch),
                slot(Domain::AnalogScan, config.analog),
                slot(Domain::OutputFlush, config.output),
            ],
        }
    }

    /// Advance one base tick and return the domain whose action fires, if
    /// any.
    ///
    /// All counters increment on entry. Slots are then checked in priority
    /// order; a domain for which `present` returns false is skipped
    /// entirely (its slot never consumes a turn, so idle slots cannot
    /// starve the domains below them). The first present slot whose
    /// counter has reached its divisor resets its own counter and wins the
    /// tick; the remaining slots are not checked.
    ///
    /// Counters are never clamped: a domain deferred by a coincident
    /// higher-priority firing keeps climbing past its divisor and catches
    /// up on the next tick where nothing above it fires.
    pub fn advance(&mut self, mut present: impl FnMut(Domain) -> bool) -> Option<Domain> {
        for slot in self.slots.iter_mut() {
            slot.counter = slot.counter.saturating_add(1);
        }

        for slot in self.slots.iter_mut() {
            if !present(slot.domain) {
                continue;
            }
            if slot.counter >= slot.divisor {
                slot.counter = 0;
                return Some(slot.domain);
            }
        }

        None
    }
}

impl Default for TickDivider {
    fn default() -> Self {
        Self::new()
    }
}
