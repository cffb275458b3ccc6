//! Input scanner traits
//!
//! Scanners are owned by the scheduler task and invoked as tick-divider
//! domain actions. Digital and touch scanners detect edges themselves and
//! push `(port, value)` events into the queue they are handed; the analog
//! scanner is sampled channel by channel by the aggregation bridge.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::queue::{SharedEventQueue, DIGITAL_QUEUE_LEN, TOUCH_QUEUE_LEN};

/// Digital input scanner (switches, encoders read as switch pairs).
pub trait DigitalScanner<M: RawMutex> {
    /// Number of digital ports this scanner provides.
    fn ports(&self) -> u8;

    /// Scan all ports and push one event per detected edge into `out`
    /// (value 1 = pressed, 0 = released). Runs in the scheduler context;
    /// must not block.
    fn scan(&mut self, out: &SharedEventQueue<M, DIGITAL_QUEUE_LEN>);
}

/// Capacitive touch scanner.
///
/// Touch ports are domain-local; the dispatch loop offsets them past the
/// digital range before delivery.
pub trait TouchScanner<M: RawMutex> {
    /// Number of touch ports this scanner provides.
    fn ports(&self) -> u8;

    /// Scan all pads and push one event per detected edge into `out`.
    fn scan(&mut self, out: &SharedEventQueue<M, TOUCH_QUEUE_LEN>);
}

/// Analog input scanner (potentiometers, faders, CV inputs).
///
/// Implementations filter their raw samples and report `None` when a
/// channel has not meaningfully changed since the last read, so the
/// aggregation bridge enqueues only real movements. Channel locking for
/// navigation arbitration flows through the [`crate::nav::ChannelLocks`]
/// handle the scanner is constructed with: a locked channel stays silent
/// and the scanner clears the flag once the channel has re-synced.
pub trait AnalogScanner {
    /// Number of analog channels this scanner provides.
    fn ports(&self) -> u8;

    /// Filtered read of `port` over the full converter range.
    /// `None` means no meaningful change.
    fn read(&mut self, port: u8) -> Option<i16>;

    /// Filtered read of `port` mapped through per-channel calibration
    /// bounds before change comparison.
    fn read_ranged(&mut self, port: u8, min: u16, max: u16) -> Option<i16>;
}
