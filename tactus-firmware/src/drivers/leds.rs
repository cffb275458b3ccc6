//! Staged GPIO LED output driver
//!
//! LED states are staged in a bitmask and written to the pins on the
//! per-frame flush; channels marked as blinking are additionally gated
//! by a phase derived from the frame timestamp on the periodic refresh
//! domain.

use embassy_rp::gpio::{Level, Output};

use tactus_core::traits::OutputDriver;

/// Blink half-period in milliseconds.
const BLINK_PERIOD_MS: u32 = 250;

/// Direct-GPIO output driver.
pub struct LedDriver<const N: usize> {
    pins: [Output<'static>; N],
    /// Requested LED states
    staged: u32,
    /// Channels modulated by the blink phase
    blink: u32,
    now_ms: u32,
    phase: bool,
}

impl<const N: usize> LedDriver<N> {
    pub fn new(pins: [Output<'static>; N]) -> Self {
        Self {
            pins,
            staged: 0,
            blink: 0,
            now_ms: 0,
            phase: false,
        }
    }

    /// Stage a steady on/off state for `port`.
    pub fn set(&mut self, port: u8, on: bool) {
        if (port as usize) < N {
            if on {
                self.staged |= 1 << port;
            } else {
                self.staged &= !(1 << port);
            }
        }
    }

    /// Enable or disable blink modulation for `port`.
    pub fn set_blink(&mut self, port: u8, on: bool) {
        if (port as usize) < N {
            if on {
                self.blink |= 1 << port;
            } else {
                self.blink &= !(1 << port);
            }
        }
    }

    /// Drive every pin from the staged states and the blink phase.
    fn drive(&mut self) {
        for (port, pin) in self.pins.iter_mut().enumerate() {
            let staged = self.staged & (1 << port) != 0;
            let blinking = self.blink & (1 << port) != 0;
            let on = staged && (!blinking || self.phase);
            pin.set_level(if on { Level::High } else { Level::Low });
        }
    }
}

impl<const N: usize> OutputDriver for LedDriver<N> {
    fn set_timer(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
    }

    fn refresh(&mut self) {
        self.phase = (self.now_ms / BLINK_PERIOD_MS) % 2 == 0;
        self.drive();
    }

    fn flush(&mut self) {
        self.drive();
    }
}
