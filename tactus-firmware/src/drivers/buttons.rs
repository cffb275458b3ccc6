//! Debounced GPIO button scanner
//!
//! Direct-wired buttons, active low with pull-ups. Each scan samples
//! every pin and reports an edge only after the level has been stable
//! for [`DEBOUNCE_SCANS`] consecutive scans (~4 ms at the canonical
//! digital cadence).

use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::RawMutex;

use tactus_core::event::Event;
use tactus_core::queue::{SharedEventQueue, DIGITAL_QUEUE_LEN};
use tactus_core::traits::DigitalScanner;

/// Consecutive stable scans required before an edge is reported.
const DEBOUNCE_SCANS: u8 = 2;

#[derive(Clone, Copy)]
struct ButtonState {
    /// Committed (reported) level
    debounced: bool,
    /// Raw level seen on the previous scan
    last_raw: bool,
    /// Consecutive scans the raw level has disagreed with `debounced`
    stable: u8,
}

impl ButtonState {
    const RELEASED: Self = Self {
        debounced: false,
        last_raw: false,
        stable: 0,
    };
}

/// Direct-GPIO digital scanner.
pub struct ButtonScanner<const N: usize> {
    pins: [Input<'static>; N],
    states: [ButtonState; N],
}

impl<const N: usize> ButtonScanner<N> {
    /// Inputs must be configured with pull-ups; a low level reads as
    /// pressed.
    pub fn new(pins: [Input<'static>; N]) -> Self {
        Self {
            pins,
            states: [ButtonState::RELEASED; N],
        }
    }
}

impl<M: RawMutex, const N: usize> DigitalScanner<M> for ButtonScanner<N> {
    fn ports(&self) -> u8 {
        N as u8
    }

    fn scan(&mut self, out: &SharedEventQueue<M, DIGITAL_QUEUE_LEN>) {
        for (port, (pin, state)) in self.pins.iter().zip(self.states.iter_mut()).enumerate() {
            let raw = pin.is_low();

            if raw == state.debounced {
                state.last_raw = raw;
                state.stable = 0;
                continue;
            }

            if raw == state.last_raw {
                state.stable = state.stable.saturating_add(1);
            } else {
                state.last_raw = raw;
                state.stable = 1;
            }

            if state.stable >= DEBOUNCE_SCANS {
                state.debounced = raw;
                state.stable = 0;
                out.push(Event::new(port as u8, if raw { 1 } else { 0 }));
            }
        }
    }
}
