//! Reference peripheral drivers
//!
//! Minimal direct-GPIO/ADC implementations of the core scanner and
//! output traits, enough to run the dispatch core on a bare RP2040
//! board. Production boards with shift registers or multiplexers supply
//! their own implementations of the same traits.

pub mod buttons;
pub mod leds;
pub mod pots;

pub use buttons::ButtonScanner;
pub use leds::LedDriver;
pub use pots::PotScanner;
