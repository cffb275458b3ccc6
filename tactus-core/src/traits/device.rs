//! Device module trait
//!
//! The device layer maps raw control events to its own outputs (MIDI or
//! otherwise) and holds first-refusal right on every input event: when a
//! handler returns `true` the event is fully consumed and never reaches
//! page or callback logic.

use crate::event::Origin;

/// Device control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Normal operation: events are arbitrated and mapped.
    Run,
    /// Control setup: analog events are routed through [`Device::setup_ctrl`]
    /// before arbitration.
    Edit,
}

/// Device arbitration and control-mapping module.
pub trait Device {
    /// Offer a digital or touch event. Returns `true` when consumed.
    fn handle_digital_event(&mut self, port: u8, value: i16, origin: Origin) -> bool;

    /// Offer an analog event. Returns `true` when consumed.
    ///
    /// Called with [`Origin::Scan`] directly from the scheduler context
    /// (the low-latency smoothing path) and with [`Origin::Frame`] from
    /// the dispatch loop; the scan-context path must stay short.
    fn handle_analog_event(&mut self, port: u8, value: i16, origin: Origin) -> bool;

    /// Current control mode.
    fn ctrl_mode(&self) -> ControlMode;

    /// Feed a raw analog event into control setup (edit mode only).
    fn setup_ctrl(&mut self, port: u8, value: i16);

    /// Lower calibration bound of the converter range for `port`.
    fn adc_min(&self, port: u8) -> u16;

    /// Upper calibration bound of the converter range for `port`.
    fn adc_max(&self, port: u8) -> u16;

    /// `true` while the device wants its data-feedback overlay shown.
    fn show_data_feedback(&self) -> bool;

    /// Draw the data-feedback overlay (display is unlocked around the
    /// call by the dispatch loop).
    fn data_feedback(&mut self);

    /// Timestamp (ms) at which the current feedback overlay was armed.
    fn feedback_since(&self) -> u32;

    /// Arm or clear the data-feedback overlay.
    fn set_data_feedback(&mut self, on: bool);
}
