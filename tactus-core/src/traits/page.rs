//! Paged-UI trait
//!
//! Only the navigation-lock contract of the page system is visible to the
//! core: event delivery, per-frame view refresh, and the navigation port
//! configuration used to arbitrate the shared pot channel.

use crate::event::EventKind;
use crate::nav::NavPorts;

/// Active page of the paged UI.
pub trait Page {
    /// Deliver an unconsumed input event to the page. Touch events arrive
    /// with their offset-adjusted port and [`EventKind::Digital`].
    fn process_event(&mut self, port: u8, value: i16, kind: EventKind);

    /// Recompute what the page should render. Called once per frame
    /// whether or not any events fired.
    fn process_view(&mut self);

    /// Navigation control port assignments for the active page.
    fn nav_ports(&self) -> NavPorts;

    /// `true` when the active page drives navigation from the shared
    /// potentiometer channel.
    fn uses_nav_pot(&self) -> bool;
}
