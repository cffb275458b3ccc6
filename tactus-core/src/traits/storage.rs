//! Storage capability marker

/// Persistent-storage capability.
///
/// The dispatch loop performs no storage operation itself; the presence of
/// a storage module gates the device data-feedback display routine, which
/// reads stored control data while drawing. Contents and formats are the
/// embedder's concern.
pub trait Storage {}
