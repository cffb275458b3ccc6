//! Navigation-lock arbitration
//!
//! A page may drive its navigation from a potentiometer that doubles as a
//! generic parameter control. When the user operates a discrete navigation
//! control instead (increment/decrement/arrow switches), the pot channel
//! is locked so a coarse navigation gesture is not simultaneously
//! misinterpreted as a fine parameter change: analog events for the locked
//! channel are discarded until the scan driver reports that the channel
//! has re-synced and unlocked.
//!
//! The lock flags live in [`ChannelLocks`], a lock-free bitmask shared
//! between the dispatch loop (which requests locks) and the analog scan
//! driver (which reports unlocks from the scheduler context).

use portable_atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Port assignments for a page's discrete navigation controls.
///
/// An unconfigured control never matches an event port. `pot` names the
/// analog channel that doubles as the navigation potentiometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPorts {
    /// Primary increment control
    pub increment: Option<u8>,
    /// Primary decrement control
    pub decrement: Option<u8>,
    /// Secondary increment control
    pub increment_secondary: Option<u8>,
    /// Secondary decrement control
    pub decrement_secondary: Option<u8>,
    /// Up arrow
    pub up: Option<u8>,
    /// Down arrow
    pub down: Option<u8>,
    /// Left arrow
    pub left: Option<u8>,
    /// Right arrow
    pub right: Option<u8>,
    /// Analog channel shared with generic parameter control
    pub pot: Option<u8>,
}

impl NavPorts {
    /// A configuration with no controls assigned.
    pub const fn unassigned() -> Self {
        Self {
            increment: None,
            decrement: None,
            increment_secondary: None,
            decrement_secondary: None,
            up: None,
            down: None,
            left: None,
            right: None,
            pot: None,
        }
    }

    /// `true` when `port` is one of the eight navigation controls.
    pub fn is_nav_control(&self, port: u8) -> bool {
        let port = Some(port);
        port == self.increment
            || port == self.decrement
            || port == self.increment_secondary
            || port == self.decrement_secondary
            || port == self.up
            || port == self.down
            || port == self.left
            || port == self.right
    }
}

/// Observable navigation-lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavLockState {
    /// No channel claimed; analog events flow normally.
    Unlocked,
    /// Channel claimed, discard latch already cleared.
    Locked(u8),
    /// Channel claimed and analog events for it are being discarded.
    LockedDiscard(u8),
}

/// The navigation-lock latch held by the dispatch loop.
#[derive(Debug, Default)]
pub struct NavLock {
    locked_channel: Option<u8>,
    discard_pending: bool,
}

impl NavLock {
    /// Create an unlocked latch.
    pub const fn new() -> Self {
        Self {
            locked_channel: None,
            discard_pending: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> NavLockState {
        match (self.locked_channel, self.discard_pending) {
            (Some(ch), true) => NavLockState::LockedDiscard(ch),
            (Some(ch), false) => NavLockState::Locked(ch),
            (None, _) => NavLockState::Unlocked,
        }
    }

    /// Claim `channel` for navigation and arm the discard latch.
    pub fn engage(&mut self, channel: u8) {
        self.locked_channel = Some(channel);
        self.discard_pending = true;
    }

    /// Drop the claim and reset the latch.
    pub fn release(&mut self) {
        self.locked_channel = None;
        self.discard_pending = false;
    }

    /// Decide whether an analog event for `port` must be discarded.
    ///
    /// While the latch is armed, events for the locked channel are
    /// consumed until `locks` reports the driver has unlocked it; the
    /// first event after the unlock resets the latch and is delivered.
    /// Events for other channels always pass.
    pub fn filter(&mut self, port: u8, locks: &ChannelLocks) -> bool {
        if !self.discard_pending {
            return false;
        }
        let Some(channel) = self.locked_channel else {
            return false;
        };
        if port != channel {
            return false;
        }
        if locks.is_locked(channel) {
            true
        } else {
            self.release();
            false
        }
    }
}

/// Per-channel lock flags for up to 32 analog channels.
///
/// The dispatch loop sets a flag when a navigation gesture claims the pot
/// channel; the analog scan driver clears it (from the scheduler context)
/// once the channel has re-synced. The flags are independent of each
/// other, so relaxed ordering is sufficient.
#[derive(Debug)]
pub struct ChannelLocks {
    bits: AtomicU32,
}

impl ChannelLocks {
    /// Create with all channels unlocked.
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    /// Lock `channel`. Channels past 31 are ignored.
    pub fn lock_channel(&self, channel: u8) {
        if channel < 32 {
            self.bits.fetch_or(1 << channel, Ordering::Relaxed);
        }
    }

    /// Unlock `channel`.
    pub fn unlock_channel(&self, channel: u8) {
        if channel < 32 {
            self.bits.fetch_and(!(1 << channel), Ordering::Relaxed);
        }
    }

    /// `true` while `channel` is locked.
    pub fn is_locked(&self, channel: u8) -> bool {
        if channel < 32 {
            self.bits.load(Ordering::Relaxed) & (1 << channel) != 0
        } else {
            false
        }
    }
}

impl Default for ChannelLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_control_matching() {
        let ports = NavPorts {
            increment: Some(2),
            decrement: Some(3),
            up: Some(10),
            pot: Some(0),
            ..NavPorts::unassigned()
        };
        assert!(ports.is_nav_control(2));
        assert!(ports.is_nav_control(3));
        assert!(ports.is_nav_control(10));
        // The pot itself is not a discrete navigation control.
        assert!(!ports.is_nav_control(0));
        assert!(!ports.is_nav_control(7));
    }

    #[test]
    fn test_unassigned_matches_nothing() {
        let ports = NavPorts::unassigned();
        for port in 0..=255u8 {
            assert!(!ports.is_nav_control(port));
        }
    }

    #[test]
    fn test_channel_locks() {
        let locks = ChannelLocks::new();
        assert!(!locks.is_locked(3));
        locks.lock_channel(3);
        locks.lock_channel(17);
        assert!(locks.is_locked(3));
        assert!(locks.is_locked(17));
        assert!(!locks.is_locked(4));
        locks.unlock_channel(3);
        assert!(!locks.is_locked(3));
        assert!(locks.is_locked(17));
        // Out-of-range channels are ignored and never report locked.
        locks.lock_channel(40);
        assert!(!locks.is_locked(40));
    }

    #[test]
    fn test_discard_until_driver_unlocks() {
        let locks = ChannelLocks::new();
        let mut nav = NavLock::new();
        assert_eq!(nav.state(), NavLockState::Unlocked);

        // A navigation gesture claims channel 1.
        locks.lock_channel(1);
        nav.engage(1);
        assert_eq!(nav.state(), NavLockState::LockedDiscard(1));

        // While the driver holds the lock, events for the channel drop.
        assert!(nav.filter(1, &locks));
        assert!(nav.filter(1, &locks));
        assert!(nav.filter(1, &locks));

        // Other channels are unaffected.
        assert!(!nav.filter(0, &locks));

        // Driver reports unlock: the next event is delivered and the
        // latch resets.
        locks.unlock_channel(1);
        assert!(!nav.filter(1, &locks));
        assert_eq!(nav.state(), NavLockState::Unlocked);
        assert!(!nav.filter(1, &locks));
    }

    #[test]
    fn test_re_engage_after_release() {
        let locks = ChannelLocks::new();
        let mut nav = NavLock::new();

        locks.lock_channel(2);
        nav.engage(2);
        assert!(nav.filter(2, &locks));

        locks.unlock_channel(2);
        assert!(!nav.filter(2, &locks));

        // A second gesture re-arms the latch for the same channel.
        locks.lock_channel(2);
        nav.engage(2);
        assert_eq!(nav.state(), NavLockState::LockedDiscard(2));
        assert!(nav.filter(2, &locks));
    }
}
