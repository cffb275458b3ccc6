//! Filtered ADC pot scanner
//!
//! Blocking reads of the RP2040 ADC with a light exponential filter and
//! a change threshold: a channel that has not moved past the threshold
//! since its last report returns `None`, so the aggregation bridge only
//! sees real movements. Samples are mapped to the 10-bit control range,
//! through per-channel calibration bounds when the device provides them.
//!
//! Navigation locking: while a channel's flag is set in the shared
//! [`ChannelLocks`], the scanner stays silent for it. The flag clears
//! once the pot is deliberately moved away from where it sat when the
//! lock landed, which is the driver-side unlock report.

use embassy_rp::adc::{Adc, Blocking, Channel};

use tactus_core::nav::ChannelLocks;
use tactus_core::traits::AnalogScanner;

/// Minimum movement (in control-range steps) to report a change.
const CHANGE_THRESHOLD: i16 = 4;

/// Movement away from the lock-time value that releases a locked
/// channel.
const RESYNC_DELTA: i16 = 16;

#[derive(Clone, Copy)]
struct PotFilter {
    /// Exponential filter state, 12-bit
    filtered: u16,
    /// First sample seeds the filter instead of averaging from zero
    primed: bool,
    /// Last value reported upstream
    last_reported: i16,
    /// Control value at the moment the channel lock was observed
    lock_reference: Option<i16>,
}

impl PotFilter {
    const IDLE: Self = Self {
        filtered: 0,
        primed: false,
        last_reported: -1,
        lock_reference: None,
    };
}

/// Blocking-ADC analog scanner.
pub struct PotScanner<const N: usize> {
    adc: Adc<'static, Blocking>,
    channels: [Channel<'static>; N],
    filters: [PotFilter; N],
    locks: &'static ChannelLocks,
}

impl<const N: usize> PotScanner<N> {
    /// `locks` is the same handle the dispatch loop uses to claim
    /// channels for navigation.
    pub fn new(
        adc: Adc<'static, Blocking>,
        channels: [Channel<'static>; N],
        locks: &'static ChannelLocks,
    ) -> Self {
        Self {
            adc,
            channels,
            filters: [PotFilter::IDLE; N],
            locks,
        }
    }

    /// Filtered 12-bit sample of `port`, or `None` on a converter error.
    fn sample(&mut self, port: u8) -> Option<u16> {
        let channel = self.channels.get_mut(port as usize)?;
        let raw = self.adc.blocking_read(channel).ok()?;
        let filter = &mut self.filters[port as usize];
        if filter.primed {
            filter.filtered = filter.filtered - filter.filtered / 4 + raw / 4;
        } else {
            filter.filtered = raw;
            filter.primed = true;
        }
        Some(filter.filtered)
    }

    /// Apply lock handling and the change threshold to a mapped value.
    fn resolve(&mut self, port: u8, mapped: i16) -> Option<i16> {
        let filter = &mut self.filters[port as usize];

        if self.locks.is_locked(port) {
            // Claimed by navigation: stay silent until the pot is
            // deliberately moved again, then report the unlock.
            let reference = *filter.lock_reference.get_or_insert(mapped);
            if (mapped - reference).abs() <= RESYNC_DELTA {
                return None;
            }
            self.locks.unlock_channel(port);
            filter.lock_reference = None;
            filter.last_reported = mapped;
            return Some(mapped);
        }

        filter.lock_reference = None;
        if (mapped - filter.last_reported).abs() < CHANGE_THRESHOLD {
            return None;
        }
        filter.last_reported = mapped;
        Some(mapped)
    }
}

impl<const N: usize> AnalogScanner for PotScanner<N> {
    fn ports(&self) -> u8 {
        N as u8
    }

    fn read(&mut self, port: u8) -> Option<i16> {
        let filtered = self.sample(port)?;
        // 12-bit converter down to the 10-bit control range.
        let mapped = (filtered >> 2) as i16;
        self.resolve(port, mapped)
    }

    fn read_ranged(&mut self, port: u8, min: u16, max: u16) -> Option<i16> {
        let filtered = self.sample(port)?;
        let span = max.saturating_sub(min).max(1) as u32;
        let clamped = filtered.clamp(min, max);
        let mapped = ((clamped - min) as u32 * 1023 / span) as i16;
        self.resolve(port, mapped)
    }
}
