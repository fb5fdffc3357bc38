//! Blink-rate mapping for the feature report.
//!
//! The host sets the blink rate of the second LED in blinks per second.
//! The rate collaborator turns it into a period / on-time pair; the LED is
//! on for half of each period.

use crate::config::{BLINK_RATE_MAX, BLINK_RATE_MIN, DEFAULT_BLINK_RATE};

/// Sink for the (already clamped) blink rate.
///
/// Implemented by whatever drives the blinking LED; on the firmware this
/// is a signal consumed by the blink task.
pub trait RateControl {
    fn set_rate(&mut self, rate: u8);
}

/// Clamp a requested rate into `[BLINK_RATE_MIN, BLINK_RATE_MAX]`.
///
/// Out-of-range requests are corrected, never rejected.
pub fn clamp_rate(requested: u8) -> u8 {
    requested.clamp(BLINK_RATE_MIN, BLINK_RATE_MAX)
}

/// One blink cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkTiming {
    /// Full cycle length (ms).
    pub period_ms: u32,
    /// Time the LED is lit within one cycle (ms).
    pub on_ms: u32,
}

impl BlinkTiming {
    /// Timing for `rate` blinks per second.  The rate is clamped first, so
    /// the period is never zero.
    pub fn from_rate(rate: u8) -> Self {
        let period_ms = 1000 / u32::from(clamp_rate(rate));
        Self {
            period_ms,
            on_ms: period_ms / 2,
        }
    }

    /// Time the LED stays dark within one cycle (ms).
    pub fn off_ms(&self) -> u32 {
        self.period_ms - self.on_ms
    }
}

impl Default for BlinkTiming {
    fn default() -> Self {
        Self::from_rate(DEFAULT_BLINK_RATE)
    }
}
