//! Blink-rate LED task.

use super::BLINK_RATE;
use crate::blink::BlinkTiming;
use crate::fmt::info;
use crate::led::ActiveLow;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use embassy_time::Timer;
use embedded_hal::digital::{OutputPin, PinState};

/// Blink the LED at the rate last set by the host.
///
/// A new rate restarts the cycle immediately.
pub async fn blink_task(pin: AnyPin) -> ! {
    // High = dark on an active-low LED.
    let mut led = ActiveLow(Output::new(pin, Level::High, OutputDrive::Standard));
    let mut timing = BlinkTiming::default();

    loop {
        let phases = [(PinState::High, timing.on_ms), (PinState::Low, timing.off_ms())];
        for (level, ms) in phases {
            let _ = led.set_state(level);
            if let Either::Second(rate) =
                select(Timer::after_millis(u64::from(ms)), BLINK_RATE.wait()).await
            {
                timing = BlinkTiming::from_rate(rate);
                info!("Blink: {} ms period", timing.period_ms);
                break;
            }
        }
    }
}
