//! Button input with async debouncing.
//!
//! The button is active-low with the internal pull-up.  Each debounced
//! falling edge is one press edge for the HID layer.

use super::{Endpoints, SharedDevice, GATE};
use crate::config::BUTTON_DEBOUNCE_MS;
use crate::fmt::debug;
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};

/// Run the button loop forever.
///
/// Waits for the pin to go low, debounces, reports the edge, then waits
/// for release before arming again.
pub async fn button_task(pin: AnyPin, device: &'static SharedDevice) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            let accepted =
                device.lock(|dev| dev.on_button_edge(&GATE, &mut Endpoints::new(&[])));
            debug!("Button: press, accepted={}", accepted);

            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
