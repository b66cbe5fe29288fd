//! Cancel button input with async debouncing.
//!
//! One physical button (active-low with internal pull-up). A confirmed
//! press sets the cancel flag; the supervisor reads it on its next
//! tick. The flag is one-way for the life of a session, so repeated
//! presses are harmless.

use defmt::info;
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};

use crate::ble::controller::CancelFlag;
use crate::config::BUTTON_DEBOUNCE_MS;

/// Watch the cancel button.
pub async fn cancel_task(pin: AnyPin, flag: &'static CancelFlag) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Button: cancel requested");
            flag.request();

            // Wait for release to avoid repeat triggers.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
