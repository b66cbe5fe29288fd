//! Presence LED task.
//!
//! The controller publishes [`IndicatorMode`] through a `Signal`; the
//! task here owns the pin and renders the mode. A `Signal` keeps only
//! the latest value, so a mode change always lands and replaces any
//! blink cycle mid-flight.

use defmt::debug;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

use crate::config;
use crate::indicator::{IndicatorMode, StatusIndicator};

/// Controller-side indicator that publishes modes into the signal.
pub struct SignalIndicator {
    modes: &'static Signal<CriticalSectionRawMutex, IndicatorMode>,
}

impl SignalIndicator {
    pub fn new(modes: &'static Signal<CriticalSectionRawMutex, IndicatorMode>) -> Self {
        Self { modes }
    }
}

impl StatusIndicator for SignalIndicator {
    fn set_mode(&mut self, mode: IndicatorMode) {
        self.modes.signal(mode);
    }
}

/// LED rendering task.
pub async fn led_task(
    pin: AnyPin,
    active_low: bool,
    modes: &'static Signal<CriticalSectionRawMutex, IndicatorMode>,
) -> ! {
    let mut led = Output::new(pin, level_for(false, active_low), OutputDrive::Standard);
    let mut mode = IndicatorMode::Off;

    loop {
        debug!("LED: {}", mode);
        match mode {
            IndicatorMode::Off => {
                led.set_level(level_for(false, active_low));
                mode = modes.wait().await;
            }
            IndicatorMode::Connected => {
                led.set_level(level_for(true, active_low));
                mode = modes.wait().await;
            }
            IndicatorMode::Searching => {
                let mut lit = false;
                loop {
                    lit = !lit;
                    led.set_level(level_for(lit, active_low));
                    match select(
                        modes.wait(),
                        Timer::after(Duration::from_millis(config::BLINK_PERIOD_MS)),
                    )
                    .await
                    {
                        Either::First(next) => {
                            mode = next;
                            break;
                        }
                        Either::Second(()) => {}
                    }
                }
            }
        }
    }
}

fn level_for(lit: bool, active_low: bool) -> Level {
    if lit != active_low {
        Level::High
    } else {
        Level::Low
    }
}
