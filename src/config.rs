//! Application-wide constants and compile-time configuration.
//!
//! All hardware selection, timing parameters, and the target pad's
//! identity live here so they can be tuned in one place.

// Target peripheral

/// Address of the pad to connect to, as printed on its label.
/// Parsed into a [`crate::ble::PeripheralIdentity`] at startup; an
/// unparseable value is a fatal configuration error.
pub const TARGET_ADDR: &str = "D5:51:FA:B6:09:71";

// Scanning

/// Scan window (microseconds). Equal window and interval means the
/// radio listens continuously during a burst.
pub const SCAN_WINDOW_US: u32 = 30_000;

/// Scan interval (microseconds).
pub const SCAN_INTERVAL_US: u32 = 30_000;

/// Length of one scan burst (ms). Each burst ends with a scan-done
/// event; the controller restarts bursts until the overall timeout.
pub const SCAN_BURST_MS: u32 = 5_000;

/// Give up and shut down if the pad has not been found after this
/// many seconds of scanning.
pub const SCAN_TIMEOUT_SECS: u64 = 20;

/// Bound on a single connect attempt (ms).
pub const CONNECT_TIMEOUT_MS: u32 = 2_000;

// Supervision

/// Shut down after this many minutes without any pad activity.
pub const IDLE_TIMEOUT_MINS: u64 = 5;

/// Supervisor poll cadence (ms).
pub const POLL_INTERVAL_MS: u64 = 50;

// Indicator / input

/// Blink half-period of the searching indicator (ms): 100 ms on,
/// 100 ms off.
pub const BLINK_PERIOD_MS: u64 = 100;

/// Cancel button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Board selection
//
// Pin assignments per board (LED = presence indicator, button = cancel):
//
//   Nrf52840Dk     → LED1  P0.13 (active low), Button1 P0.11
//   Nrf52840Dongle → LED1  P0.06 (active low), SW1     P1.06
//   E73Module      → external LED P0.13 (active high), button P0.11

/// The board this firmware is built for.
pub const BOARD: Board = Board::Nrf52840Dk;

/// Supported boards. Selection picks LED/button pins and LED polarity
/// in `main.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Board {
    /// Nordic nRF52840-DK (PCA10056).
    Nrf52840Dk,
    /// Nordic nRF52840 dongle (PCA10059).
    Nrf52840Dongle,
    /// Bare E73 module with an external LED wired active high.
    E73Module,
}

impl Board {
    /// Whether the indicator LED is wired active low.
    pub const fn led_active_low(self) -> bool {
        match self {
            Board::Nrf52840Dk | Board::Nrf52840Dongle => true,
            Board::E73Module => false,
        }
    }
}
