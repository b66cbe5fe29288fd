//! Presence indicator model.
//!
//! The LED task owns the hardware; the controller only ever publishes a
//! mode. Publishing a new mode replaces the previous one outright, so a
//! blink cycle can never outlive the state that started it.

/// What the presence LED should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorMode {
    /// Dark: no session, or the session is over.
    Off,
    /// Blinking: scanning / waiting for the pad.
    Searching,
    /// Steady on: link established.
    Connected,
}

/// Sink for indicator mode changes.
pub trait StatusIndicator {
    fn set_mode(&mut self, mode: IndicatorMode);
}
