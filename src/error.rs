//! Error types for padlink.
//!
//! All variants carry only fixed-size data - no `alloc`. `defmt::Format`
//! is derived behind the `defmt` feature so the host test build stays
//! logger-free.

/// Fatal configuration errors, surfaced before the radio starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The configured peer address is not of the `XX:XX:XX:XX:XX:XX` form.
    InvalidAddress,
}

/// Errors a link driver may report back to the controller.
///
/// Every driver call the controller makes is bounded by the supervisor,
/// so these are advisory: scan-stop failures are absorbed outright and
/// the rest degrade to a timeout-driven shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The radio is not active (already stopped or shut down).
    RadioOff,
    /// The request queue to the radio task is full.
    QueueFull,
}
