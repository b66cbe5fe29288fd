//! Connection session state.
//!
//! [`ConnectionSession`] is the single mutable record of the link's
//! lifecycle. All mutation goes through the semantic methods below, each
//! of which preserves the central invariant: the connection handle is
//! `Some` exactly in [`LinkState::Connected`].

use heapless::String;

use super::{PeerAddress, DEVICE_NAME_MAX};

/// Lifecycle of the link to the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Created, not started.
    Idle,
    /// Scanning for the pad (also while a connect attempt is in flight,
    /// pending its confirmation event).
    Scanning,
    /// A matching advertisement was latched; the connect request has not
    /// been issued yet.
    PendingConnect,
    /// Link established, notifications flowing.
    Connected,
    /// Momentary state while a drop is being processed.
    Disconnected,
    /// Terminal. Events are ignored, polls report stop.
    Terminated,
}

/// Mutable session state for the one link this firmware manages.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSession {
    state: LinkState,
    conn_handle: Option<u16>,
    pending_target: Option<PeerAddress>,
    device_name: Option<String<DEVICE_NAME_MAX>>,
    scan_started_at: u64,
    last_activity_at: u64,
}

impl Default for LinkState {
    fn default() -> Self {
        LinkState::Idle
    }
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn conn_handle(&self) -> Option<u16> {
        self.conn_handle
    }

    pub fn pending_target(&self) -> Option<&PeerAddress> {
        self.pending_target.as_ref()
    }

    /// Name from the pad's advertisement, if it carried one.
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn scan_started_at(&self) -> u64 {
        self.scan_started_at
    }

    pub fn last_activity_at(&self) -> u64 {
        self.last_activity_at
    }

    /// Open the session: fresh scan budget, connection counts down from now.
    pub(crate) fn open(&mut self, now_ms: u64) {
        self.scan_started_at = now_ms;
        self.last_activity_at = now_ms;
        self.state = LinkState::Scanning;
    }

    pub(crate) fn set_scanning(&mut self) {
        self.state = LinkState::Scanning;
    }

    /// Latch the matched peer; further scan results are ignored until the
    /// latch is consumed.
    pub(crate) fn capture_target(&mut self, peer: PeerAddress, name: Option<&str>) {
        self.device_name = name.map(bounded_name);
        self.pending_target = Some(peer);
        self.state = LinkState::PendingConnect;
    }

    /// Consume the latched peer. At most one caller ever receives it.
    pub(crate) fn take_pending(&mut self) -> Option<PeerAddress> {
        self.pending_target.take()
    }

    /// Record an established link.
    pub(crate) fn established(&mut self, handle: u16, now_ms: u64) {
        self.conn_handle = Some(handle);
        self.pending_target = None;
        // Establishment counts as activity: a stale pre-connection stamp
        // must not fire an immediate idle timeout.
        self.last_activity_at = now_ms;
        self.state = LinkState::Connected;
    }

    /// Record a dropped link and reset the scan budget for re-discovery.
    pub(crate) fn lost(&mut self, now_ms: u64) {
        self.state = LinkState::Disconnected;
        self.conn_handle = None;
        self.pending_target = None;
        self.device_name = None;
        self.scan_started_at = now_ms;
    }

    pub(crate) fn note_activity(&mut self, now_ms: u64) {
        self.last_activity_at = now_ms;
    }

    /// Enter the terminal state. Clears everything link-related.
    pub(crate) fn terminate(&mut self) {
        self.conn_handle = None;
        self.pending_target = None;
        self.device_name = None;
        self.state = LinkState::Terminated;
    }
}

fn bounded_name(name: &str) -> String<DEVICE_NAME_MAX> {
    let mut out = String::new();
    for ch in name.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
