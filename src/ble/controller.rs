//! Link controller: the connection state machine and its supervisor.
//!
//! [`PadController`] consumes typed link events from the radio, drives
//! the session through its lifecycle and answers the periodic poll with
//! keep-running / stop. It is pure: time is injected as milliseconds of
//! uptime, hardware sits behind the [`LinkDriver`] / `StatusIndicator` /
//! [`KeySink`] seams, and the only input written from outside the host
//! loop is the [`CancelFlag`].

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config;
use crate::error::LinkError;
use crate::indicator::{IndicatorMode, StatusIndicator};
use crate::keymap::{self, KeyAction, KeyEvent};

use super::adv_parser::decode_name;
use super::session::{ConnectionSession, LinkState};
use super::{LinkEvent, PeerAddress, PeripheralIdentity};

/// Operations the controller issues to the radio.
///
/// Implementations may fail; the controller treats every call as
/// best-effort because the supervisor bounds all waiting.
pub trait LinkDriver {
    fn start_scan(
        &mut self,
        window_us: u32,
        interval_us: u32,
        burst_ms: u32,
    ) -> Result<(), LinkError>;
    fn stop_scan(&mut self) -> Result<(), LinkError>;
    fn connect(&mut self, peer: &PeerAddress) -> Result<(), LinkError>;
    fn disconnect(&mut self) -> Result<(), LinkError>;
    fn set_radio_active(&mut self, active: bool) -> Result<(), LinkError>;
}

/// Consumer of decoded pad inputs.
pub trait KeySink {
    fn on_key(&mut self, event: KeyEvent);
}

// A `&mut` reference to a driver or sink is itself one.

impl<T: LinkDriver> LinkDriver for &mut T {
    fn start_scan(
        &mut self,
        window_us: u32,
        interval_us: u32,
        burst_ms: u32,
    ) -> Result<(), LinkError> {
        (**self).start_scan(window_us, interval_us, burst_ms)
    }
    fn stop_scan(&mut self) -> Result<(), LinkError> {
        (**self).stop_scan()
    }
    fn connect(&mut self, peer: &PeerAddress) -> Result<(), LinkError> {
        (**self).connect(peer)
    }
    fn disconnect(&mut self) -> Result<(), LinkError> {
        (**self).disconnect()
    }
    fn set_radio_active(&mut self, active: bool) -> Result<(), LinkError> {
        (**self).set_radio_active(active)
    }
}

impl<T: KeySink> KeySink for &mut T {
    fn on_key(&mut self, event: KeyEvent) {
        (**self).on_key(event)
    }
}

impl<T: StatusIndicator> StatusIndicator for &mut T {
    fn set_mode(&mut self, mode: IndicatorMode) {
        (**self).set_mode(mode)
    }
}

/// Cancel request flag: set once from a button task or interrupt
/// context, read by the supervisor. Never cleared during a session.
#[derive(Debug)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why the controller stopped. Stopping is a normal terminal path, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// The pad was not found within the scan timeout.
    ScanTimeout,
    /// No pad activity within the idle timeout.
    IdleTimeout,
    /// The user asked to stop.
    Cancelled,
}

impl StopReason {
    /// Human-readable description for shutdown logging.
    pub fn describe(self) -> &'static str {
        match self {
            StopReason::ScanTimeout => "scan timed out before the pad was found",
            StopReason::IdleTimeout => "no pad activity within the idle timeout",
            StopReason::Cancelled => "cancel requested",
        }
    }
}

/// Supervisor timeouts, in milliseconds. `Default` takes the values
/// from [`config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub scan_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            scan_timeout_ms: config::SCAN_TIMEOUT_SECS * 1_000,
            idle_timeout_ms: config::IDLE_TIMEOUT_MINS * 60_000,
        }
    }
}

/// The link controller for one pad.
pub struct PadController<'c, D, I, K> {
    target: PeripheralIdentity,
    timeouts: Timeouts,
    session: ConnectionSession,
    driver: D,
    indicator: I,
    keys: K,
    cancel: &'c CancelFlag,
    stop_reason: Option<StopReason>,
    unknown_keys: u32,
}

impl<'c, D, I, K> PadController<'c, D, I, K>
where
    D: LinkDriver,
    I: StatusIndicator,
    K: KeySink,
{
    pub fn new(
        target: PeripheralIdentity,
        timeouts: Timeouts,
        driver: D,
        indicator: I,
        keys: K,
        cancel: &'c CancelFlag,
    ) -> Self {
        Self {
            target,
            timeouts,
            session: ConnectionSession::new(),
            driver,
            indicator,
            keys,
            cancel,
            stop_reason: None,
            unknown_keys: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.session.state()
    }

    pub fn session(&self) -> &ConnectionSession {
        &self.session
    }

    /// Set once the controller has shut down.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Notifications that rendered to a symbol outside the key table.
    pub fn unknown_keys(&self) -> u32 {
        self.unknown_keys
    }

    /// Open the session and start the first scan burst. Acts only from
    /// [`LinkState::Idle`].
    pub fn start(&mut self, now_ms: u64) {
        if self.session.state() != LinkState::Idle {
            return;
        }
        self.session.open(now_ms);
        self.begin_scan();
    }

    /// Feed one link event into the state machine. Events after
    /// termination are ignored.
    pub fn handle_event(&mut self, event: LinkEvent, now_ms: u64) {
        if self.session.state() == LinkState::Terminated {
            return;
        }
        match event {
            LinkEvent::ScanResult { peer, adv_data } => self.on_scan_result(peer, &adv_data),
            LinkEvent::ScanDone => self.on_scan_done(now_ms),
            LinkEvent::Connected { handle, .. } => self.on_connected(handle, now_ms),
            LinkEvent::Disconnected { .. } => self.on_disconnected(now_ms),
            LinkEvent::Notify { payload, .. } => self.on_notify(&payload, now_ms),
        }
    }

    /// Supervisor tick: `false` means the session is over (the stop
    /// reason records why). Checks run in a fixed order; the cancel flag
    /// comes last so a timeout outranks a simultaneous cancel.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.session.state() {
            LinkState::Terminated => return false,
            // Not started yet: nothing to supervise.
            LinkState::Idle => return true,
            _ => {}
        }
        if self.session.conn_handle().is_none() {
            if let Some(peer) = self.session.take_pending() {
                // Consume-then-clear: a re-entrant poll can never issue
                // a second connect for the same match.
                self.session.set_scanning();
                let _ = self.driver.connect(&peer);
            } else if now_ms.saturating_sub(self.session.scan_started_at())
                >= self.timeouts.scan_timeout_ms
            {
                self.shutdown(StopReason::ScanTimeout);
                return false;
            }
        }
        if now_ms.saturating_sub(self.session.last_activity_at()) >= self.timeouts.idle_timeout_ms {
            self.shutdown(StopReason::IdleTimeout);
            return false;
        }
        if self.cancel.is_requested() {
            self.shutdown(StopReason::Cancelled);
            return false;
        }
        true
    }

    /// Wind the session down. Idempotent; every step is best-effort.
    pub fn shutdown(&mut self, reason: StopReason) {
        if self.session.state() == LinkState::Terminated {
            return;
        }
        let _ = self.driver.stop_scan();
        if self.session.conn_handle().is_some() {
            let _ = self.driver.disconnect();
        }
        self.indicator.set_mode(IndicatorMode::Off);
        let _ = self.driver.set_radio_active(false);
        self.session.terminate();
        self.stop_reason = Some(reason);
    }

    fn begin_scan(&mut self) {
        self.session.set_scanning();
        self.indicator.set_mode(IndicatorMode::Searching);
        let _ = self.driver.start_scan(
            config::SCAN_WINDOW_US,
            config::SCAN_INTERVAL_US,
            config::SCAN_BURST_MS,
        );
    }

    fn on_scan_result(&mut self, peer: PeerAddress, adv_data: &[u8]) {
        // Once a match is latched the state leaves Scanning, so results
        // still in flight after the scan-stop fall through here.
        if self.session.state() != LinkState::Scanning {
            return;
        }
        if !self.target.matches(&peer.bytes) {
            return;
        }
        self.session.capture_target(peer, decode_name(adv_data));
        // The burst may already have wound down on its own.
        let _ = self.driver.stop_scan();
    }

    fn on_scan_done(&mut self, now_ms: u64) {
        if self.session.state() != LinkState::Scanning {
            return;
        }
        let elapsed = now_ms.saturating_sub(self.session.scan_started_at());
        if elapsed < self.timeouts.scan_timeout_ms {
            // The timeout budget spans bursts: restart without touching
            // the origin timestamp.
            self.begin_scan();
        }
    }

    fn on_connected(&mut self, handle: u16, now_ms: u64) {
        if self.session.state() == LinkState::Connected {
            return;
        }
        self.session.established(handle, now_ms);
        self.indicator.set_mode(IndicatorMode::Connected);
    }

    fn on_disconnected(&mut self, now_ms: u64) {
        // A drop of something we never considered established (e.g. a
        // failed connect attempt) changes nothing; the scan-timeout
        // bound covers that path.
        if self.session.state() != LinkState::Connected {
            return;
        }
        self.session.lost(now_ms);
        self.begin_scan();
    }

    fn on_notify(&mut self, payload: &[u8], now_ms: u64) {
        // Every notification is activity, decodable or not.
        self.session.note_activity(now_ms);
        let code = keymap::code_from_payload(payload);
        match KeyAction::from_code(&code) {
            Some(action) => self.keys.on_key(KeyEvent { code, action }),
            None => self.unknown_keys = self.unknown_keys.saturating_add(1),
        }
    }
}
