//! Bluetooth Low Energy link layer.
//!
//! Drives the Nordic SoftDevice S140 in **Central** role against one
//! known gamepad peripheral:
//!
//! 1. **Advertisement decoding** - pulls the local name out of raw
//!    advertising payloads and formats/parses addresses.
//! 2. **Session + controller** - the connection state machine and the
//!    activity/timeout supervisor, pure and host-testable.
//! 3. **Radio task** (`embedded` feature) - owns the SoftDevice, executes
//!    link requests and publishes link events.
//!
//! The radio never mutates shared state from its callbacks: everything
//! crosses to the host loop as a [`LinkEvent`] through a bounded channel.

pub mod adv_parser;
pub mod controller;
pub mod session;

#[cfg(feature = "embedded")]
pub mod radio;

use heapless::{String, Vec};

/// Longest advertising payload we retain (legacy advertising PDU).
pub const ADV_DATA_MAX: usize = 31;

/// Longest notification payload we retain. The pad's key codes are a
/// single byte; anything longer than this cannot name a key anyway.
pub const NOTIFY_DATA_MAX: usize = 4;

/// Longest peer name we retain from an advertisement.
pub const DEVICE_NAME_MAX: usize = 32;

/// A peer address as seen on air: the raw address-kind octet from the
/// advertiser plus six address bytes. The kind is carried opaquely from
/// scan result to connect request; only the bytes are ever compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress {
    /// Address kind octet (public / random static / ...).
    pub kind: u8,
    /// Address bytes in over-the-air order.
    pub bytes: [u8; 6],
}

/// Requests the controller sends down to the radio task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkRequest {
    /// Begin a scan burst with the given window/interval/duration.
    StartScan {
        window_us: u32,
        interval_us: u32,
        burst_ms: u32,
    },
    /// Cancel an in-progress scan.
    StopScan,
    /// Attempt a connection to the given peer.
    Connect(PeerAddress),
    /// Drop the active connection.
    Disconnect,
    /// Power the radio up or down. `false` is terminal for this session.
    SetRadioActive(bool),
}

/// Events the radio publishes for the host loop.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// An advertisement was received during scanning.
    ScanResult {
        peer: PeerAddress,
        adv_data: Vec<u8, ADV_DATA_MAX>,
    },
    /// The current scan burst ended without being interrupted.
    ScanDone,
    /// A connection is established and the key characteristic is live.
    Connected { handle: u16, peer: PeerAddress },
    /// The connection dropped (peer-initiated or supervision timeout).
    Disconnected { handle: u16, peer: PeerAddress },
    /// The pad notified a key payload.
    Notify {
        handle: u16,
        payload: Vec<u8, NOTIFY_DATA_MAX>,
    },
}

/// The six-byte identity of the pad this firmware pairs with, parsed
/// once at startup from its configured textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralIdentity {
    bytes: [u8; 6],
}

impl PeripheralIdentity {
    /// Parses `XX:XX:XX:XX:XX:XX` (either case). Fails with
    /// [`crate::error::Error::InvalidAddress`] on anything else.
    pub fn parse(text: &str) -> Result<Self, crate::error::Error> {
        adv_parser::parse_address(text)
            .map(|bytes| Self { bytes })
            .ok_or(crate::error::Error::InvalidAddress)
    }

    /// Byte-wise match against a scanned address.
    pub fn matches(&self, candidate: &[u8; 6]) -> bool {
        self.bytes == *candidate
    }

    /// Canonical `AA:BB:CC:DD:EE:FF` rendering.
    pub fn display(&self) -> String<17> {
        adv_parser::format_address(&self.bytes)
    }
}
