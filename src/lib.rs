//! Host-testable library surface for padlink.
//!
//! The pure core - advertisement decoding, the key table, the session
//! state machine and the activity supervisor - lives here and runs on
//! the host with `cargo test`. No hardware required.
//!
//! The radio/LED/button tasks and the embedded binary are gated behind
//! the `embedded` cargo feature; `main.rs` pulls everything together on
//! an nRF52840 with the S140 SoftDevice.

#![cfg_attr(not(test), no_std)]

pub mod ble;
pub mod config;
pub mod error;
pub mod indicator;
pub mod keymap;

#[cfg(feature = "embedded")]
pub mod button;
#[cfg(feature = "embedded")]
pub mod led;

pub use ble::controller::{
    CancelFlag, KeySink, LinkDriver, PadController, StopReason, Timeouts,
};
pub use ble::session::{ConnectionSession, LinkState};
pub use ble::{LinkEvent, LinkRequest, PeerAddress, PeripheralIdentity};
pub use indicator::{IndicatorMode, StatusIndicator};
pub use keymap::{KeyAction, KeyEvent, PadButton, StickDir};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - crate surface
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::adv_parser::{decode_name, format_address, parse_address};
    use crate::error::Error;
    use crate::keymap::{code_from_payload, KEY_CODE_MAX};

    // ════════════════════════════════════════════════════════════════════════
    // Advertisement decoding
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn pad_advertisement_decodes_to_its_name() {
        // Flags + complete local name, as the pad actually advertises.
        let adv = [
            0x02, 0x01, 0x06, 0x08, 0x09, b'L', b'O', b'O', b'K', b'B', b'O', b'N',
        ];
        assert_eq!(decode_name(&adv), Some("LOOKBON"));
    }

    #[test]
    fn malformed_advertisements_decode_to_none() {
        assert_eq!(decode_name(&[]), None);
        assert_eq!(decode_name(&[0x00, 0x09, b'X']), None);
        assert_eq!(decode_name(&[0x7F, 0x09, b'X']), None);
        assert_eq!(decode_name(&[0x03, 0x09, 0xC3]), None);
        assert_eq!(decode_name(&[0x02, 0x01, 0x06]), None);
    }

    #[test]
    fn address_format_parse_round_trip() {
        for addr in [
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
            [0xD5, 0x51, 0xFA, 0xB6, 0x09, 0x71],
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB],
        ] {
            let text = format_address(&addr);
            assert_eq!(text.len(), 17);
            assert_eq!(parse_address(&text), Some(addr));
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Target identity
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn identity_parse_is_case_insensitive() {
        let upper = PeripheralIdentity::parse("D5:51:FA:B6:09:71").unwrap();
        let lower = PeripheralIdentity::parse("d5:51:fa:b6:09:71").unwrap();
        assert_eq!(upper, lower);
        assert!(upper.matches(&[0xD5, 0x51, 0xFA, 0xB6, 0x09, 0x71]));
        assert!(!upper.matches(&[0xD5, 0x51, 0xFA, 0xB6, 0x09, 0x72]));
    }

    #[test]
    fn identity_displays_canonically() {
        let id = PeripheralIdentity::parse("d5:51:fa:b6:09:71").unwrap();
        assert_eq!(id.display().as_str(), "D5:51:FA:B6:09:71");
    }

    #[test]
    fn bad_identity_is_a_config_error() {
        assert_eq!(
            PeripheralIdentity::parse("not-an-address"),
            Err(Error::InvalidAddress)
        );
        assert_eq!(PeripheralIdentity::parse(""), Err(Error::InvalidAddress));
    }

    #[test]
    fn configured_target_is_parseable() {
        assert!(PeripheralIdentity::parse(config::TARGET_ADDR).is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Key table
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn every_table_byte_renders_and_resolves() {
        let known: [u8; 30] = [
            0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, // clicks
            0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, // holds
            0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, // releases
            0xD0, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, // stick
        ];
        for byte in known {
            let code = code_from_payload(&[byte]);
            assert!(
                KeyAction::from_code(&code).is_some(),
                "byte {byte:#04X} should be in the table"
            );
        }
    }

    #[test]
    fn bytes_outside_the_table_stay_unknown() {
        for byte in [0x00u8, 0xA0, 0xA8, 0xD9, 0xE1, 0xFF] {
            let code = code_from_payload(&[byte]);
            assert!(KeyAction::from_code(&code).is_none());
        }
    }

    #[test]
    fn stick_and_click_decode_to_their_actions() {
        assert_eq!(
            KeyAction::from_code("D1"),
            Some(KeyAction::Stick(StickDir::Up))
        );
        assert_eq!(
            KeyAction::from_code("A1"),
            Some(KeyAction::Click(PadButton::Menu))
        );
    }

    #[test]
    fn rendered_code_never_exceeds_its_capacity() {
        let long = [0xAAu8; 16];
        assert_eq!(code_from_payload(&long).len(), KEY_CODE_MAX);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Supervisor plumbing
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn cancel_flag_latches() {
        let flag = CancelFlag::new();
        assert!(!flag.is_requested());
        flag.request();
        assert!(flag.is_requested());
        flag.request();
        assert!(flag.is_requested());
    }

    #[test]
    fn default_timeouts_come_from_config() {
        let t = Timeouts::default();
        assert_eq!(t.scan_timeout_ms, config::SCAN_TIMEOUT_SECS * 1_000);
        assert_eq!(t.idle_timeout_ms, config::IDLE_TIMEOUT_MINS * 60_000);
    }

    #[test]
    fn stop_reasons_describe_themselves() {
        let reasons = [
            StopReason::ScanTimeout,
            StopReason::IdleTimeout,
            StopReason::Cancelled,
        ];
        for r in reasons {
            assert!(!r.describe().is_empty());
        }
        assert_ne!(
            StopReason::ScanTimeout.describe(),
            StopReason::IdleTimeout.describe()
        );
    }

    #[test]
    fn fresh_session_is_idle() {
        let s = ConnectionSession::new();
        assert_eq!(s.state(), LinkState::Idle);
        assert!(s.conn_handle().is_none());
    }
}
