//! Pad key codes and their semantic actions.
//!
//! The pad notifies one raw byte per input. Rendered as uppercase hex
//! it forms a two-character code: a class letter plus an index digit.
//!
//! - `A1`-`A7`: click of a button
//! - `B1`-`B7`: button crossed the hold threshold
//! - `C1`-`C7`: a held button was released
//! - `D0`-`D8`: stick position (`D0` = centered)
//!
//! Anything outside this table is an unknown input and is counted but
//! never delivered to the consumer.

use core::fmt::Write;

use heapless::String;

use crate::ble::NOTIFY_DATA_MAX;

/// Longest key symbol we render (two hex chars per retained byte).
pub const KEY_CODE_MAX: usize = NOTIFY_DATA_MAX * 2;

/// Uppercase-hex rendering of a notification payload.
pub type KeyCode = String<KEY_CODE_MAX>;

/// Physical buttons on the pad, in table-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadButton {
    /// The `@` menu button.
    Menu,
    A,
    B,
    C,
    D,
    /// Lower side (shoulder) button.
    LowerSide,
    /// Upper side (shoulder) button.
    UpperSide,
}

impl PadButton {
    fn from_index(digit: u8) -> Option<Self> {
        Some(match digit {
            b'1' => PadButton::Menu,
            b'2' => PadButton::A,
            b'3' => PadButton::B,
            b'4' => PadButton::C,
            b'5' => PadButton::D,
            b'6' => PadButton::LowerSide,
            b'7' => PadButton::UpperSide,
            _ => return None,
        })
    }
}

/// Stick positions reported by the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StickDir {
    Center,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    DownLeft,
    UpRight,
    DownRight,
}

impl StickDir {
    fn from_index(digit: u8) -> Option<Self> {
        Some(match digit {
            b'0' => StickDir::Center,
            b'1' => StickDir::Up,
            b'2' => StickDir::Down,
            b'3' => StickDir::Left,
            b'4' => StickDir::Right,
            b'5' => StickDir::UpLeft,
            b'6' => StickDir::DownLeft,
            b'7' => StickDir::UpRight,
            b'8' => StickDir::DownRight,
            _ => return None,
        })
    }
}

/// Semantic action encoded by a key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Short press and release.
    Click(PadButton),
    /// Press crossed the hold threshold.
    Hold(PadButton),
    /// A held button was let go.
    Release(PadButton),
    /// The stick moved to (or back from) a position.
    Stick(StickDir),
}

impl KeyAction {
    /// Decode a two-character key code; codes outside the table get `None`.
    /// Codes are uppercase only, matching the hex rendering of payloads.
    pub fn from_code(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        match bytes[0] {
            b'A' => PadButton::from_index(bytes[1]).map(KeyAction::Click),
            b'B' => PadButton::from_index(bytes[1]).map(KeyAction::Hold),
            b'C' => PadButton::from_index(bytes[1]).map(KeyAction::Release),
            b'D' => StickDir::from_index(bytes[1]).map(KeyAction::Stick),
            _ => None,
        }
    }
}

/// Render a notification payload as its uppercase-hex key symbol.
/// Bytes beyond [`NOTIFY_DATA_MAX`] are dropped; they could never form
/// a two-character code anyway.
pub fn code_from_payload(payload: &[u8]) -> KeyCode {
    let mut code = KeyCode::new();
    for b in payload.iter().take(NOTIFY_DATA_MAX) {
        let _ = write!(code, "{:02X}", b);
    }
    code
}

/// One decoded pad input, as delivered to the key consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    /// Uppercase-hex symbol of the raw payload.
    pub code: KeyCode,
    /// Decoded action (always valid: unknown symbols are never delivered).
    pub action: KeyAction,
}
