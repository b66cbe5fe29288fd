use core::fmt::Write;

use heapless::String;

/// AD type of the Complete Local Name record.
const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// Extract the Complete Local Name from raw advertising data.
///
/// Walks the `(len, type, data...)` records and returns the payload of
/// the first name record as UTF-8. Returns `None` when no name record
/// exists, when a length field would overrun the buffer, when a zero
/// length terminates the walk early, or when the name bytes are not
/// valid UTF-8. Never reads out of bounds.
pub fn decode_name(adv_data: &[u8]) -> Option<&str> {
    let mut i = 0;
    while i + 1 < adv_data.len() {
        let len = adv_data[i] as usize;
        if len == 0 {
            return None;
        }
        let end = i + 1 + len;
        if end > adv_data.len() {
            // Length field claims more bytes than the buffer holds.
            return None;
        }
        if adv_data[i + 1] == AD_TYPE_COMPLETE_LOCAL_NAME {
            return core::str::from_utf8(&adv_data[i + 2..end]).ok();
        }
        i = end;
    }
    None
}

/// Render a six-byte address as `AA:BB:CC:DD:EE:FF`.
pub fn format_address(bytes: &[u8; 6]) -> String<17> {
    let mut out = String::new();
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = write!(out, "{:02X}", b);
    }
    out
}

/// Parse `XX:XX:XX:XX:XX:XX` (either case) back into address bytes.
/// Inverse of [`format_address`].
pub fn parse_address(text: &str) -> Option<[u8; 6]> {
    let mut bytes = [0u8; 6];
    let mut parts = text.split(':');
    for slot in bytes.iter_mut() {
        *slot = hex_octet(parts.next()?)?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(bytes)
}

fn hex_octet(part: &str) -> Option<u8> {
    // from_str_radix alone would admit a sign character.
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(part, 16).ok()
}
