//! Command ids and payload decoding.
//!
//! Every command payload starts with a 4-byte correlation token the host
//! uses to pair its request with the device's completion. The token is a
//! liveness and ordering aid, not a security primitive.

/// Bring up the terminal surface and print the banner.
pub const CMD_TERMINAL_START: u16 = 0x0010;

/// One keyboard event from the host, packed in a 32-bit word.
pub const CMD_TERMINAL_KEYSTROKE: u16 = 0x0011;

/// Correlation token size in bytes at the start of every payload.
pub const TOKEN_SIZE: usize = 4;

const KEY_MASK: u32 = 0x0000_00FF;
const SHIFT_MASK: u32 = 0x0000_FF00;
const SHIFT_SHIFT: u32 = 8;
const SCAN_MASK: u32 = 0x00FF_0000;
const SCAN_SHIFT: u32 = 16;

/// Extract the correlation token from a payload.
///
/// Returns `None` when the payload is too short to carry one.
pub fn correlation_token(payload: &[u8]) -> Option<u32> {
    let bytes: [u8; TOKEN_SIZE] = payload.get(..TOKEN_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Read the nth 32-bit parameter following the correlation token.
pub fn param_u32(payload: &[u8], index: usize) -> Option<u32> {
    let start = TOKEN_SIZE + index * 4;
    let bytes: [u8; 4] = payload.get(start..start + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// A decoded keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keystroke {
    /// ASCII code of the key
    pub ascii: u8,
    /// Shift key held during the stroke
    pub shift: bool,
    /// Raw keyboard scan code
    pub scan_code: u8,
}

impl Keystroke {
    /// Unpack a keystroke from its 32-bit wire word.
    pub fn from_word(word: u32) -> Self {
        Self {
            ascii: (word & KEY_MASK) as u8,
            shift: (word & SHIFT_MASK) >> SHIFT_SHIFT != 0,
            scan_code: ((word & SCAN_MASK) >> SCAN_SHIFT) as u8,
        }
    }

    /// True for keys that render as visible text.
    pub fn is_printable(&self) -> bool {
        (0x20..=0x7E).contains(&self.ascii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_token_little_endian() {
        let payload = [0x78, 0x56, 0x34, 0x12, 0xAA];
        assert_eq!(correlation_token(&payload), Some(0x1234_5678));
        assert_eq!(correlation_token(&payload[..3]), None);
    }

    #[test]
    fn test_param_after_token() {
        let payload = [0, 0, 0, 0, 0x0D, 0x00, 0x01, 0x00];
        assert_eq!(param_u32(&payload, 0), Some(0x0001_000D));
        assert_eq!(param_u32(&payload, 1), None);
    }

    #[test]
    fn test_keystroke_unpack() {
        let key = Keystroke::from_word(0x0039_0141);
        assert_eq!(key.ascii, 0x41);
        assert!(key.shift);
        assert_eq!(key.scan_code, 0x39);
        assert!(key.is_printable());

        let enter = Keystroke::from_word(0x001C_000D);
        assert_eq!(enter.ascii, 0x0D);
        assert!(!enter.shift);
        assert!(!enter.is_printable());
    }
}
