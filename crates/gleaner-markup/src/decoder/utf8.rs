//! UTF-8 sequence decoding shared by the probe and the decoder.
//!
//! Accepts the historic 5- and 6-byte forms structurally; they always name
//! values above U+10FFFF and so come back as `Malformed`.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Longest sequence the lead-byte table allows.
pub(crate) const MAX_SEQUENCE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Utf8Step {
    /// A scalar value and the number of bytes it used.
    Char(char, usize),
    /// Invalid lead or continuation byte, overlong form, or not a scalar value.
    Malformed,
    /// The slice ends inside a sequence whose bytes so far are valid.
    Truncated,
}

const fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        0xF8..=0xFB => Some(5),
        0xFC..=0xFD => Some(6),
        _ => None,
    }
}

const MIN_VALUE: [u32; 7] = [0, 0, 0x80, 0x800, 0x1_0000, 0x20_0000, 0x400_0000];

/// Decode the sequence at the start of `bytes`. `bytes` must not be empty.
pub(crate) fn decode_sequence(bytes: &[u8]) -> Utf8Step {
    let Some(&lead) = bytes.first() else {
        return Utf8Step::Truncated;
    };
    let Some(len) = sequence_len(lead) else {
        return Utf8Step::Malformed;
    };
    if len == 1 {
        return Utf8Step::Char(char::from(lead), 1);
    }
    let lead_bits = u32::from(lead) & (0x7F >> len);
    let mut value = lead_bits;
    for i in 1..len {
        let Some(&byte) = bytes.get(i) else {
            return Utf8Step::Truncated;
        };
        if byte & 0xC0 != 0x80 {
            return Utf8Step::Malformed;
        }
        value = (value << 6) | u32::from(byte & 0x3F);
    }
    if value < MIN_VALUE[len] {
        return Utf8Step::Malformed;
    }
    char::from_u32(value).map_or(Utf8Step::Malformed, |c| Utf8Step::Char(c, len))
}

/// Unassigned and private-use code points count as undecodable.
pub(crate) fn is_unassigned(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::Unassigned | GeneralCategory::PrivateUse
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_multibyte() {
        assert_eq!(decode_sequence("é".as_bytes()), Utf8Step::Char('é', 2));
        assert_eq!(decode_sequence("€x".as_bytes()), Utf8Step::Char('€', 3));
        assert_eq!(decode_sequence("😀".as_bytes()), Utf8Step::Char('😀', 4));
    }

    #[test]
    fn test_rejects_bad_sequences() {
        assert_eq!(decode_sequence(&[0xFF]), Utf8Step::Malformed);
        assert_eq!(decode_sequence(&[0xC3, 0x28]), Utf8Step::Malformed);
        // overlong '/'
        assert_eq!(decode_sequence(&[0xC0, 0xAF]), Utf8Step::Malformed);
        // surrogate
        assert_eq!(decode_sequence(&[0xED, 0xA0, 0x80]), Utf8Step::Malformed);
        assert_eq!(
            decode_sequence(&[0xF8, 0x88, 0x80, 0x80, 0x80]),
            Utf8Step::Malformed
        );
    }

    #[test]
    fn test_truncated_tail() {
        assert_eq!(decode_sequence(&[0xE2, 0x82]), Utf8Step::Truncated);
    }

    #[test]
    fn test_unassigned() {
        assert!(is_unassigned('\u{E000}'));
        assert!(is_unassigned('\u{0378}'));
        assert!(!is_unassigned('a'));
    }
}
