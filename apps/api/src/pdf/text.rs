//! Text neutralization for PDF string operands.
//!
//! Base-14 fonts with WinAnsiEncoding can only show CP1252 characters. Input is
//! NFC-normalized first so decomposed accents (e + U+0301) collapse into their
//! Latin-1 form; anything still outside the code page becomes `?`. The bytes
//! are emitted as a hexadecimal string, so no input can close the operand.

use lopdf::{Object, StringFormat};
use unicode_normalization::UnicodeNormalization;

/// CP1252 assignments in 0x80..=0x9F.
const CP1252_EXTRAS: &[(char, u8)] = &[
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => CP1252_EXTRAS
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, byte)| *byte),
    }
}

/// Maps `text` to WinAnsi bytes. Tabs become spaces and other control
/// characters are dropped.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.nfc()
        .filter_map(|c| match c {
            '\t' => Some(b' '),
            c if c.is_control() => None,
            c => Some(win_ansi_byte(c).unwrap_or(b'?')),
        })
        .collect()
}

/// A hexadecimal string operand for `Tj`.
pub fn text_operand(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(encode_win_ansi("Jean Dupont"), b"Jean Dupont".to_vec());
    }

    #[test]
    fn test_latin1_accents_map_to_single_bytes() {
        assert_eq!(encode_win_ansi("Été"), vec![0xC9, b't', 0xE9]);
    }

    #[test]
    fn test_decomposed_accents_are_composed_first() {
        // "e" + COMBINING ACUTE ACCENT
        assert_eq!(encode_win_ansi("e\u{0301}"), vec![0xE9]);
    }

    #[test]
    fn test_cp1252_extras() {
        assert_eq!(encode_win_ansi("\u{2022} \u{20AC}\u{2014}"), vec![0x95, b' ', 0x80, 0x97]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("🚀 go"), b"? go".to_vec());
    }

    #[test]
    fn test_control_characters_dropped_and_tabs_spaced() {
        assert_eq!(encode_win_ansi("a\u{0}b\r\nc\td"), b"abc d".to_vec());
    }

    #[test]
    fn test_operand_is_hexadecimal() {
        match text_operand(") Tj (x") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, b") Tj (x".to_vec())
            }
            other => panic!("unexpected operand {other:?}"),
        }
    }
}
