//! Integration tests for charset detection and the byte decoder.

use std::io::{self, Read};

use gleaner_markup::decoder::{
    ByteDecoder, ByteSource, Encoding, declared_encoding, detect_bytes, detect_encoding,
    detect_in_window, probe_ascii,
};
use gleaner_markup::{FaultKind, IssueKind, ParseError, ParseOptions, parse_bytes};

/// Helper to decode a whole buffer leniently
fn decode(bytes: &[u8], encoding: Encoding) -> String {
    let mut decoder = ByteDecoder::new(bytes, encoding).unwrap();
    let mut out = String::new();
    while let Some(c) = decoder.decode().unwrap() {
        out.push(c);
    }
    out
}

#[test]
fn test_detects_utf8_content() {
    assert_eq!(detect_bytes("<p>naïve café</p>".as_bytes()), Encoding::Utf8);
}

#[test]
fn test_seven_bit_is_ascii() {
    assert_eq!(detect_bytes(b"<p>plain\r\n\ttext</p>"), Encoding::Ascii);
    assert_eq!(detect_bytes(b""), Encoding::Ascii);
}

#[test]
fn test_declared_latin1_beats_utf8_probe() {
    let page = "<meta charset=ISO-8859-1><p>café</p>".as_bytes();
    assert_eq!(detect_bytes(page), Encoding::Latin1);
    assert_eq!(decode(page, Encoding::Latin1), "<meta charset=ISO-8859-1><p>cafÃ©</p>");
}

#[test]
fn test_declaration_outside_window_ignored() {
    let mut page = vec![b' '; 64];
    page.extend_from_slice(b"<meta charset=iso-8859-1><p>caf\xE9</p>");

    let wide = parse_bytes(&page, &ParseOptions::html()).unwrap();
    assert_eq!(wide.encoding, Encoding::Latin1);

    let narrow = parse_bytes(&page, &ParseOptions::html().with_lookahead_window(16)).unwrap();
    assert_eq!(narrow.encoding, Encoding::Ascii);
}

#[test]
fn test_declared_utf8_rejected_by_probe() {
    // 0xE9 alone is not UTF-8, so the declaration is ignored
    let page = b"<meta charset=utf-8><p>caf\xE9 ok</p>";
    assert_eq!(declared_encoding(page), Some(Encoding::Utf8));
    assert_eq!(detect_bytes(page), Encoding::Ascii);
}

#[test]
fn test_declared_windows_1252_probe() {
    let good = b"<?xml encoding=\"windows-1252\"?><a>\x93quoted\x94</a>";
    assert_eq!(detect_bytes(good), Encoding::Windows1252);
    let bad = b"<?xml encoding=\"windows-1252\"?><a>\x81</a>";
    assert_ne!(detect_bytes(bad), Encoding::Windows1252);
}

#[test]
fn test_bom_wins() {
    assert_eq!(detect_bytes(b"\xEF\xBB\xBF<p>x</p>"), Encoding::Utf8);
}

#[test]
fn test_ascii_probe_bands() {
    assert!(probe_ascii(b"abc\t\n\r"));
    assert!(probe_ascii(b"caf\xE9"));
    assert!(!probe_ascii(b"\x85"));
    assert!(!probe_ascii(b"\x01"));
}

#[test]
fn test_window_cut_inside_sequence() {
    let mut bytes = "<p>é".as_bytes().to_vec();
    bytes.push(0xE2);
    assert_eq!(detect_in_window(&bytes, false), Encoding::Utf8);
    assert_eq!(detect_in_window(&bytes, true), Encoding::Ascii);
}

#[test]
fn test_detection_does_not_consume() {
    let mut source = ByteSource::new(&b"<a>hi</a>"[..]);
    let encoding = detect_encoding(&mut source, 1024).unwrap();
    assert_eq!(encoding, Encoding::Ascii);
    assert_eq!(source.position(), 0);
    assert_eq!(source.next_byte().unwrap(), Some(b'<'));
}

#[test]
fn test_windows_1252_remap_and_drop() {
    assert_eq!(decode(b"\x80 \x81x \x9F", Encoding::Windows1252), "€ x Ÿ");
}

#[test]
fn test_mac_roman_remap() {
    assert_eq!(decode(b"caf\x8E \xF0", Encoding::MacRoman), "café ");
}

#[test]
fn test_raw_and_latin1_identity() {
    assert_eq!(decode(b"\xE9\xFF", Encoding::Raw), "éÿ");
    assert_eq!(decode(b"\xE9\xFF", Encoding::Latin1), "éÿ");
}

#[test]
fn test_lenient_substitution_consumes_one_byte() {
    let mut decoder = ByteDecoder::new(&b"a\xC3(b"[..], Encoding::Utf8).unwrap();
    let mut out = String::new();
    while let Some(c) = decoder.decode().unwrap() {
        out.push(c);
    }
    assert_eq!(out, "a?(b");
    assert_eq!(decoder.substitution_count(), 1);
    let issues = decoder.take_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::EncodingSubstitution);
    assert_eq!(issues[0].position, 1);
}

#[test]
fn test_lenient_private_use_substituted() {
    assert_eq!(decode("a\u{E000}b".as_bytes(), Encoding::Utf8), "a?b");
}

#[test]
fn test_strict_fault() {
    let mut decoder = ByteDecoder::new(&b"ok\xFF"[..], Encoding::Utf8)
        .unwrap()
        .with_strict(true);
    assert_eq!(decoder.decode().unwrap(), Some('o'));
    assert_eq!(decoder.decode().unwrap(), Some('k'));
    match decoder.decode() {
        Err(ParseError::Encoding(fault)) => {
            assert_eq!(fault.encoding, Encoding::Utf8);
            assert_eq!(fault.position, 2);
            assert_eq!(fault.kind, FaultKind::MalformedSequence);
        }
        other => panic!("Expected encoding fault, got {other:?}"),
    }
}

#[test]
fn test_strict_ascii_rejects_c1_bytes() {
    let mut decoder = ByteDecoder::new(&b"\x85"[..], Encoding::Ascii)
        .unwrap()
        .with_strict(true);
    assert!(matches!(
        decoder.decode(),
        Err(ParseError::Encoding(fault)) if fault.kind == FaultKind::NonAsciiByte(0x85)
    ));
}

#[test]
fn test_ascii_decodes_latin1_range() {
    let page = b"<p>caf\xe9 na\xefve</p>";
    assert_eq!(detect_bytes(page), Encoding::Ascii);
    assert_eq!(decode(page, Encoding::Ascii), "<p>café naïve</p>");

    let mut strict = ByteDecoder::new(&b"\xA0\xFF"[..], Encoding::Ascii)
        .unwrap()
        .with_strict(true);
    assert_eq!(strict.decode().unwrap(), Some('\u{A0}'));
    assert_eq!(strict.decode().unwrap(), Some('ÿ'));
    assert_eq!(strict.decode().unwrap(), None);
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("connection reset"))
    }
}

#[test]
fn test_io_error_propagates() {
    // the byte-order-mark check only reads for UTF-8
    let mut decoder = ByteDecoder::new(FailingReader, Encoding::Ascii).unwrap();
    assert!(matches!(decoder.decode(), Err(ParseError::Io(_))));
}
