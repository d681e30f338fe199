//! Tests for `format` module

use super::format::*;
use std::io;
use std::path::Path;

fn decode_all(bytes: &[u8]) -> io::Result<u32> {
    let mut iter = bytes.iter().copied();
    decode_vint(|| {
        iter.next()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    })
}

#[test]
fn test_vint_single_byte_values() {
    let mut out = Vec::new();
    encode_vint(0, &mut out);
    encode_vint(127, &mut out);
    assert_eq!(out, vec![0x00, 0x7F]);
}

#[test]
fn test_vint_multi_byte_boundaries() {
    for value in [128u32, 16_383, 16_384, 2_097_151, u32::MAX] {
        let mut out = Vec::new();
        encode_vint(value, &mut out);
        assert_eq!(decode_all(&out).expect("decode"), value, "value {value}");
    }
}

#[test]
fn test_vint_128_layout() {
    let mut out = Vec::new();
    encode_vint(128, &mut out);
    assert_eq!(out, vec![0x80, 0x01]);
}

#[test]
fn test_vint_truncated_is_eof() {
    let err = decode_all(&[0x80]).expect_err("truncated");
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_vint_overflow_rejected() {
    let err = decode_all(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).expect_err("overflow");
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn test_write_string_reports_length() {
    let mut out = Vec::new();
    let written = write_string(&mut out, "héllo").expect("write");
    // 'é' is two bytes in UTF-8
    assert_eq!(written, 7);
    assert_eq!(out[0], 6);
    assert_eq!(&out[1..], "héllo".as_bytes());
}

#[test]
fn test_offset_index_path_appends_suffix() {
    assert_eq!(
        offset_index_path(Path::new("/data/termvectors.bin")),
        Path::new("/data/termvectors.bin.map")
    );
    assert_eq!(
        offset_index_path(Path::new("docvectors")),
        Path::new("docvectors.map")
    );
}

#[test]
fn test_escape_identifier() {
    assert_eq!(escape_identifier("plain"), "plain");
    assert_eq!(escape_identifier("a|b|c"), "a;b;c");
    assert!(matches!(
        escape_identifier("plain"),
        std::borrow::Cow::Borrowed(_)
    ));
}

#[test]
fn test_store_format_from_path() {
    assert_eq!(StoreFormat::from_path(Path::new("terms.txt")), StoreFormat::Text);
    assert_eq!(StoreFormat::from_path(Path::new("terms.TXT")), StoreFormat::Text);
    assert_eq!(StoreFormat::from_path(Path::new("terms.bin")), StoreFormat::Binary);
    assert_eq!(StoreFormat::from_path(Path::new("terms")), StoreFormat::Binary);
}

#[test]
fn test_store_format_parse() {
    assert_eq!("TEXT".parse::<StoreFormat>(), Ok(StoreFormat::Text));
    assert_eq!("bin".parse::<StoreFormat>(), Ok(StoreFormat::Binary));
    assert!("lucene".parse::<StoreFormat>().is_err());
}
