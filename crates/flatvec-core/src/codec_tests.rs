//! Tests for `codec` and `vector` modules.

use super::codec::{BigEndianCodec, VectorCodec};
use super::vector::{Vector, VectorType};

// -------------------------------------------------------------------------
// Record sizes
// -------------------------------------------------------------------------

#[test]
fn test_record_byte_size_per_type() {
    let codec = BigEndianCodec;
    assert_eq!(codec.record_byte_size(VectorType::Real, 200).unwrap(), 800);
    assert_eq!(codec.record_byte_size(VectorType::Complex, 200).unwrap(), 1600);
    assert_eq!(codec.record_byte_size(VectorType::Binary, 4096).unwrap(), 512);
}

#[test]
fn test_record_byte_size_rejects_bad_shapes() {
    let codec = BigEndianCodec;
    assert!(codec.record_byte_size(VectorType::Real, 0).is_err());
    assert!(codec.record_byte_size(VectorType::Binary, 100).is_err());
}

// -------------------------------------------------------------------------
// Binary records
// -------------------------------------------------------------------------

#[test]
fn test_encode_real_is_big_endian() {
    let mut out = Vec::new();
    BigEndianCodec
        .encode(&Vector::Real(vec![1.0]), &mut out)
        .unwrap();
    assert_eq!(out, 1.0f32.to_be_bytes().to_vec());
}

#[test]
fn test_encode_length_matches_record_size() {
    let codec = BigEndianCodec;
    for vector in [
        Vector::Real(vec![0.5; 7]),
        Vector::complex(vec![0.5; 14]).unwrap(),
        Vector::Binary(vec![u64::MAX, 3]),
    ] {
        let mut out = Vec::new();
        codec.encode(&vector, &mut out).unwrap();
        let expected = codec
            .record_byte_size(vector.vector_type(), vector.dimension())
            .unwrap();
        assert_eq!(out.len(), expected, "{:?}", vector.vector_type());
        let decoded = codec
            .decode(vector.vector_type(), vector.dimension(), &out)
            .unwrap();
        assert_eq!(decoded, vector);
    }
}

#[test]
fn test_decode_rejects_short_record() {
    let err = BigEndianCodec
        .decode(VectorType::Real, 4, &[0u8; 12])
        .expect_err("short record");
    assert_eq!(err.code(), "FLATVEC-009");
}

#[test]
fn test_special_float_values_survive() {
    let codec = BigEndianCodec;
    let vector = Vector::Real(vec![f32::INFINITY, f32::NEG_INFINITY, -0.0, f32::MIN_POSITIVE]);
    let mut out = Vec::new();
    codec.encode(&vector, &mut out).unwrap();
    let decoded = codec.decode(VectorType::Real, 4, &out).unwrap();
    let values = decoded.as_real().unwrap();
    assert!(values[0].is_infinite() && values[0].is_sign_positive());
    assert!(values[1].is_infinite() && values[1].is_sign_negative());
    assert!(values[2] == 0.0 && values[2].is_sign_negative());
    assert_eq!(values[3], f32::MIN_POSITIVE);
}

// -------------------------------------------------------------------------
// Text rendering
// -------------------------------------------------------------------------

#[test]
fn test_text_real_has_no_delimiter() {
    let text = BigEndianCodec.encode_text(&Vector::Real(vec![0.25, -1.5, 3.0]));
    assert_eq!(text, "0.25 -1.5 3");
    assert!(!text.contains('|'));
}

#[test]
fn test_text_real_parses_back() {
    let codec = BigEndianCodec;
    let vector = Vector::Real(vec![0.1, 0.2, 0.3]);
    let text = codec.encode_text(&vector);
    assert_eq!(codec.decode_text(VectorType::Real, 3, &text).unwrap(), vector);
}

#[test]
fn test_text_binary_bit_order() {
    let codec = BigEndianCodec;
    let vector = Vector::Binary(vec![0b101]);
    let text = codec.encode_text(&vector);
    assert_eq!(text.len(), 64);
    assert!(text.starts_with("101000"));
    assert_eq!(codec.decode_text(VectorType::Binary, 64, &text).unwrap(), vector);
}

#[test]
fn test_text_wrong_coordinate_count() {
    let err = BigEndianCodec
        .decode_text(VectorType::Real, 4, "1 2 3")
        .expect_err("too few");
    assert!(err.to_string().contains("expected 4"));
}

#[test]
fn test_text_bad_bit() {
    let bits = "2".repeat(64);
    assert!(BigEndianCodec
        .decode_text(VectorType::Binary, 64, &bits)
        .is_err());
}

// -------------------------------------------------------------------------
// Vector shape helpers
// -------------------------------------------------------------------------

#[test]
fn test_vector_dimensions() {
    assert_eq!(Vector::Real(vec![0.0; 5]).dimension(), 5);
    assert_eq!(Vector::complex(vec![0.0; 10]).unwrap().dimension(), 5);
    assert_eq!(Vector::Binary(vec![0; 2]).dimension(), 128);
}

#[test]
fn test_vector_zero() {
    let zero = Vector::zero(VectorType::Complex, 3).unwrap();
    assert!(zero.is_zero());
    assert_eq!(zero.dimension(), 3);
    assert!(Vector::zero(VectorType::Binary, 65).is_err());
}

#[test]
fn test_complex_rejects_odd_length() {
    assert!(Vector::complex(vec![1.0, 2.0, 3.0]).is_err());
}

#[test]
fn test_vector_type_parse_is_case_insensitive() {
    assert_eq!("REAL".parse::<VectorType>().unwrap(), VectorType::Real);
    assert_eq!("Binary".parse::<VectorType>().unwrap(), VectorType::Binary);
    assert!("permutedcomplex".parse::<VectorType>().is_err());
}

#[test]
fn test_vector_serializes_tagged() {
    let json = serde_json::to_string(&Vector::Real(vec![1.0])).unwrap();
    assert_eq!(json, r#"{"type":"real","values":[1.0]}"#);
}
