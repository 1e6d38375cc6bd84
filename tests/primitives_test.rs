use bytes::{Bytes, BytesMut};
use iavl_proof_codec::core::{
    byte_slice_size, decode_byte_slice, decode_uvarint, decode_varint, encode_byte_slice,
    encode_uvarint, encode_varint, read_uvarint, read_varint, uvarint_size, varint_size,
};
use iavl_proof_codec::{decode, decode_from_slice, encode, EncoderError, ProofLeafNode};

fn varint_bytes(v: i64) -> Vec<u8> {
    let mut writer = BytesMut::new();
    encode_varint(&mut writer, v);
    writer.to_vec()
}

fn uvarint_bytes(v: u64) -> Vec<u8> {
    let mut writer = BytesMut::new();
    encode_uvarint(&mut writer, v);
    writer.to_vec()
}

#[test]
fn test_varint_known_encodings() {
    assert_eq!(varint_bytes(0), vec![0x00]);
    assert_eq!(varint_bytes(-1), vec![0x01]);
    assert_eq!(varint_bytes(1), vec![0x02]);
    assert_eq!(varint_bytes(-2), vec![0x03]);
    assert_eq!(varint_bytes(5), vec![0x0A]);
    assert_eq!(varint_bytes(63), vec![0x7E]);
    assert_eq!(varint_bytes(-64), vec![0x7F]);
    assert_eq!(varint_bytes(64), vec![0x80, 0x01]);
    assert_eq!(varint_bytes(300), vec![0xD8, 0x04]);

    let mut max = vec![0xFE];
    max.extend_from_slice(&[0xFF; 8]);
    max.push(0x01);
    assert_eq!(varint_bytes(i64::MAX), max);

    let mut min = vec![0xFF; 9];
    min.push(0x01);
    assert_eq!(varint_bytes(i64::MIN), min);
}

#[test]
fn test_uvarint_known_encodings() {
    assert_eq!(uvarint_bytes(0), vec![0x00]);
    assert_eq!(uvarint_bytes(127), vec![0x7F]);
    assert_eq!(uvarint_bytes(128), vec![0x80, 0x01]);
    assert_eq!(uvarint_bytes(300), vec![0xAC, 0x02]);

    let mut max = vec![0xFF; 9];
    max.push(0x01);
    assert_eq!(uvarint_bytes(u64::MAX), max);
}

#[test]
fn test_varint_read_reports_length() {
    for v in [0i64, 1, -1, 63, -64, 64, 300, -300, i64::MAX, i64::MIN] {
        let mut bz = varint_bytes(v);
        let len = bz.len();
        bz.push(0x55); // trailing byte must be left alone
        assert_eq!(read_varint(&bz).unwrap(), (v, len));
    }
    for v in [0u64, 1, 127, 128, 300, u64::MAX] {
        let bz = uvarint_bytes(v);
        assert_eq!(read_uvarint(&bz).unwrap(), (v, bz.len()));
    }
}

#[test]
fn test_varint_buffer_too_small() {
    assert!(matches!(read_uvarint(&[]), Err(EncoderError::BufferTooSmall)));
    assert!(matches!(
        read_uvarint(&[0x80, 0x80]),
        Err(EncoderError::BufferTooSmall)
    ));
    assert!(matches!(read_varint(&[0xFF]), Err(EncoderError::BufferTooSmall)));
}

#[test]
fn test_varint_overflow_reports_consumed() {
    // tenth byte may only carry the single remaining bit
    let mut bz = vec![0xFF; 9];
    bz.push(0x02);
    assert!(matches!(
        read_uvarint(&bz),
        Err(EncoderError::VarintOverflow { consumed: 10 })
    ));

    let bz = vec![0x80; 11];
    assert!(matches!(
        read_uvarint(&bz),
        Err(EncoderError::VarintOverflow { consumed: 11 })
    ));
}

#[test]
fn test_decode_uvarint_skips_overflowed_bytes() {
    let mut raw = vec![0xFF; 9];
    raw.push(0x02);
    raw.push(0x07);
    let mut reader = Bytes::from(raw);
    let result = decode_uvarint(&mut reader);
    assert!(matches!(
        result,
        Err(EncoderError::VarintOverflow { consumed: 10 })
    ));
    assert_eq!(&reader[..], &[0x07]);
}

#[test]
fn test_decode_varint_advances_reader() {
    let mut reader = Bytes::from_static(&[0xD8, 0x04, 0x0A]);
    assert_eq!(decode_varint(&mut reader).unwrap(), 300);
    assert_eq!(decode_varint(&mut reader).unwrap(), 5);
    assert!(reader.is_empty());
}

#[test]
fn test_varint_sizes() {
    assert_eq!(uvarint_size(0), 1);
    assert_eq!(uvarint_size(127), 1);
    assert_eq!(uvarint_size(128), 2);
    assert_eq!(uvarint_size(u64::MAX), 10);
    assert_eq!(varint_size(-64), 1);
    assert_eq!(varint_size(64), 2);
    assert_eq!(varint_size(i64::MIN), 10);
    assert_eq!(byte_slice_size(b"ab"), 3);
    assert_eq!(byte_slice_size(&[0u8; 64]), 66);
}

#[test]
fn test_bool_encoding() {
    assert_eq!(&encode(&true).unwrap()[..], &[1]);
    assert_eq!(&encode(&false).unwrap()[..], &[0]);

    // any non-zero byte reads as true
    let mut reader = Bytes::from_static(&[0x02, 0x00]);
    assert!(decode::<bool>(&mut reader).unwrap());
    assert!(!decode::<bool>(&mut reader).unwrap());

    let mut empty = Bytes::new();
    assert!(matches!(
        decode::<bool>(&mut empty),
        Err(EncoderError::InsufficientData)
    ));
}

#[test]
fn test_fixed_width_integers() {
    assert_eq!(&encode(&-1i8).unwrap()[..], &[0xFF]);
    assert_eq!(&encode(&-2i16).unwrap()[..], &[0xFE, 0xFF]);
    assert_eq!(&encode(&0x1234u16).unwrap()[..], &[0x34, 0x12]);

    let mut reader = Bytes::from_static(&[0x34, 0x12, 0x80]);
    assert_eq!(decode::<u16>(&mut reader).unwrap(), 0x1234);
    assert_eq!(decode::<i8>(&mut reader).unwrap(), -128);

    let mut short = Bytes::from_static(&[0x01]);
    assert!(matches!(
        decode::<i16>(&mut short),
        Err(EncoderError::InsufficientData)
    ));
}

#[test]
fn test_wide_integers_use_varints() {
    assert_eq!(&encode(&5i32).unwrap()[..], &[0x0A]);
    assert_eq!(&encode(&-1i64).unwrap()[..], &[0x01]);
    assert_eq!(&encode(&300u32).unwrap()[..], &[0xAC, 0x02]);
    assert_eq!(&encode(&1u64).unwrap()[..], &[0x01]);

    let mut reader = encode(&i64::MIN).unwrap();
    assert_eq!(decode::<i64>(&mut reader).unwrap(), i64::MIN);
    let mut reader = encode(&u64::MAX).unwrap();
    assert_eq!(decode::<u64>(&mut reader).unwrap(), u64::MAX);
}

#[test]
fn test_floats_keep_bit_patterns() {
    assert_eq!(&encode(&1.0f32).unwrap()[..], &[0x00, 0x00, 0x80, 0x3F]);

    let nan = f64::from_bits(0x7FF8_0000_0000_0001);
    let mut reader = encode(&nan).unwrap();
    assert_eq!(reader.len(), 8);
    assert_eq!(decode::<f64>(&mut reader).unwrap().to_bits(), nan.to_bits());

    let mut reader = encode(&-0.0f32).unwrap();
    assert_eq!(decode::<f32>(&mut reader).unwrap().to_bits(), (-0.0f32).to_bits());

    let mut short = Bytes::from_static(&[0, 0, 0]);
    assert!(matches!(
        decode::<f32>(&mut short),
        Err(EncoderError::InsufficientData)
    ));
}

#[test]
fn test_byte_slice_encoding() {
    let mut writer = BytesMut::new();
    encode_byte_slice(&mut writer, b"ab");
    assert_eq!(&writer[..], &[0x04, b'a', b'b']);

    let mut reader = writer.freeze();
    assert_eq!(&decode_byte_slice(&mut reader).unwrap()[..], b"ab");
    assert!(reader.is_empty());

    let mut empty = BytesMut::new();
    encode_byte_slice(&mut empty, b"");
    assert_eq!(&empty[..], &[0x00]);
}

#[test]
fn test_byte_slice_rejects_bad_lengths() {
    // -1
    let mut negative = Bytes::from_static(&[0x01]);
    assert!(matches!(
        decode_byte_slice(&mut negative),
        Err(EncoderError::InsufficientData)
    ));

    // 3 declared, 2 present
    let mut short = Bytes::from_static(&[0x06, 1, 2]);
    assert!(matches!(
        decode_byte_slice(&mut short),
        Err(EncoderError::InsufficientData)
    ));
}

#[test]
fn test_string_shares_byte_slice_encoding() {
    let s = "héllo".to_string();
    let bz = encode(&s).unwrap();
    assert_eq!(bz[0], 0x0C);
    assert_eq!(&bz[1..], s.as_bytes());

    let mut reader = bz;
    assert_eq!(decode::<String>(&mut reader).unwrap(), s);

    let mut invalid = Bytes::from_static(&[0x02, 0xFF]);
    assert!(matches!(
        decode::<String>(&mut invalid),
        Err(EncoderError::Decode(_))
    ));
}

#[test]
fn test_sequence_count_must_not_be_negative() {
    let mut reader = Bytes::from_static(&[0x01]);
    assert!(matches!(
        decode::<Vec<ProofLeafNode>>(&mut reader),
        Err(EncoderError::Decode(_))
    ));
}

#[test]
fn test_huge_sequence_count_fails_without_panicking() {
    // count of 2^40 followed by nothing
    let mut writer = BytesMut::new();
    encode_varint(&mut writer, 1 << 40);
    let mut reader = writer.freeze();
    assert!(matches!(
        decode::<Vec<ProofLeafNode>>(&mut reader),
        Err(EncoderError::BufferTooSmall)
    ));
}

#[test]
fn test_decode_from_slice_reports_consumed() {
    let bz = [0x04, b'a', b'b', 0x04, b'c', b'd', 0x0A, 0xEE];
    let (leaf, consumed): (ProofLeafNode, usize) = decode_from_slice(&bz).unwrap();
    assert_eq!(consumed, 7);
    assert_eq!(&leaf.key[..], b"ab");
    assert_eq!(leaf.version, 5);
}
