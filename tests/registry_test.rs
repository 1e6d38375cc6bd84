use bytes::{Bytes, BytesMut};
use iavl_proof_codec::{
    decode_any, deep_copy_any, encode_any, magic_bytes_of, support_list, AnyValue, EncoderError,
    IavlAbsenceOp, IavlValueOp, MagicBytesError, PathToLeaf, ProofInnerNode, ProofLeafNode,
    RangeProof, TypeKind, MAGIC_BYTES,
};

fn leaf() -> ProofLeafNode {
    ProofLeafNode {
        key: Bytes::from_static(b"ab"),
        value_hash: Bytes::from_static(b"cd"),
        version: 5,
    }
}

#[test]
fn test_magic_bytes_table() {
    assert_eq!(magic_bytes_of::<IavlAbsenceOp>(), [207, 81, 179, 157]);
    assert_eq!(magic_bytes_of::<IavlValueOp>(), [126, 47, 172, 221]);
    assert_eq!(magic_bytes_of::<PathToLeaf>(), [96, 9, 168, 214]);
    assert_eq!(magic_bytes_of::<ProofInnerNode>(), [117, 169, 83, 140]);
    assert_eq!(magic_bytes_of::<ProofLeafNode>(), [152, 49, 245, 98]);
    assert_eq!(magic_bytes_of::<RangeProof>(), [67, 7, 76, 59]);
}

#[test]
fn test_magic_bytes_lookup() {
    for kind in TypeKind::ALL {
        assert_eq!(TypeKind::from_magic_bytes(&kind.magic_bytes()), Some(kind));
        assert_eq!(MAGIC_BYTES[kind as usize], kind.magic_bytes());
    }
    assert_eq!(TypeKind::from_magic_bytes(&[0, 0, 0, 0]), None);
    assert_eq!(TypeKind::ProofLeafNode.to_string(), "ProofLeafNode");
    assert_eq!(TypeKind::IavlValueOp.name(), "IAVLValueOp");
}

#[test]
fn test_encode_any_prepends_magic_bytes() {
    let value = AnyValue::from(leaf());
    assert_eq!(value.kind(), TypeKind::ProofLeafNode);

    let mut writer = BytesMut::new();
    encode_any(&value, &mut writer).unwrap();
    assert_eq!(
        &writer[..],
        &[152, 49, 245, 98, 0x04, b'a', b'b', 0x04, b'c', b'd', 0x0A]
    );

    let mut reader = writer.freeze();
    let decoded = decode_any(&mut reader).unwrap();
    assert_eq!(decoded, value);
    assert!(reader.is_empty());
}

#[test]
fn test_decode_any_dispatches_on_tag() {
    let mut writer = BytesMut::new();
    encode_any(&AnyValue::from(RangeProof::default()), &mut writer).unwrap();
    encode_any(&AnyValue::from(PathToLeaf::default()), &mut writer).unwrap();

    let mut reader = writer.freeze();
    assert!(matches!(
        decode_any(&mut reader).unwrap(),
        AnyValue::RangeProof(_)
    ));
    assert!(matches!(
        decode_any(&mut reader).unwrap(),
        AnyValue::PathToLeaf(_)
    ));
    assert!(reader.is_empty());
}

#[test]
fn test_decode_any_unknown_tag_leaves_reader() {
    let mut reader = Bytes::from_static(&[1, 2, 3, 4, 0x00]);
    let result = decode_any(&mut reader);
    assert!(matches!(
        result,
        Err(EncoderError::MagicBytes(MagicBytesError::Unknown {
            found: [1, 2, 3, 4]
        }))
    ));
    assert_eq!(reader.len(), 5);
}

#[test]
fn test_decode_any_needs_a_full_tag() {
    for len in 0..4 {
        let mut reader = Bytes::copy_from_slice(&MAGIC_BYTES[0][..len]);
        assert!(matches!(
            decode_any(&mut reader),
            Err(EncoderError::InsufficientData)
        ));
    }
}

#[test]
fn test_decode_any_truncated_payload() {
    let mut reader = Bytes::from_static(&[152, 49, 245, 98, 0x04, b'a']);
    assert!(matches!(
        decode_any(&mut reader),
        Err(EncoderError::InsufficientData)
    ));
}

#[test]
fn test_try_from_any_value() {
    let value = AnyValue::from(leaf());
    let back: ProofLeafNode = value.clone().try_into().unwrap();
    assert_eq!(back, leaf());

    let wrong: Result<RangeProof, AnyValue> = value.clone().try_into();
    assert_eq!(wrong.unwrap_err(), value);
}

#[test]
fn test_deep_copy_any() {
    let value = AnyValue::from(leaf());
    let copy = deep_copy_any(&value);
    assert_eq!(copy, value);
    match (&copy, &value) {
        (AnyValue::ProofLeafNode(a), AnyValue::ProofLeafNode(b)) => {
            assert_ne!(a.key.as_ptr(), b.key.as_ptr());
        }
        _ => panic!("deep copy changed the variant"),
    }
}

#[test]
fn test_support_list_is_sorted_and_complete() {
    let list = support_list();
    assert_eq!(list.len(), 6);
    let mut sorted = list.clone();
    sorted.sort();
    assert_eq!(list, sorted);
    for name in [
        "IavlAbsenceOp",
        "IavlValueOp",
        "PathToLeaf",
        "ProofInnerNode",
        "ProofLeafNode",
        "RangeProof",
    ] {
        let suffix = format!("::{}", name);
        assert!(list.iter().any(|path| path.ends_with(&suffix)), "{}", name);
    }
}

#[cfg(feature = "rand")]
#[test]
fn test_random_any_round_trips() {
    use iavl_proof_codec::random_any;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut seen = HashSet::new();
    for _ in 0..200 {
        let value = random_any(&mut rng);
        seen.insert(value.kind());

        let mut writer = BytesMut::new();
        encode_any(&value, &mut writer).unwrap();
        assert_eq!(&writer[..4], &value.magic_bytes());

        let mut reader = writer.freeze();
        assert_eq!(decode_any(&mut reader).unwrap(), value);
        assert!(reader.is_empty());
    }
    assert_eq!(seen.len(), TypeKind::ALL.len());
}
