use keyspace_chunk::{chunk_equals, ChunkError, ChunkRef, ChunkType, WritableChunk};
use keyspace_math::{
    LeafKind, MathError, PrimitiveKind, Semantics, Traversal, Value, ValueType,
};
use pretty_assertions::assert_eq;

fn other_nan() -> f64 {
    f64::from_bits(0x7ff0_0000_0000_0001)
}

fn doubles() -> ValueType {
    ValueType::scalar(PrimitiveKind::Double)
}

fn ints() -> ValueType {
    ValueType::scalar(PrimitiveKind::Int)
}

#[test]
fn signed_zero_and_nan_under_each_semantics() {
    let lhs = [1.0, -0.0, f64::NAN];
    let rhs = [1.0, 0.0, other_nan()];
    assert_ne!(f64::NAN.to_bits(), other_nan().to_bits());

    let expectations = [
        (Semantics::Canonical, vec![true, true, true]),
        (Semantics::Native, vec![true, false, true]),
        (Semantics::Bitwise, vec![true, false, false]),
    ];
    for (semantics, expected) in expectations {
        let equals = chunk_equals(semantics, doubles(), Traversal::Shallow).unwrap();
        let mut dest = WritableChunk::with_capacity(4);
        equals
            .equal(ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest)
            .unwrap();
        assert_eq!(dest.as_slice(), &expected[..], "{semantics}");

        equals
            .not_equal(ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest)
            .unwrap();
        let negated: Vec<bool> = expected.iter().map(|b| !b).collect();
        assert_eq!(dest.as_slice(), &negated[..], "{semantics}");
    }
}

#[test]
fn and_equal_conjoins_column_by_column() {
    let equals = chunk_equals(Semantics::default(), ints(), Traversal::Shallow).unwrap();
    let first_lhs = [1, 2, 3, 4];
    let first_rhs = [1, 2, 0, 4];
    let second_lhs = [5, 0, 7, 8];
    let second_rhs = [5, 6, 7, 8];

    let mut dest = WritableChunk::with_capacity(4);
    equals
        .equal(ChunkRef::from(&first_lhs[..]), ChunkRef::from(&first_rhs[..]), &mut dest)
        .unwrap();
    equals
        .and_equal(ChunkRef::from(&second_lhs[..]), ChunkRef::from(&second_rhs[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, false, false, true]);

    equals
        .and_not_equal(ChunkRef::from(&first_lhs[..]), ChunkRef::from(&second_rhs[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, false, false, true]);
}

#[test]
fn equal_next_detects_runs() {
    let equals = chunk_equals(Semantics::Canonical, doubles(), Traversal::Shallow).unwrap();
    let values = [1.0, 1.0, -0.0, 0.0, 2.0];
    let mut dest = WritableChunk::with_capacity(8);
    equals.equal_next(ChunkRef::from(&values[..]), &mut dest).unwrap();
    assert_eq!(dest.as_slice(), &[true, false, true, false]);

    let empty: [f64; 0] = [];
    equals.equal_next(ChunkRef::from(&empty[..]), &mut dest).unwrap();
    assert!(dest.is_empty());
}

#[test]
fn and_equal_next_requires_prepared_destination() {
    let equals = chunk_equals(Semantics::Canonical, ints(), Traversal::Shallow).unwrap();
    let values = [3, 3, 3, 4];
    let mut dest = WritableChunk::from_vec(vec![true, false, true]);
    equals.and_equal_next(ChunkRef::from(&values[..]), &mut dest).unwrap();
    assert_eq!(dest.as_slice(), &[true, false, false]);

    let mut wrong = WritableChunk::from_vec(vec![true; 2]);
    assert_eq!(
        equals.and_equal_next(ChunkRef::from(&values[..]), &mut wrong),
        Err(ChunkError::LengthMismatch {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn permuted_comparisons_gather_through_positions() {
    let equals = chunk_equals(Semantics::Canonical, ints(), Traversal::Shallow).unwrap();
    let lhs = [10, 20, 30];
    let rhs = [30, 10, 99];
    let mut dest = WritableChunk::with_capacity(3);

    equals
        .equal_permuted(&[2, 0, 1], &[0, 1, 2], ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, true, false]);

    equals
        .and_equal_permuted(&[0, 0, 0], &[1, 1, 1], ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, true, false]);

    equals
        .equal_lhs_permuted(&[2, 0, 1], ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, true, false]);

    equals
        .and_equal_lhs_permuted(&[2, 1, 1], ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, false, false]);
}

#[test]
fn pairs_compare_within_one_chunk() {
    let equals = chunk_equals(Semantics::Canonical, ints(), Traversal::Shallow).unwrap();
    let values = [7, 8, 7, 9];
    let mut dest = WritableChunk::with_capacity(2);
    equals
        .equal_pairs(&[0, 2, 1, 3], ChunkRef::from(&values[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, false]);

    equals
        .and_equal_pairs(&[1, 1, 0, 0], ChunkRef::from(&values[..]), &mut dest)
        .unwrap();
    assert_eq!(dest.as_slice(), &[true, false]);

    assert_eq!(
        equals.equal_pairs(&[0, 1, 2], ChunkRef::from(&values[..]), &mut dest),
        Err(ChunkError::OddPairPositions(3))
    );
}

#[test]
fn reduce_and_first_difference() {
    let equals = chunk_equals(Semantics::Canonical, doubles(), Traversal::Shallow).unwrap();
    let x = [1.0, -0.0, 3.0];
    let y = [1.0, 0.0, 4.0];
    assert!(equals.equal_reduce(ChunkRef::from(&x[..2]), ChunkRef::from(&y[..2])).unwrap());
    assert!(!equals.equal_reduce(ChunkRef::from(&x[..]), ChunkRef::from(&y[..])).unwrap());
    assert!(!equals.equal_reduce(ChunkRef::from(&x[..]), ChunkRef::from(&y[..2])).unwrap());
    assert_eq!(equals.first_difference(ChunkRef::from(&x[..]), ChunkRef::from(&y[..])), Ok(2));
    assert_eq!(equals.first_difference(ChunkRef::from(&x[..2]), ChunkRef::from(&y[..])), Ok(2));
}

#[test]
fn contract_violations_are_errors() {
    let equals = chunk_equals(Semantics::Canonical, ints(), Traversal::Shallow).unwrap();
    let three = [1, 2, 3];
    let two = [1, 2];
    let mut small = WritableChunk::with_capacity(2);

    assert_eq!(
        equals.equal(ChunkRef::from(&three[..]), ChunkRef::from(&two[..]), &mut small),
        Err(ChunkError::LengthMismatch {
            expected: 3,
            actual: 2
        })
    );
    assert_eq!(
        equals.equal(ChunkRef::from(&three[..]), ChunkRef::from(&three[..]), &mut small),
        Err(ChunkError::DestinationTooSmall {
            required: 3,
            capacity: 2
        })
    );
    let longs = [1i64, 2];
    assert_eq!(
        equals.equal(ChunkRef::from(&longs[..]), ChunkRef::from(&longs[..]), &mut small),
        Err(ChunkError::TypeMismatch {
            expected: ChunkType::Int,
            actual: ChunkType::Long
        })
    );
    assert_eq!(
        equals.equal_lhs_permuted(&[0, 5], ChunkRef::from(&three[..]), ChunkRef::from(&two[..]), &mut small),
        Err(ChunkError::PositionOutOfBounds {
            position: 5,
            size: 3
        })
    );
    // Nothing was written by the failed calls.
    assert!(small.is_empty());
}

#[test]
fn nested_values_use_object_chunks() {
    let ty = ValueType::array(PrimitiveKind::Double, 2);
    let row = |x: f64| Value::array([Value::from(vec![x])]);
    let lhs = [row(1.0), row(-0.0)];
    let rhs = [row(1.0), row(0.0)];

    let deep = chunk_equals(Semantics::Canonical, ty, Traversal::Deep).unwrap();
    assert_eq!(deep.chunk_type(), ChunkType::Object);
    let mut dest = WritableChunk::with_capacity(2);
    deep.equal(ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest).unwrap();
    assert_eq!(dest.as_slice(), &[true, true]);

    let shallow = chunk_equals(Semantics::Canonical, ty, Traversal::Shallow).unwrap();
    shallow.equal(ChunkRef::from(&lhs[..]), ChunkRef::from(&rhs[..]), &mut dest).unwrap();
    assert_eq!(dest.as_slice(), &[false, false]);
}

#[test]
fn factory_rejects_deep_any() {
    let ty = ValueType::array(LeafKind::Any, 1);
    assert_eq!(
        chunk_equals(Semantics::Canonical, ty, Traversal::Deep).err(),
        Some(ChunkError::Math(MathError::DeepAnyLeaf(ty)))
    );
    assert!(chunk_equals(Semantics::Canonical, ty, Traversal::Shallow).is_ok());
}
