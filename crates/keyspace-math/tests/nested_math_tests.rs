use keyspace_math::{
    LeafKind, MathError, NestedMath, PrimitiveKind, Semantics, Traversal, Value, ValueType,
};
use pretty_assertions::assert_eq;
use std::cmp::Ordering;

fn doubles(values: &[f64]) -> Value {
    Value::from(values)
}

fn matrix(rows: &[&[f64]]) -> Value {
    Value::array(rows.iter().map(|row| doubles(row)))
}

#[test]
fn primitive_array_equality_follows_semantics() {
    let ty = ValueType::array(PrimitiveKind::Double, 1);
    let x = doubles(&[1.0, -0.0, f64::NAN]);
    let y = doubles(&[1.0, 0.0, f64::NAN]);

    let canonical = NestedMath::new(Semantics::Canonical).equals(ty).unwrap();
    let native = NestedMath::new(Semantics::Native).equals(ty).unwrap();
    assert!(canonical(&x, &y));
    assert!(!native(&x, &y));

    let hash = NestedMath::new(Semantics::Canonical).hasher(ty).unwrap();
    assert_eq!(hash(&x), hash(&y));
}

#[test]
fn null_arrays_hash_to_zero_and_only_equal_null() {
    let ty = ValueType::array(PrimitiveKind::Int, 1);
    let math = NestedMath::default();
    let equals = math.equals(ty).unwrap();
    let hash = math.hasher(ty).unwrap();
    assert!(equals(&Value::Null, &Value::Null));
    assert!(!equals(&Value::Null, &Value::from(vec![1i32])));
    assert_eq!(hash(&Value::Null), 0);
    assert_eq!(hash(&Value::from(vec![1i32])), 32);
}

#[test]
fn shallow_nested_arrays_compare_by_identity() {
    let ty = ValueType::array(PrimitiveKind::Double, 2);
    let math = NestedMath::new(Semantics::Native);
    let shared = doubles(&[1.0, 2.0]);
    let a = Value::array([shared.clone()]);
    let b = Value::array([shared]);
    let c = matrix(&[&[1.0, 2.0]]);

    let shallow = math.equals(ty).unwrap();
    assert!(shallow(&a, &b));
    assert!(!shallow(&a, &c));

    let deep = math.deep_equals(ty).unwrap();
    let deep_hash = math.deep_hasher(ty).unwrap();
    assert!(deep(&a, &c));
    assert_eq!(deep_hash(&a), deep_hash(&c));
}

#[test]
fn deep_equality_recurses_through_every_level() {
    let ty = ValueType::array(PrimitiveKind::Double, 3);
    let math = NestedMath::new(Semantics::Canonical);
    let x = Value::array([matrix(&[&[0.0], &[f64::NAN, 1.0]]), Value::Null]);
    let y = Value::array([matrix(&[&[-0.0], &[f64::NAN, 1.0]]), Value::Null]);
    let z = Value::array([matrix(&[&[0.0], &[1.0, f64::NAN]]), Value::Null]);

    let deep = math.deep_equals(ty).unwrap();
    assert!(deep(&x, &y));
    assert!(!deep(&x, &z));

    let hash = math.deep_hasher(ty).unwrap();
    assert_eq!(hash(&x), hash(&y));
}

#[test]
fn text_arrays_compare_by_content() {
    let ty = ValueType::array(LeafKind::Text, 1);
    let math = NestedMath::default();
    let x = Value::array([Value::text("a"), Value::Null]);
    let y = Value::array([Value::text("a"), Value::Null]);
    assert!(math.equals(ty).unwrap()(&x, &y));
    assert!(math.deep_equals(ty).unwrap()(&x, &y));
    assert_eq!(math.hasher(ty).unwrap()(&x), math.hasher(ty).unwrap()(&y));
}

#[test]
fn construction_errors_are_reported_up_front() {
    let math = NestedMath::default();
    let any_array = ValueType::array(LeafKind::Any, 1);

    assert!(math.equals(any_array).is_ok());
    assert_eq!(
        math.deep_equals(any_array).err(),
        Some(MathError::DeepAnyLeaf(any_array))
    );
    assert_eq!(
        math.deep_hasher(any_array).err(),
        Some(MathError::DeepAnyLeaf(any_array))
    );

    let scalar = ValueType::scalar(PrimitiveKind::Long);
    assert_eq!(
        math.predicate(scalar, Traversal::Shallow).err(),
        Some(MathError::PrimitiveLeaf(scalar))
    );
    assert_eq!(
        math.comparator(scalar).err(),
        Some(MathError::PrimitiveLeaf(scalar))
    );
    assert_eq!(
        math.comparator(any_array).err(),
        Some(MathError::NotComparable(any_array))
    );
}

#[test]
fn comparator_orders_nulls_then_length_then_elements() {
    let ty = ValueType::array(PrimitiveKind::Double, 2);
    let compare = NestedMath::new(Semantics::Native).comparator(ty).unwrap();

    let short = matrix(&[&[9.0]]);
    let long = matrix(&[&[1.0], &[1.0]]);
    assert_eq!(compare(&Value::Null, &short), Ordering::Less);
    assert_eq!(compare(&short, &long), Ordering::Less);
    assert_eq!(
        compare(&matrix(&[&[1.0], &[-0.0]]), &matrix(&[&[1.0], &[0.0]])),
        Ordering::Less
    );
    assert_eq!(compare(&long, &matrix(&[&[1.0], &[1.0]])), Ordering::Equal);
}

#[test]
fn text_comparator_uses_natural_order() {
    let compare = NestedMath::default()
        .comparator(ValueType::scalar(LeafKind::Text))
        .unwrap();
    assert_eq!(compare(&Value::text("a"), &Value::text("b")), Ordering::Less);
    assert_eq!(compare(&Value::Null, &Value::text("a")), Ordering::Less);
}
