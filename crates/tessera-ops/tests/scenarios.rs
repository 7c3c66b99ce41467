//! Elementwise behaviour on concrete inputs.

use tessera_conformance::assert_allclose;
use tessera_core::{Array, DType, TesseraError};
use tessera_ops::{add, add_broadcast, div, div_scalar, equal_broadcast, mul_broadcast, sub};

fn arr(data: &[f32], shape: &[usize]) -> Array {
    Array::create(data, shape, DType::F32).unwrap()
}

#[test]
fn add_and_sub_2x2() {
    let a = arr(&[2.0, 4.0, 5.0, -4.0], &[2, 2]);
    let b = arr(&[-3.0, 0.0, 9.0, -1.0], &[2, 2]);

    let s = add(&a, &b).unwrap();
    assert_eq!(s.shape(), &[2, 2]);
    assert_allclose(&s.to_vec_f32(), &[-1.0, 4.0, 14.0, -5.0], 0.0, 0.0);

    let d = sub(&a, &b).unwrap();
    assert_allclose(&d.to_vec_f32(), &[5.0, 4.0, -4.0, -3.0], 0.0, 0.0);
}

#[test]
fn broadcast_row_over_matrix() {
    let a = arr(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = arr(&[10.0, 20.0], &[2]);
    let c = add_broadcast(&a, &b).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_allclose(&c.to_vec_f32(), &[11.0, 22.0, 13.0, 24.0], 0.0, 0.0);
}

#[test]
fn broadcast_incompatible_is_an_error() {
    let a = Array::zeros(&[2, 3], DType::F32).unwrap();
    let b = Array::zeros(&[4], DType::F32).unwrap();
    let err = add_broadcast(&a, &b).unwrap_err();
    assert!(matches!(err, TesseraError::Broadcast { .. }));
    assert_eq!(err.class(), tessera_core::ErrorClass::ContractViolation);
}

#[test]
fn broadcast_column_against_row() {
    let col = arr(&[1.0, 2.0, 3.0], &[3, 1]);
    let row = arr(&[1.0, 10.0], &[1, 2]);
    let out = mul_broadcast(&col, &row).unwrap();
    assert_eq!(out.shape(), &[3, 2]);
    assert_allclose(&out.to_vec_f32(), &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0], 0.0, 0.0);
}

#[test]
fn divide_by_zero_follows_ieee() {
    let a = arr(&[1.0, -1.0, 0.0], &[3]);
    let zero = Array::zeros(&[3], DType::F32).unwrap();
    let expected = [f32::INFINITY, f32::NEG_INFINITY, f32::NAN];
    assert_allclose(&div(&a, &zero).unwrap().to_vec_f32(), &expected, 0.0, 0.0);
    assert_allclose(&div_scalar(&a, 0.0).unwrap().to_vec_f32(), &expected, 0.0, 0.0);
}

#[test]
fn equal_broadcast_legacy_encoding() {
    let a = arr(&[1.0, 2.0, 1.0, 2.0], &[2, 2]);
    let b = arr(&[1.0, 1.0], &[2]);
    let e = equal_broadcast(&a, &b).unwrap();
    assert_eq!(e.dtype(), DType::F32);
    assert_allclose(&e.to_vec_f32(), &[1.0, 0.0, 1.0, 0.0], 0.0, 0.0);
}

#[test]
fn sliced_operands() {
    let base = arr(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], &[6]);
    let evens = base.slice_view(None, None, Some(&[2])).unwrap();
    let odds = base.slice_view(Some(&[1]), None, Some(&[2])).unwrap();
    let s = add(&evens, &odds).unwrap();
    assert_allclose(&s.to_vec_f32(), &[1.0, 5.0, 9.0], 0.0, 0.0);
}
