//! Buffer lifetime and aliasing between owners and views.

use std::sync::{Arc, Barrier};

use tessera_core::{Array, DType, Release, Shape};

fn arange(shape: &[usize], dtype: DType) -> Array {
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (0..n).map(|i| i as f32).collect();
    Array::create(&data, shape, dtype).unwrap()
}

// ── Release accounting ──────────────────────────────────────────────────

#[test]
fn create_then_delete_frees_for_every_kind() {
    for dtype in DType::ALL {
        let a = arange(&[2, 3], dtype);
        assert_eq!(a.handle_count(), 1);
        assert_eq!(a.delete(), Release::Freed, "{dtype}");
    }
}

#[test]
fn deleting_views_never_frees_owner_buffer() {
    let owner = arange(&[4, 4], DType::F32);
    let v1 = owner.view();
    let v2 = owner.slice_view(Some(&[1, 1]), None, None).unwrap();
    let v3 = v2.transpose_view();
    assert_eq!(owner.handle_count(), 4);

    assert_eq!(v1.delete(), Release::Shared { remaining: 3 });
    assert_eq!(v3.delete(), Release::Shared { remaining: 2 });
    assert_eq!(v2.delete(), Release::Shared { remaining: 1 });

    // Owner still reads its data and is the one that frees.
    assert_eq!(owner.get(&[3, 3]).unwrap(), 15.0);
    assert_eq!(owner.delete(), Release::Freed);
}

#[test]
fn view_outlives_owner() {
    let owner = arange(&[3], DType::I32);
    let view = owner.view();
    assert_eq!(owner.delete(), Release::Shared { remaining: 1 });
    assert_eq!(view.to_vec_f64(), vec![0.0, 1.0, 2.0]);
    assert_eq!(view.delete(), Release::Freed);
}

#[test]
fn materialized_copies_are_independent() {
    let owner = arange(&[2, 2], DType::F64);
    let copy = owner.contiguous();
    let cast = owner.cast(DType::I8);
    assert!(!copy.shares_buffer_with(&owner));
    assert!(!cast.shares_buffer_with(&owner));
    assert_eq!(copy.delete(), Release::Freed);
    assert_eq!(cast.delete(), Release::Freed);
    assert_eq!(owner.delete(), Release::Freed);
}

// ── Aliased mutation ────────────────────────────────────────────────────

#[test]
fn writes_through_slice_are_visible_to_owner() {
    let owner = arange(&[3, 3], DType::F32);
    let col = owner
        .slice_view(Some(&[0, 2]), Some(&[3, 3]), None)
        .unwrap();
    assert_eq!(col.shape(), &[3, 1]);
    for i in 0..3 {
        col.set(&[i, 0], -1.0).unwrap();
    }
    assert_eq!(
        owner.to_vec_f32(),
        vec![0.0, 1.0, -1.0, 3.0, 4.0, -1.0, 6.0, 7.0, -1.0]
    );
}

#[test]
fn concurrent_views_read_and_release() {
    let n_threads = 8;
    let owner = arange(&[8, 8], DType::F32);
    let barrier = Arc::new(Barrier::new(n_threads));

    let sums: Vec<f32> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..n_threads)
            .map(|row| {
                let barrier = Arc::clone(&barrier);
                let view = owner
                    .slice_view(Some(&[row, 0]), Some(&[row + 1, 8]), None)
                    .unwrap();
                s.spawn(move || {
                    barrier.wait();
                    let sum = view.to_vec_f32().iter().sum();
                    assert!(matches!(view.delete(), Release::Shared { .. }));
                    sum
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (row, sum) in sums.iter().enumerate() {
        let expected: f32 = (0..8).map(|c| (row * 8 + c) as f32).sum();
        assert_eq!(*sum, expected);
    }
    assert_eq!(owner.delete(), Release::Freed);
}

// ── Descriptors ─────────────────────────────────────────────────────────

#[test]
fn dtype_and_shape_serialize() {
    let json = serde_json::to_string(&(DType::U16, Shape::new(vec![2, 3]))).unwrap();
    assert_eq!(json, r#"["uint16",[2,3]]"#);
    let (dt, shape): (DType, Shape) = serde_json::from_str(&json).unwrap();
    assert_eq!(dt, DType::U16);
    assert_eq!(shape.numel(), 6);
}
