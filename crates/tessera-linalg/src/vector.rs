//! Vector products: dot, inner, outer, cross.
//!
//! Results take `promote(a, b)` as their kind.

use tessera_core::{Array, Result, TesseraError};
use tessera_ops::promote;

fn require_vector(op: &'static str, a: &Array) -> Result<()> {
    if a.ndim() != 1 {
        return Err(TesseraError::DimensionMismatch {
            op,
            expected: "1".into(),
            got: a.ndim(),
        });
    }
    Ok(())
}

fn require_same_len(a: &Array, b: &Array) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(TesseraError::ShapeMismatch {
            expected: a.shape().to_vec(),
            got: b.shape().to_vec(),
        });
    }
    Ok(())
}

fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Dot product of two vectors (shape `[1]`), or vector times matrix
/// (`[m] . [m, n]` gives `[n]`).
pub fn dot(a: &Array, b: &Array) -> Result<Array> {
    require_vector("dot", a)?;
    let dtype = promote(a.dtype(), b.dtype());
    match b.ndim() {
        1 => inner_impl("dot", a, b),
        2 => {
            let (m, n) = (b.shape()[0], b.shape()[1]);
            if a.size() != m {
                return Err(TesseraError::ShapeMismatch {
                    expected: vec![a.size(), n],
                    got: b.shape().to_vec(),
                });
            }
            let x = a.to_vec_f32();
            let mat = b.to_vec_f32();
            let out: Vec<f32> = (0..n)
                .map(|j| (0..m).map(|i| x[i] * mat[i * n + j]).sum())
                .collect();
            Array::create(&out, &[n], dtype)
        }
        got => Err(TesseraError::DimensionMismatch {
            op: "dot",
            expected: "1 or 2".into(),
            got,
        }),
    }
}

fn inner_impl(op: &'static str, a: &Array, b: &Array) -> Result<Array> {
    require_vector(op, a)?;
    require_vector(op, b)?;
    require_same_len(a, b)?;
    let v = dot_f32(&a.to_vec_f32(), &b.to_vec_f32());
    Array::create(&[v], &[1], promote(a.dtype(), b.dtype()))
}

/// Inner product of two equal-length vectors, as shape `[1]`.
pub fn inner(a: &Array, b: &Array) -> Result<Array> {
    inner_impl("inner", a, b)
}

/// Outer product: `[m]` and `[n]` give `[m, n]`.
pub fn outer(a: &Array, b: &Array) -> Result<Array> {
    require_vector("outer", a)?;
    require_vector("outer", b)?;
    let x = a.to_vec_f32();
    let y = b.to_vec_f32();
    let out: Vec<f32> = x
        .iter()
        .flat_map(|&xi| y.iter().map(move |&yj| xi * yj))
        .collect();
    Array::create(&out, &[x.len(), y.len()], promote(a.dtype(), b.dtype()))
}

fn resolve_axis(axis: isize, ndim: usize) -> Result<usize> {
    let resolved = if axis < 0 {
        axis.checked_add_unsigned(ndim)
    } else {
        Some(axis)
    };
    match resolved {
        Some(ax) if ax >= 0 && (ax as usize) < ndim => Ok(ax as usize),
        _ => Err(TesseraError::InvalidAxis { axis, ndim }),
    }
}

/// Cross product of 3-vectors along the last axis. `a` and `b` must have the
/// same shape, ending in 3.
pub fn cross(a: &Array, b: &Array) -> Result<Array> {
    cross_axis(a, b, -1)
}

/// Cross product of 3-vectors laid out along `axis` (negative counts from
/// the end). `a` and `b` must have the same shape, with 3 on `axis`.
pub fn cross_axis(a: &Array, b: &Array, axis: isize) -> Result<Array> {
    require_same_len(a, b)?;
    let ax = resolve_axis(axis, a.ndim())?;
    let shape = a.shape();
    if shape[ax] != 3 {
        return Err(TesseraError::InvalidArgument(format!(
            "cross: axis {axis} must have length 3, got shape {shape:?}"
        )));
    }
    // Components of one vector sit `inner` elements apart.
    let inner: usize = shape[ax + 1..].iter().product();
    let x = a.to_vec_f32();
    let y = b.to_vec_f32();
    let mut out = vec![0.0f32; x.len()];
    for base in (0..x.len()).step_by((3 * inner).max(1)) {
        for i in base..base + inner {
            let (u0, u1, u2) = (x[i], x[i + inner], x[i + 2 * inner]);
            let (v0, v1, v2) = (y[i], y[i + inner], y[i + 2 * inner]);
            out[i] = u1 * v2 - u2 * v1;
            out[i + inner] = u2 * v0 - u0 * v2;
            out[i + 2 * inner] = u0 * v1 - u1 * v0;
        }
    }
    Array::create(&out, shape, promote(a.dtype(), b.dtype()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::DType;

    fn vec1(data: &[f32]) -> Array {
        Array::create(data, &[data.len()], DType::F32).unwrap()
    }

    #[test]
    fn test_dot_and_inner() {
        let a = vec1(&[1.0, 2.0, 3.0]);
        let b = vec1(&[4.0, 5.0, 6.0]);
        assert_eq!(dot(&a, &b).unwrap().to_vec_f32(), vec![32.0]);
        let i = inner(&a, &b).unwrap();
        assert_eq!(i.shape(), &[1]);
        assert_eq!(i.item().unwrap(), 32.0);
        assert!(matches!(
            inner(&a, &vec1(&[1.0, 2.0])),
            Err(TesseraError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_vector_matrix_dot() {
        let v = vec1(&[1.0, 2.0]);
        let m = Array::create(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], DType::F32).unwrap();
        let out = dot(&v, &m).unwrap();
        assert_eq!(out.shape(), &[3]);
        assert_eq!(out.to_vec_f32(), vec![9.0, 12.0, 15.0]);

        let wrong = Array::ones(&[3, 2], DType::F32).unwrap();
        assert!(dot(&v, &wrong).is_err());
    }

    #[test]
    fn test_outer() {
        let out = outer(&vec1(&[1.0, 2.0]), &vec1(&[3.0, 4.0, 5.0])).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.to_vec_f32(), vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_cross() {
        let x = vec1(&[1.0, 0.0, 0.0]);
        let y = vec1(&[0.0, 1.0, 0.0]);
        assert_eq!(cross(&x, &y).unwrap().to_vec_f32(), vec![0.0, 0.0, 1.0]);

        let rows = Array::create(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[2, 3], DType::F32).unwrap();
        let other = Array::create(&[0.0, 1.0, 0.0, 0.0, 0.0, 1.0], &[2, 3], DType::F32).unwrap();
        let out = cross(&rows, &other).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.to_vec_f32(), vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);

        assert!(cross(&vec1(&[1.0, 2.0]), &vec1(&[3.0, 4.0])).is_err());
    }

    #[test]
    fn test_cross_axis() {
        // Columns hold the vectors: e_x, e_y against e_y, e_z.
        let a = Array::create(&[1.0, 0.0, 0.0, 1.0, 0.0, 0.0], &[3, 2], DType::F32).unwrap();
        let b = Array::create(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], &[3, 2], DType::F32).unwrap();
        let out = cross_axis(&a, &b, 0).unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out.to_vec_f32(), vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(
            cross_axis(&a, &b, -2).unwrap().to_vec_f32(),
            out.to_vec_f32()
        );

        // Middle axis of a [2, 3, 2] stack matches crossing the transposed rows.
        let data: Vec<f32> = (0..12).map(|i| (i * 5 % 7) as f32 - 3.0).collect();
        let other: Vec<f32> = (0..12).map(|i| (i * 3 % 5) as f32 - 2.0).collect();
        let a = Array::create(&data, &[2, 3, 2], DType::F32).unwrap();
        let b = Array::create(&other, &[2, 3, 2], DType::F32).unwrap();
        let mid = cross_axis(&a, &b, 1).unwrap().to_vec_f32();
        let last = cross(
            &a.permute_view(&[0, 2, 1]).unwrap(),
            &b.permute_view(&[0, 2, 1]).unwrap(),
        )
        .unwrap()
        .permute_view(&[0, 2, 1])
        .unwrap()
        .to_vec_f32();
        assert_eq!(mid, last);

        assert!(matches!(
            cross_axis(&a, &b, 3),
            Err(TesseraError::InvalidAxis { axis: 3, ndim: 3 })
        ));
        assert!(matches!(
            cross_axis(&a, &b, -4),
            Err(TesseraError::InvalidAxis { .. })
        ));
        assert!(cross_axis(&a, &b, 0).is_err());
    }

    #[test]
    fn test_vector_kinds() {
        let a = Array::create(&[1.0, 2.0], &[2], DType::I32).unwrap();
        let b = Array::create(&[0.5, 0.5], &[2], DType::F32).unwrap();
        assert_eq!(inner(&a, &b).unwrap().dtype(), DType::F32);
        assert_eq!(outer(&a, &a).unwrap().dtype(), DType::I32);
    }
}
