//! QR by modified Gram-Schmidt, and LQ through the QR of the transpose.
//!
//! `A (m x n) = Q (m x k) R (k x n)` with `k = min(m, n)`.

use tessera_core::{Array, Result};
use tessera_ops::float_result;

use crate::batch::{assemble, for_each_batch, require_ndim, stage};
use crate::dense::{Real, transpose};

/// Columns whose residual norm falls below this are rank deficient.
pub const QR_RANK_EPS: f64 = 1e-6;

/// Factors of a QR decomposition.
#[derive(Debug)]
pub struct Qr {
    /// `m x k`, orthonormal columns (zero where `A` is rank deficient).
    pub q: Array,
    /// `k x n`, upper triangular.
    pub r: Array,
}

/// Factors of an LQ decomposition.
#[derive(Debug)]
pub struct Lq {
    /// `m x k`, lower triangular.
    pub l: Array,
    /// `k x n`, orthonormal rows.
    pub q: Array,
}

/// What to put in Q for a rank-deficient column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Deficient {
    /// Leave the column zero.
    Zero,
    /// Fill with a unit vector orthogonal to the previous columns so Q stays
    /// orthogonal.
    Complete,
}

fn column_norm<T: Real>(v: &[T]) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt()
}

/// Orthogonalize `v` against the first `upto` columns of `q` (`m x k`).
fn project_out<T: Real>(v: &mut [T], q: &[T], m: usize, k: usize, upto: usize) {
    for c in 0..upto {
        let dot = (0..m).fold(T::zero(), |acc, i| acc + q[i * k + c] * v[i]);
        for i in 0..m {
            v[i] -= dot * q[i * k + c];
        }
    }
}

/// A unit vector orthogonal to the first `upto` columns of `q`, taken from
/// the standard basis.
fn complement<T: Real>(q: &[T], m: usize, k: usize, upto: usize) -> Vec<T> {
    let half = T::from_f64(0.5);
    let mut best = vec![T::zero(); m];
    let mut best_norm = T::zero();
    for e in 0..m {
        let mut v = vec![T::zero(); m];
        v[e] = T::ONE;
        project_out(&mut v, q, m, k, upto);
        project_out(&mut v, q, m, k, upto);
        let norm = column_norm(&v);
        if norm > best_norm {
            best_norm = norm;
            best = v;
            if best_norm > half {
                break;
            }
        }
    }
    if best_norm > T::zero() {
        for x in &mut best {
            *x = *x / best_norm;
        }
    }
    best
}

/// Modified Gram-Schmidt on a row-major `m x n` matrix. Returns `(Q, R)`.
pub(crate) fn qr_kernel<T: Real>(a: &[T], m: usize, n: usize, deficient: Deficient) -> (Vec<T>, Vec<T>) {
    let k = m.min(n);
    let tol = T::from_f64(QR_RANK_EPS);
    // Column-major working copy: cols[j] is column j of A.
    let mut cols: Vec<Vec<T>> = (0..n).map(|j| (0..m).map(|i| a[i * n + j]).collect()).collect();
    let mut q = vec![T::zero(); m * k];
    let mut r = vec![T::zero(); k * n];

    for j in 0..k {
        let norm = column_norm(&cols[j]);
        if norm < tol {
            if deficient == Deficient::Complete {
                let u = complement(&q, m, k, j);
                let along = (0..m).fold(T::zero(), |acc, i| acc + u[i] * cols[j][i]);
                r[j * n + j] = along;
                for i in 0..m {
                    q[i * k + j] = u[i];
                }
            }
        } else {
            r[j * n + j] = norm;
            for i in 0..m {
                q[i * k + j] = cols[j][i] / norm;
            }
        }

        for l in j + 1..n {
            let dot = (0..m).fold(T::zero(), |acc, i| acc + q[i * k + j] * cols[l][i]);
            r[j * n + l] = dot;
            for i in 0..m {
                let qi = q[i * k + j];
                cols[l][i] -= dot * qi;
            }
        }
    }
    (q, r)
}

fn qr_impl(op: &'static str, a: &Array, batched: bool) -> Result<Qr> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let (m, n) = (staged.rows(), staged.cols());
    let k = m.min(n);

    let parts = for_each_batch(staged.batch_count(), |i| {
        qr_kernel(&staged.blocks[i], m, n, Deficient::Zero)
    });
    let (qs, rs): (Vec<_>, Vec<_>) = parts.into_iter().unzip();

    let dtype = float_result(a.dtype());
    Ok(Qr {
        q: assemble(&staged.batch_shape, &[m, k], &qs, dtype)?,
        r: assemble(&staged.batch_shape, &[k, n], &rs, dtype)?,
    })
}

fn lq_impl(op: &'static str, a: &Array, batched: bool) -> Result<Lq> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let (m, n) = (staged.rows(), staged.cols());
    let k = m.min(n);

    // QR of A^T (n x m): Q' is n x k, R' is k x m.
    let parts = for_each_batch(staged.batch_count(), |i| {
        let at = transpose(&staged.blocks[i], m, n);
        let (qt, rt) = qr_kernel(&at, n, m, Deficient::Zero);
        (transpose(&rt, k, m), transpose(&qt, n, k))
    });
    let (ls, qs): (Vec<_>, Vec<_>) = parts.into_iter().unzip();

    let dtype = float_result(a.dtype());
    Ok(Lq {
        l: assemble(&staged.batch_shape, &[m, k], &ls, dtype)?,
        q: assemble(&staged.batch_shape, &[k, n], &qs, dtype)?,
    })
}

/// QR decomposition of a 2-D matrix.
pub fn qr(a: &Array) -> Result<Qr> {
    qr_impl("qr", a, false)
}

/// QR decomposition of every matrix in `[B..., m, n]`.
pub fn batched_qr(a: &Array) -> Result<Qr> {
    qr_impl("batched_qr", a, true)
}

/// LQ decomposition of a 2-D matrix: `A = L Q`.
pub fn lq(a: &Array) -> Result<Lq> {
    lq_impl("lq", a, false)
}

/// LQ decomposition of every matrix in `[B..., m, n]`.
pub fn batched_lq(a: &Array) -> Result<Lq> {
    lq_impl("batched_lq", a, true)
}
