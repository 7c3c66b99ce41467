//! Linear systems: exact solve for square `A`, least squares through the
//! normal equations.
//!
//! The right-hand side is a vector (`b.ndim() == a.ndim() - 1`) or a stack of
//! `k` columns (`b.ndim() == a.ndim()`); its leading batch dimensions must
//! equal `a`'s.

use tessera_core::{Array, Result, TesseraError};
use tessera_ops::promote;

use crate::batch::{Staged, assemble, for_each_batch, require_ndim, require_square, stage};
use crate::dense::{Real, matmul, pivot_row, swap_rows, transpose};

/// Gaussian elimination with partial pivoting on `[A | B]`, then back
/// substitution. `A` is `n x n`, `B` is `n x k`; returns `X` (`n x k`).
fn solve_kernel<T: Real>(a: &[T], b: &[T], n: usize, k: usize) -> Vec<T> {
    let w = n + k;
    let mut m = vec![T::zero(); n * w];
    for i in 0..n {
        m[i * w..i * w + n].copy_from_slice(&a[i * n..(i + 1) * n]);
        m[i * w + n..(i + 1) * w].copy_from_slice(&b[i * k..(i + 1) * k]);
    }

    for col in 0..n {
        let p = pivot_row(&m, w, col, col, n);
        swap_rows(&mut m, w, p, col);
        let pivot = m[col * w + col];
        for r in col + 1..n {
            let factor = m[r * w + col] / pivot;
            for c in col..w {
                let v = m[col * w + c];
                m[r * w + c] -= factor * v;
            }
        }
    }

    let mut x = vec![T::zero(); n * k];
    for j in 0..k {
        for i in (0..n).rev() {
            let mut s = m[i * w + n + j];
            for c in i + 1..n {
                s -= m[i * w + c] * x[c * k + j];
            }
            x[i * k + j] = s / m[i * w + i];
        }
    }
    x
}

/// Stage `a` and `b` and check that they pair up. Returns whether `b` is a
/// vector right-hand side.
fn stage_system(op: &'static str, a: &Array, b: &Array, batched: bool) -> Result<(Staged, Staged, bool)> {
    require_ndim(op, a, batched)?;
    let vector = if b.ndim() + 1 == a.ndim() {
        true
    } else if b.ndim() == a.ndim() {
        false
    } else {
        return Err(TesseraError::DimensionMismatch {
            op,
            expected: format!("{} or {}", a.ndim() - 1, a.ndim()),
            got: b.ndim(),
        });
    };

    let sa = stage(op, a, 2)?;
    let sb = stage(op, b, if vector { 1 } else { 2 })?;
    if sa.batch_shape != sb.batch_shape || sa.rows() != sb.rows() {
        return Err(TesseraError::ShapeMismatch {
            expected: a.shape().to_vec(),
            got: b.shape().to_vec(),
        });
    }
    Ok((sa, sb, vector))
}

fn solve_impl(op: &'static str, a: &Array, b: &Array, batched: bool) -> Result<Array> {
    let (sa, sb, vector) = stage_system(op, a, b, batched)?;
    let n = sa.rows();
    require_square(op, n, sa.cols())?;
    let k = sb.cols();

    let parts = for_each_batch(sa.batch_count(), |i| {
        solve_kernel(&sa.blocks[i], &sb.blocks[i], n, k)
    });
    let inner: &[usize] = if vector { &[n] } else { &[n, k] };
    assemble(&sa.batch_shape, inner, &parts, promote(a.dtype(), b.dtype()))
}

fn lstsq_impl(op: &'static str, a: &Array, b: &Array, batched: bool) -> Result<Array> {
    let (sa, sb, vector) = stage_system(op, a, b, batched)?;
    let (m, n) = (sa.rows(), sa.cols());
    let k = sb.cols();

    let parts = for_each_batch(sa.batch_count(), |i| {
        let at = transpose(&sa.blocks[i], m, n);
        let ata = matmul(&at, &sa.blocks[i], n, m, n);
        let atb = matmul(&at, &sb.blocks[i], n, m, k);
        solve_kernel(&ata, &atb, n, k)
    });
    let inner: &[usize] = if vector { &[n] } else { &[n, k] };
    assemble(&sa.batch_shape, inner, &parts, promote(a.dtype(), b.dtype()))
}

/// Solve `A x = b` for square 2-D `A`; the result has `b`'s shape.
///
/// Singular `A` is not detected and yields IEEE inf/NaN.
pub fn solve(a: &Array, b: &Array) -> Result<Array> {
    solve_impl("solve", a, b, false)
}

/// [`solve`] for every system in `[B..., n, n]` against `[B..., n]` or
/// `[B..., n, k]`.
pub fn batched_solve(a: &Array, b: &Array) -> Result<Array> {
    solve_impl("batched_solve", a, b, true)
}

/// Least-squares solution of `A x ≈ b` for `A` of shape `m x n`; the result
/// is `[n]` or `[n, k]`.
pub fn lstsq(a: &Array, b: &Array) -> Result<Array> {
    lstsq_impl("lstsq", a, b, false)
}

pub fn batched_lstsq(a: &Array, b: &Array) -> Result<Array> {
    lstsq_impl("batched_lstsq", a, b, true)
}
