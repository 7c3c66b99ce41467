//! Matrix inverse by Gauss-Jordan elimination on `[A | I]`.
//!
//! Singular input is not detected: a zero pivot propagates IEEE inf/NaN into
//! the result.

use tessera_core::{Array, Result};

use crate::batch::{assemble, for_each_batch, require_ndim, require_square, stage};
use crate::dense::{pivot_row, swap_rows};

fn inv_kernel(a: &[f32], n: usize) -> Vec<f32> {
    let w = 2 * n;
    let mut m = vec![0.0f32; n * w];
    for i in 0..n {
        m[i * w..i * w + n].copy_from_slice(&a[i * n..(i + 1) * n]);
        m[i * w + n + i] = 1.0;
    }

    for col in 0..n {
        let p = pivot_row(&m, w, col, col, n);
        swap_rows(&mut m, w, p, col);
        let pivot = m[col * w + col];
        for c in 0..w {
            m[col * w + c] /= pivot;
        }
        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = m[r * w + col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..w {
                m[r * w + c] -= factor * m[col * w + c];
            }
        }
    }

    let mut out = Vec::with_capacity(n * n);
    for i in 0..n {
        out.extend_from_slice(&m[i * w + n..(i + 1) * w]);
    }
    out
}

fn inv_impl(op: &'static str, a: &Array, batched: bool) -> Result<Array> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let n = staged.rows();
    require_square(op, n, staged.cols())?;

    let parts = for_each_batch(staged.batch_count(), |i| inv_kernel(&staged.blocks[i], n));
    assemble(&staged.batch_shape, &[n, n], &parts, a.dtype())
}

/// Inverse of a square 2-D matrix, in `a`'s kind.
pub fn inv(a: &Array) -> Result<Array> {
    inv_impl("inv", a, false)
}

/// Inverse of every matrix in `[B..., n, n]`.
pub fn batched_inv(a: &Array) -> Result<Array> {
    inv_impl("batched_inv", a, true)
}
