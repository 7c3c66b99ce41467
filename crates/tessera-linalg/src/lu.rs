//! LU decomposition with partial pivoting: `P A = L U`.

use tessera_core::{Array, DType, Result};
use tessera_ops::float_result;

use crate::batch::{assemble, for_each_batch, require_ndim, require_square, stage};
use crate::dense::{identity, pivot_row, swap_rows};

/// Factors of an LU decomposition.
#[derive(Debug)]
pub struct Lu {
    /// Unit lower-triangular factor.
    pub l: Array,
    /// Upper-triangular factor.
    pub u: Array,
    /// `perm[i]` is the original row now at row `i` (int64).
    pub perm: Array,
}

struct LuParts {
    l: Vec<f32>,
    u: Vec<f32>,
    perm: Vec<f32>,
}

fn lu_kernel(a: &[f32], n: usize) -> LuParts {
    let mut u = a.to_vec();
    let mut l = identity::<f32>(n);
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let p = pivot_row(&u, n, k, k, n);
        if p != k {
            swap_rows(&mut u, n, p, k);
            perm.swap(p, k);
            // Multipliers already computed move with their rows.
            for c in 0..k {
                l.swap(p * n + c, k * n + c);
            }
        }
        let pivot = u[k * n + k];
        if pivot == 0.0 {
            continue;
        }
        for r in k + 1..n {
            let factor = u[r * n + k] / pivot;
            l[r * n + k] = factor;
            for c in k..n {
                u[r * n + c] -= factor * u[k * n + c];
            }
            u[r * n + k] = 0.0;
        }
    }
    LuParts {
        l,
        u,
        perm: perm.into_iter().map(|i| i as f32).collect(),
    }
}

fn lu_impl(op: &'static str, a: &Array, batched: bool) -> Result<Lu> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let n = staged.rows();
    require_square(op, n, staged.cols())?;

    let parts = for_each_batch(staged.batch_count(), |i| lu_kernel(&staged.blocks[i], n));
    let (ls, (us, perms)): (Vec<_>, (Vec<_>, Vec<_>)) =
        parts.into_iter().map(|p| (p.l, (p.u, p.perm))).unzip();

    let dtype = float_result(a.dtype());
    Ok(Lu {
        l: assemble(&staged.batch_shape, &[n, n], &ls, dtype)?,
        u: assemble(&staged.batch_shape, &[n, n], &us, dtype)?,
        perm: assemble(&staged.batch_shape, &[n], &perms, DType::I64)?,
    })
}

/// LU decomposition of a square 2-D matrix.
pub fn lu(a: &Array) -> Result<Lu> {
    lu_impl("lu", a, false)
}

/// LU decomposition of every matrix in `[B..., n, n]`.
pub fn batched_lu(a: &Array) -> Result<Lu> {
    lu_impl("batched_lu", a, true)
}
