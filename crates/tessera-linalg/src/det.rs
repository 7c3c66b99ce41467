//! Determinant by Gaussian elimination with partial pivoting.

use tessera_core::{Array, Result};

use crate::batch::{
    assemble, for_each_batch, require_ndim, require_square, scalar_result_shape, stage,
};
use crate::dense::{pivot_row, swap_rows};

/// Pivots smaller than this in magnitude make the determinant 0.
pub const DET_PIVOT_EPS: f32 = 1e-6;

pub(crate) fn det_kernel(a: &[f32], n: usize) -> f32 {
    let mut m = a.to_vec();
    let mut det = 1.0f32;
    for col in 0..n {
        let p = pivot_row(&m, n, col, col, n);
        if m[p * n + col].abs() < DET_PIVOT_EPS {
            return 0.0;
        }
        if p != col {
            swap_rows(&mut m, n, p, col);
            det = -det;
        }
        let pivot = m[col * n + col];
        det *= pivot;
        for r in col + 1..n {
            let factor = m[r * n + col] / pivot;
            for c in col..n {
                m[r * n + c] -= factor * m[col * n + c];
            }
        }
    }
    det
}

fn det_impl(op: &'static str, a: &Array, batched: bool) -> Result<Array> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let n = staged.rows();
    require_square(op, n, staged.cols())?;

    let dets = for_each_batch(staged.batch_count(), |i| vec![det_kernel(&staged.blocks[i], n)]);
    let (batch, inner) = scalar_result_shape(&staged.batch_shape);
    assemble(batch, inner, &dets, a.dtype())
}

/// Determinant of a square 2-D matrix, as shape `[1]` in `a`'s kind.
pub fn det(a: &Array) -> Result<Array> {
    det_impl("det", a, false)
}

/// Determinants of `[B..., n, n]`, as shape `[B...]`.
pub fn batched_det(a: &Array) -> Result<Array> {
    det_impl("batched_det", a, true)
}
