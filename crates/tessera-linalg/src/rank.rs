//! Matrix rank by row-echelon reduction.

use tessera_core::{Array, Result};

use crate::batch::{assemble, for_each_batch, require_ndim, scalar_result_shape, stage};
use crate::dense::{pivot_row, swap_rows};

/// Pivots at or below this magnitude do not count toward the rank.
pub const RANK_EPS: f64 = 1e-10;

/// Reduction runs in f64 so that float32 rounding residue stays under
/// [`RANK_EPS`].
fn rank_kernel(a: &[f32], m: usize, n: usize) -> f64 {
    let mut w: Vec<f64> = a.iter().map(|&x| f64::from(x)).collect();
    let mut rank = 0;
    for col in 0..n {
        if rank == m {
            break;
        }
        let p = pivot_row(&w, n, col, rank, m);
        if w[p * n + col].abs() <= RANK_EPS {
            continue;
        }
        swap_rows(&mut w, n, p, rank);
        let pivot = w[rank * n + col];
        for r in rank + 1..m {
            let factor = w[r * n + col] / pivot;
            for c in col..n {
                w[r * n + c] -= factor * w[rank * n + c];
            }
        }
        rank += 1;
    }
    rank as f64
}

fn rank_impl(op: &'static str, a: &Array, batched: bool) -> Result<Array> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let (m, n) = (staged.rows(), staged.cols());

    let ranks = for_each_batch(staged.batch_count(), |i| {
        vec![rank_kernel(&staged.blocks[i], m, n)]
    });
    let (batch, inner) = scalar_result_shape(&staged.batch_shape);
    assemble(batch, inner, &ranks, a.dtype())
}

/// Rank of a 2-D matrix, as shape `[1]` in `a`'s kind.
pub fn matrix_rank(a: &Array) -> Result<Array> {
    rank_impl("matrix_rank", a, false)
}

/// Ranks of `[B..., m, n]`, as shape `[B...]`.
pub fn batched_matrix_rank(a: &Array) -> Result<Array> {
    rank_impl("batched_matrix_rank", a, true)
}
