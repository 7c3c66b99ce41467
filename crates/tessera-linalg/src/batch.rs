//! Validation, float32 staging, and batching over leading dimensions.
//!
//! Every op stages its operands into float32 working copies, one per
//! trailing matrix (or vector), runs its kernel on each independently, and
//! reassembles the per-batch results into a fresh owned array.

use tessera_core::{Array, DType, Result, TesseraError};
use tracing::debug;

use crate::dense::Real;

/// Fail unless `a` is exactly 2-D (`batched == false`) or at least 3-D.
pub(crate) fn require_ndim(op: &'static str, a: &Array, batched: bool) -> Result<()> {
    let (ok, expected) = if batched {
        (a.ndim() >= 3, ">= 3")
    } else {
        (a.ndim() == 2, "2")
    };
    if !ok {
        return Err(TesseraError::DimensionMismatch {
            op,
            expected: expected.into(),
            got: a.ndim(),
        });
    }
    Ok(())
}

pub(crate) fn require_square(op: &'static str, rows: usize, cols: usize) -> Result<()> {
    if rows != cols {
        return Err(TesseraError::NotSquare { op, rows, cols });
    }
    Ok(())
}

/// Float32 working copies of the trailing blocks of an array.
pub(crate) struct Staged {
    /// Leading (batch) dimensions.
    pub batch_shape: Vec<usize>,
    /// Trailing block dimensions.
    pub inner_shape: Vec<usize>,
    /// One contiguous row-major block per batch entry.
    pub blocks: Vec<Vec<f32>>,
}

impl Staged {
    pub fn rows(&self) -> usize {
        self.inner_shape[0]
    }

    pub fn cols(&self) -> usize {
        self.inner_shape.get(1).copied().unwrap_or(1)
    }

    pub fn batch_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Split `a` into float32 blocks over its last `trailing` dimensions.
pub(crate) fn stage(op: &'static str, a: &Array, trailing: usize) -> Result<Staged> {
    let split = a.ndim() - trailing;
    let batch_shape = a.shape()[..split].to_vec();
    let inner_shape = a.shape()[split..].to_vec();
    let block: usize = inner_shape.iter().product();
    if block == 0 {
        return Err(TesseraError::InvalidArgument(format!(
            "{op}: empty operand of shape {:?}",
            a.shape()
        )));
    }
    let data = a.to_vec_f32();
    let blocks: Vec<Vec<f32>> = data.chunks(block).map(<[f32]>::to_vec).collect();
    debug!(
        op,
        batches = blocks.len(),
        ?inner_shape,
        source = %a.dtype(),
        "staged float32 working copies"
    );
    Ok(Staged {
        batch_shape,
        inner_shape,
        blocks,
    })
}

/// Run `f` on every batch index and collect the results in order.
#[cfg(not(feature = "rayon"))]
pub(crate) fn for_each_batch<T, F>(count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    (0..count).map(f).collect()
}

/// Run `f` on every batch index across the rayon pool, results in order.
#[cfg(feature = "rayon")]
pub(crate) fn for_each_batch<T, F>(count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Concatenate per-batch results into an owned array of shape
/// `batch_shape ++ inner_shape`, converted to `dtype`.
pub(crate) fn assemble<T: Real>(
    batch_shape: &[usize],
    inner_shape: &[usize],
    parts: &[Vec<T>],
    dtype: DType,
) -> Result<Array> {
    let mut shape = batch_shape.to_vec();
    shape.extend_from_slice(inner_shape);
    let data: Vec<f64> = parts.iter().flatten().map(|&x| x.to_f64()).collect();
    Array::from_f64(&data, &shape, dtype)
}

/// Shape of a per-matrix scalar result (det, rank): `[1]` for a single
/// matrix, the batch shape otherwise.
pub(crate) fn scalar_result_shape(batch_shape: &[usize]) -> (&[usize], &'static [usize]) {
    if batch_shape.is_empty() {
        (batch_shape, &[1])
    } else {
        (batch_shape, &[])
    }
}
