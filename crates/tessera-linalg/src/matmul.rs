//! Matrix product over the last two dimensions.
//!
//! Accepts `[m, k] @ [k, n]`, stacks with identical leading dimensions, and a
//! single 2-D operand against a stack (reused for every batch entry).

use tessera_core::{Array, Result, TesseraError};
use tessera_ops::promote;

use crate::batch::{assemble, for_each_batch, stage};
use crate::dense;

pub fn matmul(a: &Array, b: &Array) -> Result<Array> {
    if a.ndim() < 2 || b.ndim() < 2 {
        return Err(TesseraError::DimensionMismatch {
            op: "matmul",
            expected: ">= 2".into(),
            got: a.ndim().min(b.ndim()),
        });
    }
    let sa = stage("matmul", a, 2)?;
    let sb = stage("matmul", b, 2)?;

    let (m, k, n) = (sa.rows(), sa.cols(), sb.cols());
    let batch_ok = sa.batch_shape.is_empty()
        || sb.batch_shape.is_empty()
        || sa.batch_shape == sb.batch_shape;
    if k != sb.rows() || !batch_ok {
        return Err(TesseraError::ShapeMismatch {
            expected: a.shape().to_vec(),
            got: b.shape().to_vec(),
        });
    }

    let batch_shape = if sa.batch_shape.is_empty() {
        &sb.batch_shape
    } else {
        &sa.batch_shape
    };
    let count = sa.batch_count().max(sb.batch_count());
    let parts = for_each_batch(count, |i| {
        let ai = if sa.batch_shape.is_empty() { 0 } else { i };
        let bi = if sb.batch_shape.is_empty() { 0 } else { i };
        dense::matmul(&sa.blocks[ai], &sb.blocks[bi], m, k, n)
    });
    assemble(batch_shape, &[m, n], &parts, promote(a.dtype(), b.dtype()))
}
