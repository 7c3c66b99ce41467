//! Shape matching for binary ops: exact and broadcast policies.

use smallvec::SmallVec;
use tessera_core::{Layout, Result, TesseraError};

/// How two operand shapes must relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Policy {
    /// Same rank, same dimensions.
    #[default]
    Exact,
    /// NumPy-style broadcasting.
    Broadcast,
}

/// Fail unless `a` and `b` are identical shapes.
pub fn check_exact(a: &[usize], b: &[usize]) -> Result<()> {
    if a != b {
        return Err(TesseraError::ShapeMismatch {
            expected: a.to_vec(),
            got: b.to_vec(),
        });
    }
    Ok(())
}

/// Compute the broadcast shape of two shapes.
///
/// Rules (NumPy-style):
/// 1. Align shapes from the trailing dimension.
/// 2. For each dimension pair: must be equal, or one must be 1.
/// 3. The output dimension is the max of the two.
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut out = vec![0; ndim];
    for i in 0..ndim {
        let da = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let db = if i < b.len() { b[b.len() - 1 - i] } else { 1 };
        out[ndim - 1 - i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(TesseraError::Broadcast {
                lhs: a.to_vec(),
                rhs: b.to_vec(),
            });
        };
    }
    Ok(out)
}

/// Result shape of a binary op under `policy`.
pub fn result_shape(policy: Policy, a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    match policy {
        Policy::Exact => check_exact(a, b).map(|()| a.to_vec()),
        Policy::Broadcast => broadcast_shapes(a, b),
    }
}

/// Layout that reads `layout`'s elements as if stretched to `target`.
///
/// Stretched and prepended axes get stride 0. `target` must be a valid
/// broadcast of `layout.shape()`.
pub fn broadcast_layout(layout: &Layout, target: &[usize]) -> Layout {
    let shape = layout.shape();
    let lead = target.len() - shape.len();
    let strides: SmallVec<[usize; 4]> = (0..target.len())
        .map(|i| {
            if i < lead || shape[i - lead] != target[i] {
                0
            } else {
                layout.strides()[i - lead]
            }
        })
        .collect();
    Layout::new(target, &strides, layout.offset())
}
