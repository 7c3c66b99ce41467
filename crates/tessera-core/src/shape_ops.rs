//! Shaping: transpose, permute, flatten, squeeze, expand_dims, reshape.

use crate::layout::Layout;
use crate::{Array, Result, TesseraError};

fn validate_permutation(axes: &[usize], ndim: usize) -> Result<()> {
    if axes.len() != ndim {
        return Err(TesseraError::InvalidArgument(format!(
            "permute: {} axes given for ndim {ndim}",
            axes.len()
        )));
    }
    let mut seen = vec![false; ndim];
    for &a in axes {
        if a >= ndim {
            return Err(TesseraError::InvalidAxis {
                axis: a as isize,
                ndim,
            });
        }
        if seen[a] {
            return Err(TesseraError::InvalidArgument(format!(
                "permute: axis {a} repeated in {axes:?}"
            )));
        }
        seen[a] = true;
    }
    Ok(())
}

impl Array {
    /// View with axes reordered: axis `k` of the result is `axes[k]` of `self`.
    pub fn permute_view(&self, axes: &[usize]) -> Result<Array> {
        validate_permutation(axes, self.ndim())?;
        Ok(self.derive_view(self.layout().permuted(axes)))
    }

    /// View with all axes reversed.
    pub fn transpose_view(&self) -> Array {
        let axes: Vec<usize> = (0..self.ndim()).rev().collect();
        self.derive_view(self.layout().permuted(&axes))
    }

    /// Owned copy with all axes reversed.
    pub fn transpose(&self) -> Array {
        self.transpose_view().contiguous()
    }

    /// Owned 1-D copy in row-major order.
    pub fn flatten(&self) -> Array {
        let size = self.size();
        self.contiguous().relayout(Layout::contiguous(&[size]))
    }

    /// Drop size-1 axes: all of them, or only `axis`.
    ///
    /// Never produces a rank-0 array; squeezing every axis of a size-1
    /// array leaves shape `[1]`.
    pub fn squeeze(&self, axis: Option<usize>) -> Result<Array> {
        let ndim = self.ndim();
        let keep: Vec<usize> = match axis {
            Some(a) => {
                if a >= ndim {
                    return Err(TesseraError::InvalidAxis {
                        axis: a as isize,
                        ndim,
                    });
                }
                if self.shape()[a] != 1 {
                    return Err(TesseraError::InvalidArgument(format!(
                        "squeeze: axis {a} has size {}, expected 1",
                        self.shape()[a]
                    )));
                }
                (0..ndim).filter(|&i| i != a).collect()
            }
            None => (0..ndim).filter(|&i| self.shape()[i] != 1).collect(),
        };

        if keep.is_empty() {
            return Ok(self.derive_view(Layout::new(&[1], &[1], self.offset())));
        }
        let shape: Vec<usize> = keep.iter().map(|&i| self.shape()[i]).collect();
        let strides: Vec<usize> = keep.iter().map(|&i| self.strides()[i]).collect();
        Ok(self.derive_view(self.layout().with_shape(&shape, &strides)))
    }

    /// Insert a size-1 axis at position `axis` (`0..=ndim`).
    pub fn expand_dims(&self, axis: usize) -> Result<Array> {
        let ndim = self.ndim();
        if axis > ndim {
            return Err(TesseraError::InvalidAxis {
                axis: axis as isize,
                ndim,
            });
        }
        let mut shape = self.shape().to_vec();
        let mut strides = self.strides().to_vec();
        // A size-1 axis is never stepped; reuse the neighbouring extent so
        // contiguous inputs stay contiguous.
        let stride = if axis < ndim {
            shape[axis] * strides[axis]
        } else {
            1
        };
        shape.insert(axis, 1);
        strides.insert(axis, stride);
        Ok(self.derive_view(self.layout().with_shape(&shape, &strides)))
    }

    /// View when `self` is contiguous, owned copy otherwise.
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Array> {
        if self.is_contiguous() {
            self.reshape_view(new_shape)
        } else {
            let packed = self.contiguous();
            let layout = packed.reshape_view(new_shape)?.layout().clone();
            Ok(packed.relayout(layout))
        }
    }
}
