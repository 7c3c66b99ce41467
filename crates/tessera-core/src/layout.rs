//! Layout: shape, strides, backstrides and offset of an array into its buffer.

use smallvec::SmallVec;

/// Most arrays have 4 or fewer dimensions.
const STACK_DIMS: usize = 4;

pub type Dims = SmallVec<[usize; STACK_DIMS]>;

/// Address of element `[i0, i1, ..., in]` is
/// `offset + i0 * strides[0] + ... + in * strides[n]`, in elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    shape: Dims,
    strides: Dims,
    backstrides: Dims,
    offset: usize,
}

/// Row-major strides for `shape`, cumulative product from the right.
pub fn contiguous_strides(shape: &[usize]) -> Dims {
    let mut strides: Dims = SmallVec::from_elem(0, shape.len());
    let mut stride = 1usize;
    for (i, &dim) in shape.iter().enumerate().rev() {
        strides[i] = stride;
        stride *= dim;
    }
    strides
}

impl Layout {
    /// Row-major layout with zero offset.
    pub fn contiguous(shape: &[usize]) -> Self {
        let strides = contiguous_strides(shape);
        Self {
            shape: shape.iter().copied().collect(),
            backstrides: strides.clone(),
            strides,
            offset: 0,
        }
    }

    pub fn new(shape: &[usize], strides: &[usize], offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape: shape.iter().copied().collect(),
            strides: strides.iter().copied().collect(),
            backstrides: strides.iter().copied().collect(),
            offset,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[inline]
    pub fn backstrides(&self) -> &[usize] {
        &self.backstrides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Strides follow the row-major formula and the offset is zero.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == contiguous_strides(&self.shape)
    }

    /// Buffer offset of a multi-index, or `None` if out of bounds.
    pub fn index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }
        let mut linear = self.offset;
        for ((&i, &dim), &stride) in indices.iter().zip(&self.shape).zip(&self.strides) {
            if i >= dim {
                return None;
            }
            linear += i * stride;
        }
        Some(linear)
    }

    /// Reorder axes: axis `k` of the result is axis `axes[k]` of `self`.
    /// `axes` must already be a validated permutation.
    pub fn permuted(&self, axes: &[usize]) -> Self {
        Self {
            shape: axes.iter().map(|&a| self.shape[a]).collect(),
            strides: axes.iter().map(|&a| self.strides[a]).collect(),
            backstrides: axes.iter().map(|&a| self.backstrides[a]).collect(),
            offset: self.offset,
        }
    }

    /// Same offset, new shape and strides.
    pub fn with_shape(&self, shape: &[usize], strides: &[usize]) -> Self {
        Self::new(shape, strides, self.offset)
    }

    /// Buffer offsets of every element, in logical row-major order.
    pub fn offsets(&self) -> OffsetIter<'_> {
        OffsetIter {
            layout: self,
            counter: SmallVec::from_elem(0, self.ndim()),
            current: self.offset,
            remaining: self.numel(),
        }
    }
}

/// Odometer over a layout's logical indices, yielding buffer offsets.
pub struct OffsetIter<'a> {
    layout: &'a Layout,
    counter: Dims,
    current: usize,
    remaining: usize,
}

impl Iterator for OffsetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let out = self.current;
        self.remaining -= 1;
        if self.remaining > 0 {
            // Advance the innermost axis; wrapped axes rewind via backstrides.
            for axis in (0..self.layout.ndim()).rev() {
                let dim = self.layout.shape[axis];
                if self.counter[axis] + 1 < dim {
                    self.counter[axis] += 1;
                    self.current += self.layout.strides[axis];
                    break;
                }
                self.current -= self.layout.backstrides[axis] * self.counter[axis];
                self.counter[axis] = 0;
            }
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for OffsetIter<'_> {}
