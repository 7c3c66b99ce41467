//! `Array`: a strided window onto shared, kind-tagged storage.
//!
//! An array created by a factory is an *owner*; arrays derived by
//! [`Array::view`], [`Array::reshape_view`], [`Array::slice_view`] and the
//! permuting shape ops are *views*. Both hold a [`Storage`] handle, so the
//! buffer outlives whichever handle is dropped last and is released exactly
//! once. The owner/view tag is descriptive only.

use tracing::{debug, warn};

use crate::layout::{Layout, contiguous_strides};
use crate::storage::{Buffer, Storage};
use crate::{DType, Result, TesseraError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    Owner,
    View,
}

/// Outcome of [`Array::delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// This was the last handle; the buffer was freed.
    Freed,
    /// Other handles still reference the buffer.
    Shared { remaining: usize },
}

/// Element count of `shape`, which needs at least one axis, no zero
/// dimension and a product that fits in `usize`.
pub(crate) fn checked_size(op: &str, shape: &[usize]) -> Result<usize> {
    if shape.is_empty() {
        return Err(TesseraError::InvalidArgument(format!(
            "{op}: ndim must be at least 1"
        )));
    }
    let size = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            TesseraError::InvalidArgument(format!("{op}: shape {shape:?} overflows usize"))
        })?;
    if size == 0 {
        return Err(TesseraError::InvalidArgument(format!(
            "{op}: shape {shape:?} has zero size"
        )));
    }
    Ok(size)
}

#[derive(Debug)]
pub struct Array {
    storage: Storage,
    layout: Layout,
    dtype: DType,
    origin: Origin,
}

impl Array {
    // ── Constructors ────────────────────────────────────────────────────

    /// Create an owned array from float32 data, converted to `dtype`.
    ///
    /// Fails if `data` is empty, `shape` is empty, any dimension is zero, or
    /// `data.len()` differs from the product of `shape`.
    pub fn create(data: &[f32], shape: &[usize], dtype: DType) -> Result<Self> {
        if data.is_empty() {
            return Err(TesseraError::InvalidArgument(
                "create: data is empty".into(),
            ));
        }
        let size = checked_size("create", shape)?;
        if data.len() != size {
            return Err(TesseraError::InvalidArgument(format!(
                "create: data length {} does not match shape {:?} (expected {})",
                data.len(),
                shape,
                size
            )));
        }
        Ok(Self::from_buffer_unchecked(
            Buffer::from_f32(data, dtype),
            shape,
        ))
    }

    /// Wrap a densely packed buffer as an owned row-major array.
    ///
    /// `shape` follows the same rules as [`Array::create`].
    pub fn from_buffer(buffer: Buffer, shape: &[usize]) -> Result<Self> {
        let size = checked_size("from_buffer", shape)?;
        if buffer.len() != size {
            return Err(TesseraError::InvalidArgument(format!(
                "buffer length {} does not match shape {:?} (expected {})",
                buffer.len(),
                shape,
                size
            )));
        }
        Ok(Self::from_buffer_unchecked(buffer, shape))
    }

    /// Owned array from float64 values converted to `dtype`.
    pub fn from_f64(data: &[f64], shape: &[usize], dtype: DType) -> Result<Self> {
        Self::from_buffer(Buffer::from_f64(data, dtype), shape)
    }

    fn from_buffer_unchecked(buffer: Buffer, shape: &[usize]) -> Self {
        Self {
            dtype: buffer.dtype(),
            storage: Storage::new(buffer),
            layout: Layout::contiguous(shape),
            origin: Origin::Owner,
        }
    }

    /// A view of the same buffer through `layout`.
    pub(crate) fn derive_view(&self, layout: Layout) -> Array {
        Array {
            storage: self.storage.clone(),
            layout,
            dtype: self.dtype,
            origin: Origin::View,
        }
    }

    /// Same handle, new layout over the same elements.
    pub(crate) fn relayout(mut self, layout: Layout) -> Array {
        self.layout = layout;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    pub fn backstrides(&self) -> &[usize] {
        self.layout.backstrides()
    }

    pub fn offset(&self) -> usize {
        self.layout.offset()
    }

    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Number of logical elements.
    pub fn size(&self) -> usize {
        self.layout.numel()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn is_view(&self) -> bool {
        self.origin == Origin::View
    }

    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Live handles (this one included) to the underlying buffer.
    pub fn handle_count(&self) -> usize {
        self.storage.handle_count()
    }

    /// Whether `self` and `other` alias the same buffer.
    pub fn shares_buffer_with(&self, other: &Array) -> bool {
        self.storage.same_buffer(&other.storage)
    }

    // ── Element access ──────────────────────────────────────────────────

    fn buffer_index(&self, index: &[usize]) -> Result<usize> {
        self.layout.index(index).ok_or_else(|| {
            TesseraError::InvalidArgument(format!(
                "index {index:?} out of bounds for shape {:?}",
                self.shape()
            ))
        })
    }

    /// Read one element as f64.
    pub fn get(&self, index: &[usize]) -> Result<f64> {
        let at = self.buffer_index(index)?;
        Ok(self.storage.read().get_f64(at))
    }

    /// Write one element, converted to this array's kind. The write is
    /// visible through every handle to the buffer.
    pub fn set(&self, index: &[usize], value: f64) -> Result<()> {
        let at = self.buffer_index(index)?;
        self.storage.write().set_f64(at, value);
        Ok(())
    }

    /// The single element of a size-1 array.
    pub fn item(&self) -> Result<f64> {
        if self.size() != 1 {
            return Err(TesseraError::InvalidArgument(format!(
                "item: array of shape {:?} has {} elements",
                self.shape(),
                self.size()
            )));
        }
        let at = self.layout.offset();
        Ok(self.storage.read().get_f64(at))
    }

    /// Elements in logical row-major order, staged through float32.
    pub fn to_vec_f32(&self) -> Vec<f32> {
        self.storage.read().gather_f32(self.layout.offsets())
    }

    /// Elements in logical row-major order, widened to float64.
    pub fn to_vec_f64(&self) -> Vec<f64> {
        self.storage.read().gather_f64(self.layout.offsets())
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// A view with its own copy of shape and strides.
    pub fn view(&self) -> Array {
        self.derive_view(self.layout.clone())
    }

    /// View with a new shape over the same elements.
    ///
    /// Requires `self` to be contiguous; call [`Array::contiguous`] first
    /// otherwise.
    pub fn reshape_view(&self, new_shape: &[usize]) -> Result<Array> {
        if new_shape.is_empty() || new_shape.contains(&0) {
            return Err(TesseraError::InvalidArgument(format!(
                "reshape: invalid target shape {new_shape:?}"
            )));
        }
        let new_size = checked_size("reshape", new_shape)?;
        if new_size != self.size() {
            return Err(TesseraError::InvalidArgument(format!(
                "reshape: cannot reshape {} elements of shape {:?} into {:?}",
                self.size(),
                self.shape(),
                new_shape
            )));
        }
        if !self.is_contiguous() {
            return Err(TesseraError::NotContiguous);
        }
        let strides = contiguous_strides(new_shape);
        Ok(self.derive_view(self.layout.with_shape(new_shape, &strides)))
    }

    /// Strided sub-array view.
    ///
    /// Each of `starts`, `ends`, `steps` is either `None` (defaults 0, dim,
    /// 1 on every axis) or one entry per axis. A step of 0 means 1. A start
    /// past the end of its axis clamps to the last index, an end past it
    /// clamps to the dimension, and a reversed range gives an empty axis.
    pub fn slice_view(
        &self,
        starts: Option<&[usize]>,
        ends: Option<&[usize]>,
        steps: Option<&[usize]>,
    ) -> Result<Array> {
        let ndim = self.ndim();
        for (name, arg) in [("starts", starts), ("ends", ends), ("steps", steps)] {
            match arg {
                Some(v) if v.len() != ndim => {
                    return Err(TesseraError::InvalidArgument(format!(
                        "slice: {name} has {} entries for ndim {ndim}",
                        v.len()
                    )));
                }
                _ => {}
            }
        }

        let mut shape = Vec::with_capacity(ndim);
        let mut strides = Vec::with_capacity(ndim);
        let mut offset = self.offset();
        for axis in 0..ndim {
            let dim = self.shape()[axis];
            let stride = self.strides()[axis];
            let start = starts.map_or(0, |s| s[axis]).min(dim.saturating_sub(1));
            let end = ends.map_or(dim, |e| e[axis]).min(dim);
            // Any step of at least `dim` selects only `start`.
            let step = steps.map_or(1, |s| s[axis]).clamp(1, dim.max(1));

            let len = if end > start {
                (end - start).div_ceil(step)
            } else {
                0
            };
            shape.push(len);
            strides.push(stride * step);
            offset += start * stride;
        }
        Ok(self.derive_view(Layout::new(&shape, &strides, offset)))
    }

    // ── Materialization ─────────────────────────────────────────────────

    fn packed_buffer(&self) -> Buffer {
        let buffer = self.storage.read();
        if self.is_contiguous() {
            buffer.gather(0..self.size())
        } else {
            debug!(shape = ?self.shape(), strides = ?self.strides(), "gathering strided array");
            buffer.gather(self.layout.offsets())
        }
    }

    /// An owned, densely packed row-major copy.
    pub fn contiguous(&self) -> Array {
        Self::from_buffer_unchecked(self.packed_buffer(), self.shape())
    }

    /// Re-pack `self` into row-major layout.
    ///
    /// When `self` is the only handle the buffer is rewritten in place;
    /// otherwise `self` moves onto a fresh buffer and stops aliasing the
    /// other handles.
    pub fn make_contiguous_inplace(&mut self) {
        if self.is_contiguous() {
            return;
        }
        let packed = self.packed_buffer();
        if self.storage.is_unique() {
            *self.storage.write() = packed;
        } else {
            warn!(
                handles = self.storage.handle_count(),
                "make_contiguous_inplace: buffer is shared, detaching"
            );
            self.storage = Storage::new(packed);
            self.origin = Origin::Owner;
        }
        self.layout = Layout::contiguous(self.layout.shape());
    }

    /// Owned copy converted to `dtype`, staged through float32.
    pub fn cast(&self, dtype: DType) -> Array {
        let staged = self.packed_buffer().cast_staged(dtype);
        Self::from_buffer_unchecked(staged, self.shape())
    }

    /// Owned copy converted to `dtype` directly, without the float32 stage.
    pub fn cast_simple(&self, dtype: DType) -> Array {
        let converted = self.packed_buffer().cast_direct(dtype);
        Self::from_buffer_unchecked(converted, self.shape())
    }

    // ── Release ─────────────────────────────────────────────────────────

    /// Drop this handle, reporting whether the buffer was freed.
    pub fn delete(self) -> Release {
        match self.storage.release() {
            0 => Release::Freed,
            remaining => Release::Shared { remaining },
        }
    }
}
