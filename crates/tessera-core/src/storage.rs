//! Kind-tagged element buffers and the shared, reference-counted storage
//! handle that owners and views hold.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{DType, Element};

/// A densely packed element buffer, tagged with its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Buffer {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    Bool(Vec<bool>),
}

/// Run `$body` with `$v` bound to the typed vector inside a buffer.
macro_rules! with_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            Buffer::F32($v) => $body,
            Buffer::F64($v) => $body,
            Buffer::I8($v) => $body,
            Buffer::I16($v) => $body,
            Buffer::I32($v) => $body,
            Buffer::I64($v) => $body,
            Buffer::U8($v) => $body,
            Buffer::U16($v) => $body,
            Buffer::U32($v) => $body,
            Buffer::U64($v) => $body,
            Buffer::Bool($v) => $body,
        }
    };
}

/// Build a buffer of kind `$dtype`; `$t` names the element type inside `$body`.
macro_rules! build_buffer {
    ($dtype:expr, $t:ident => $body:expr) => {
        match $dtype {
            DType::F32 => {
                type $t = f32;
                Buffer::F32($body)
            }
            DType::F64 => {
                type $t = f64;
                Buffer::F64($body)
            }
            DType::I8 => {
                type $t = i8;
                Buffer::I8($body)
            }
            DType::I16 => {
                type $t = i16;
                Buffer::I16($body)
            }
            DType::I32 => {
                type $t = i32;
                Buffer::I32($body)
            }
            DType::I64 => {
                type $t = i64;
                Buffer::I64($body)
            }
            DType::U8 => {
                type $t = u8;
                Buffer::U8($body)
            }
            DType::U16 => {
                type $t = u16;
                Buffer::U16($body)
            }
            DType::U32 => {
                type $t = u32;
                Buffer::U32($body)
            }
            DType::U64 => {
                type $t = u64;
                Buffer::U64($body)
            }
            DType::Bool => {
                type $t = bool;
                Buffer::Bool($body)
            }
        }
    };
}

impl Buffer {
    // ── Constructors ────────────────────────────────────────────────────

    /// Convert float32 input into a buffer of kind `dtype`.
    pub fn from_f32(data: &[f32], dtype: DType) -> Self {
        build_buffer!(dtype, T => data.iter().map(|&x| T::from_f32(x)).collect())
    }

    /// Convert float64 input into a buffer of kind `dtype`.
    pub fn from_f64(data: &[f64], dtype: DType) -> Self {
        build_buffer!(dtype, T => data.iter().map(|&x| T::from_f64(x)).collect())
    }

    /// A buffer of `len` zero elements.
    pub fn zeros(dtype: DType, len: usize) -> Self {
        build_buffer!(dtype, T => vec![T::zero(); len])
    }

    /// A buffer of `len` elements produced by `f(i)`, converted from f64.
    pub fn from_fn(dtype: DType, len: usize, mut f: impl FnMut(usize) -> f64) -> Self {
        build_buffer!(dtype, T => (0..len).map(|i| T::from_f64(f(i))).collect())
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
            Buffer::I8(_) => DType::I8,
            Buffer::I16(_) => DType::I16,
            Buffer::I32(_) => DType::I32,
            Buffer::I64(_) => DType::I64,
            Buffer::U8(_) => DType::U8,
            Buffer::U16(_) => DType::U16,
            Buffer::U32(_) => DType::U32,
            Buffer::U64(_) => DType::U64,
            Buffer::Bool(_) => DType::Bool,
        }
    }

    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the buffer in bytes.
    pub fn nbytes(&self) -> usize {
        self.len() * self.dtype().size_bytes()
    }

    // ── Element access ──────────────────────────────────────────────────

    #[inline]
    pub fn get_f64(&self, index: usize) -> f64 {
        with_buffer!(self, v => v[index].to_f64())
    }

    #[inline]
    pub fn get_f32(&self, index: usize) -> f32 {
        with_buffer!(self, v => v[index].to_f32())
    }

    /// Store `value`, converted to this buffer's kind.
    #[inline]
    pub fn set_f64(&mut self, index: usize, value: f64) {
        with_buffer!(self, v => v[index] = Element::from_f64(value))
    }

    // ── Re-packing and conversion ───────────────────────────────────────

    /// Copy the elements at `offsets`, in order, into a new buffer of the
    /// same kind.
    pub fn gather(&self, offsets: impl Iterator<Item = usize>) -> Buffer {
        match self {
            Buffer::F32(v) => Buffer::F32(offsets.map(|o| v[o]).collect()),
            Buffer::F64(v) => Buffer::F64(offsets.map(|o| v[o]).collect()),
            Buffer::I8(v) => Buffer::I8(offsets.map(|o| v[o]).collect()),
            Buffer::I16(v) => Buffer::I16(offsets.map(|o| v[o]).collect()),
            Buffer::I32(v) => Buffer::I32(offsets.map(|o| v[o]).collect()),
            Buffer::I64(v) => Buffer::I64(offsets.map(|o| v[o]).collect()),
            Buffer::U8(v) => Buffer::U8(offsets.map(|o| v[o]).collect()),
            Buffer::U16(v) => Buffer::U16(offsets.map(|o| v[o]).collect()),
            Buffer::U32(v) => Buffer::U32(offsets.map(|o| v[o]).collect()),
            Buffer::U64(v) => Buffer::U64(offsets.map(|o| v[o]).collect()),
            Buffer::Bool(v) => Buffer::Bool(offsets.map(|o| v[o]).collect()),
        }
    }

    /// Elements at `offsets` staged through float32.
    pub fn gather_f32(&self, offsets: impl Iterator<Item = usize>) -> Vec<f32> {
        with_buffer!(self, v => offsets.map(|o| v[o].to_f32()).collect())
    }

    /// Elements at `offsets` widened to float64.
    pub fn gather_f64(&self, offsets: impl Iterator<Item = usize>) -> Vec<f64> {
        with_buffer!(self, v => offsets.map(|o| v[o].to_f64()).collect())
    }

    /// Convert to `dtype` without the float32 stage: each element goes
    /// through its float64 value, which is exact for every kind up to 32 bits.
    pub fn cast_direct(&self, dtype: DType) -> Buffer {
        if dtype == self.dtype() {
            return self.clone();
        }
        with_buffer!(self, v => build_buffer!(dtype, T => v.iter().map(|&x| T::from_f64(x.to_f64())).collect()))
    }

    /// Convert to `dtype` staging every element through float32.
    pub fn cast_staged(&self, dtype: DType) -> Buffer {
        with_buffer!(self, v => build_buffer!(dtype, T => v.iter().map(|&x| T::from_f32(x.to_f32())).collect()))
    }
}

/// A shared handle to a buffer.
///
/// Owners and views clone the handle; the buffer is dropped when the last
/// handle goes away.
#[derive(Clone, Debug)]
pub struct Storage {
    inner: Arc<RwLock<Buffer>>,
}

impl Storage {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Buffer> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Buffer> {
        self.inner.write()
    }

    /// Number of live handles (owner plus views) to this buffer.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn is_unique(&self) -> bool {
        self.handle_count() == 1
    }

    /// Whether two handles refer to the same buffer.
    pub fn same_buffer(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Drop this handle. Returns how many other handles remain; 0 means the
    /// buffer was freed here.
    pub fn release(self) -> usize {
        match Arc::try_unwrap(self.inner) {
            Ok(_) => 0,
            Err(inner) => Arc::strong_count(&inner) - 1,
        }
    }

    pub fn dtype(&self) -> DType {
        self.inner.read().dtype()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
