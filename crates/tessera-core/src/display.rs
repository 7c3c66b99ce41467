//! Text rendering of arrays.
//!
//! `array(<body>, dtype=<name>)`. Axes longer than [`MAX_DISPLAY`] show their
//! first and last [`EDGE_ITEMS`] entries around an ellipsis.

use std::fmt::{self, Write};

use crate::storage::Buffer;
use crate::Array;

/// Longest axis printed in full.
pub const MAX_DISPLAY: usize = 8;
/// Entries kept at each end of a truncated axis.
pub const EDGE_ITEMS: usize = MAX_DISPLAY / 2;

fn write_element(f: &mut impl Write, buffer: &Buffer, at: usize) -> fmt::Result {
    match buffer {
        Buffer::F32(v) => write!(f, "{:.3}", v[at]),
        Buffer::F64(v) => write!(f, "{:.4}", v[at]),
        Buffer::I8(v) => write!(f, "{}.", v[at]),
        Buffer::I16(v) => write!(f, "{}.", v[at]),
        Buffer::I32(v) => write!(f, "{}.", v[at]),
        Buffer::I64(v) => write!(f, "{}.", v[at]),
        Buffer::U8(v) => write!(f, "{}.", v[at]),
        Buffer::U16(v) => write!(f, "{}.", v[at]),
        Buffer::U32(v) => write!(f, "{}.", v[at]),
        Buffer::U64(v) => write!(f, "{}.", v[at]),
        Buffer::Bool(v) => f.write_str(if v[at] { "True" } else { "False" }),
    }
}

/// Indices shown along an axis of length `len`; `None` marks the ellipsis.
fn visible(len: usize) -> Vec<Option<usize>> {
    if len > MAX_DISPLAY {
        (0..EDGE_ITEMS)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((len - EDGE_ITEMS..len).map(Some))
            .collect()
    } else {
        (0..len).map(Some).collect()
    }
}

struct Printer<'a> {
    buffer: &'a Buffer,
    shape: &'a [usize],
    strides: &'a [usize],
}

impl Printer<'_> {
    fn block(&self, f: &mut impl Write, axis: usize, base: usize) -> fmt::Result {
        let len = self.shape[axis];
        let stride = self.strides[axis];

        if axis + 1 == self.shape.len() {
            f.write_char('[')?;
            for (n, i) in visible(len).into_iter().enumerate() {
                if n > 0 {
                    f.write_str(", ")?;
                }
                match i {
                    Some(i) => write_element(f, self.buffer, base + i * stride)?,
                    None => f.write_str("...")?,
                }
            }
            return f.write_char(']');
        }

        let indent = "  ".repeat(axis + 1);
        f.write_str("[\n")?;
        for (n, i) in visible(len).into_iter().enumerate() {
            if n > 0 {
                f.write_str(",\n")?;
            }
            f.write_str(&indent)?;
            match i {
                Some(i) => self.block(f, axis + 1, base + i * stride)?,
                None => f.write_str("...")?,
            }
        }
        write!(f, "\n{}]", "  ".repeat(axis))
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.storage().read();
        f.write_str("array(")?;
        let printer = Printer {
            buffer: &buffer,
            shape: self.shape(),
            strides: self.strides(),
        };
        printer.block(f, 0, self.offset())?;
        write!(f, ", dtype={})", self.dtype())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Array, DType};

    #[test]
    fn test_display_1d_float32() {
        let a = Array::create(&[1.0, 2.5, -3.0], &[3], DType::F32).unwrap();
        assert_eq!(a.to_string(), "array([1.000, 2.500, -3.000], dtype=float32)");
    }

    #[test]
    fn test_display_element_formats() {
        let a = Array::create(&[1.0, 2.0], &[2], DType::F64).unwrap();
        assert_eq!(a.to_string(), "array([1.0000, 2.0000], dtype=float64)");
        let i = Array::create(&[1.0, -2.0], &[2], DType::I32).unwrap();
        assert_eq!(i.to_string(), "array([1., -2.], dtype=int32)");
        let b = Array::create(&[1.0, 0.0], &[2], DType::Bool).unwrap();
        assert_eq!(b.to_string(), "array([True, False], dtype=bool)");
    }

    #[test]
    fn test_display_2d() {
        let a = Array::create(&[1.0, 2.0, 3.0, 4.0], &[2, 2], DType::U8).unwrap();
        assert_eq!(a.to_string(), "array([\n  [1., 2.],\n  [3., 4.]\n], dtype=uint8)");
    }

    #[test]
    fn test_display_truncates_long_row() {
        let data: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let a = Array::create(&data, &[10], DType::I64).unwrap();
        assert_eq!(
            a.to_string(),
            "array([0., 1., 2., 3., ..., 6., 7., 8., 9.], dtype=int64)"
        );
    }

    #[test]
    fn test_display_truncates_outer_axis() {
        let data: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let a = Array::create(&data, &[9, 1], DType::I8).unwrap();
        let s = a.to_string();
        assert_eq!(s.matches('\n').count(), 10);
        assert!(s.contains("  [3.],\n  ...,\n  [5.]"));
    }

    #[test]
    fn test_display_follows_view_strides() {
        let a = Array::create(&[1.0, 2.0, 3.0, 4.0], &[2, 2], DType::I16).unwrap();
        let t = a.transpose_view();
        assert_eq!(t.to_string(), "array([\n  [1., 3.],\n  [2., 4.]\n], dtype=int16)");
    }
}
