//! Row-major matrix helpers shared by the kernels.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use tessera_core::Element;

/// Working precision of a kernel: `f32` for the direct solvers, `f64` for
/// the iterative eigen solvers.
pub trait Real:
    Element
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    const ONE: Self;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
}

impl Real for f32 {
    const ONE: Self = 1.0;

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
}

impl Real for f64 {
    const ONE: Self = 1.0;

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

/// `n x n` identity.
pub fn identity<T: Real>(n: usize) -> Vec<T> {
    let mut out = vec![T::zero(); n * n];
    for i in 0..n {
        out[i * n + i] = T::ONE;
    }
    out
}

/// Transpose of an `rows x cols` matrix.
pub fn transpose<T: Real>(a: &[T], rows: usize, cols: usize) -> Vec<T> {
    let mut out = vec![T::zero(); rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = a[i * cols + j];
        }
    }
    out
}

/// `a (m x k) @ b (k x n)`.
pub fn matmul<T: Real>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T> {
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for p in 0..k {
            let aip = a[i * k + p];
            for j in 0..n {
                out[i * n + j] += aip * b[p * n + j];
            }
        }
    }
    out
}

/// Row in `from..to` with the largest magnitude in column `col`.
pub fn pivot_row<T: Real>(m: &[T], width: usize, col: usize, from: usize, to: usize) -> usize {
    let mut best = from;
    let mut best_abs = m[from * width + col].abs();
    for r in from + 1..to {
        let v = m[r * width + col].abs();
        if v > best_abs {
            best = r;
            best_abs = v;
        }
    }
    best
}

pub fn swap_rows<T: Real>(m: &mut [T], width: usize, i: usize, j: usize) {
    if i == j {
        return;
    }
    for c in 0..width {
        m.swap(i * width + c, j * width + c);
    }
}
