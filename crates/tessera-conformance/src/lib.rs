//! Golden conformance testing infrastructure.
//!
//! Tolerance assertions shared by the tessera test suites, plus JSON golden
//! cases: each case names an operation, its input arrays, and the expected
//! outputs with a tolerance.

use serde::{Deserialize, Serialize};
use tessera_core::{Array, DType, Shape};

/// An array literal in a golden file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TensorSpec {
    pub shape: Shape,
    #[serde(default = "default_dtype")]
    pub dtype: DType,
    pub data: Vec<f32>,
}

fn default_dtype() -> DType {
    DType::F32
}

impl TensorSpec {
    pub fn to_array(&self) -> tessera_core::Result<Array> {
        Array::create(&self.data, self.shape.dims(), self.dtype)
    }
}

/// One golden case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoldenCase {
    pub name: String,
    pub op: String,
    pub inputs: Vec<TensorSpec>,
    pub expected: Vec<TensorSpec>,
    #[serde(default = "default_tol")]
    pub atol: f32,
    #[serde(default = "default_tol")]
    pub rtol: f32,
}

fn default_tol() -> f32 {
    1e-5
}

/// Parse a JSON array of golden cases.
pub fn load_cases(json: &str) -> serde_json::Result<Vec<GoldenCase>> {
    serde_json::from_str(json)
}

fn close(x: f32, y: f32, atol: f32, rtol: f32) -> bool {
    if x.is_nan() || y.is_nan() {
        return x.is_nan() && y.is_nan();
    }
    if x.is_infinite() || y.is_infinite() {
        return x == y;
    }
    (x - y).abs() <= atol + rtol * y.abs()
}

/// Assert two f32 slices are element-wise close.
///
/// NaN matches NaN and infinities must match exactly.
pub fn assert_allclose(a: &[f32], b: &[f32], atol: f32, rtol: f32) {
    assert_eq!(
        a.len(),
        b.len(),
        "length mismatch: actual={} expected={}",
        a.len(),
        b.len()
    );
    for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
        assert!(
            close(x, y, atol, rtol),
            "mismatch at [{i}]: actual={x} expected={y} diff={} tol={}",
            (x - y).abs(),
            atol + rtol * y.abs()
        );
    }
}

/// Assert an array has `spec`'s shape and kind and close values.
pub fn assert_matches(actual: &Array, spec: &TensorSpec, atol: f32, rtol: f32) {
    assert_eq!(actual.shape(), spec.shape.dims(), "shape mismatch");
    assert_eq!(actual.dtype(), spec.dtype, "dtype mismatch");
    assert_allclose(&actual.to_vec_f32(), &spec.data, atol, rtol);
}

/// Reference helpers computed in f64 on row-major slices.
pub mod reference {
    /// `a (m x k) @ b (k x n)`.
    pub fn matmul(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
        let mut out = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                let acc: f64 = (0..k)
                    .map(|p| a[i * k + p] as f64 * b[p * n + j] as f64)
                    .sum();
                out[i * n + j] = acc as f32;
            }
        }
        out
    }

    /// Transpose of an `m x n` matrix.
    pub fn transpose(a: &[f32], m: usize, n: usize) -> Vec<f32> {
        let mut out = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                out[j * m + i] = a[i * n + j];
            }
        }
        out
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Vec<f32> {
        let mut out = vec![0.0; n * n];
        for i in 0..n {
            out[i * n + i] = 1.0;
        }
        out
    }
}
