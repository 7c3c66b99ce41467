//! Whole-array normalizations.
//!
//! Each result has the input's shape and kind `float_result(a)`, and holds
//! `(x - center) / scale` with the center and scale taken over every
//! element. A scale at or below [`NORM_EPS`] is replaced by 1, so a constant
//! input only gets centered.

use std::str::FromStr;

use tessera_core::{Array, Result, TesseraError};
use tessera_ops::float_result;
use tracing::debug;

/// Scales at or below this are treated as zero.
pub const NORM_EPS: f64 = 1e-12;

/// Statistic used by [`normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormMode {
    /// `(x - min) / (max - min)`, into `[0, 1]`.
    #[default]
    MinMax,
    /// `(x - mean) / std`, population standard deviation.
    Std,
    /// `x / sqrt(mean(x^2))`.
    Rms,
}

impl FromStr for NormMode {
    type Err = TesseraError;

    /// Accepts the short names `mm`, `std` and `rms`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mm" => Ok(Self::MinMax),
            "std" => Ok(Self::Std),
            "rms" => Ok(Self::Rms),
            other => Err(TesseraError::InvalidArgument(format!(
                "normalize: unknown mode {other:?}, expected mm, std or rms"
            ))),
        }
    }
}

fn scaled(
    op: &'static str,
    a: &Array,
    stats: impl FnOnce(&[f64]) -> (f64, f64),
) -> Result<Array> {
    let x = a.to_vec_f64();
    if x.is_empty() {
        return Err(TesseraError::InvalidArgument(format!(
            "{op}: array of shape {:?} has no elements",
            a.shape()
        )));
    }
    let (center, scale) = stats(&x);
    let scale = if scale > NORM_EPS {
        scale
    } else {
        debug!(op, scale, "degenerate scale, centering only");
        1.0
    };
    let out: Vec<f64> = x.iter().map(|v| (v - center) / scale).collect();
    Array::from_f64(&out, a.shape(), float_result(a.dtype()))
}

fn sum_squares(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Linear interpolation between closest ranks of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Divide by the sum of absolute values.
pub fn l1_norm(a: &Array) -> Result<Array> {
    scaled("l1_norm", a, |x| (0.0, x.iter().map(|v| v.abs()).sum()))
}

/// Divide by the Euclidean norm.
pub fn l2_norm(a: &Array) -> Result<Array> {
    scaled("l2_norm", a, |x| (0.0, sum_squares(x).sqrt()))
}

/// Divide by the largest magnitude, so values land in `[-1, 1]`.
pub fn unit_norm(a: &Array) -> Result<Array> {
    scaled("unit_norm", a, |x| {
        (0.0, x.iter().fold(0.0, |m: f64, v| m.max(v.abs())))
    })
}

/// Center on the median and divide by the interquartile range.
pub fn robust_norm(a: &Array) -> Result<Array> {
    scaled("robust_norm", a, |x| {
        let mut sorted = x.to_vec();
        sorted.sort_by(f64::total_cmp);
        let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
        (quantile(&sorted, 0.5), iqr)
    })
}

pub fn normalize(a: &Array, mode: NormMode) -> Result<Array> {
    scaled("normalize", a, |x| {
        let n = x.len() as f64;
        match mode {
            NormMode::MinMax => {
                let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (lo, hi - lo)
            }
            NormMode::Std => {
                let mean = x.iter().sum::<f64>() / n;
                let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                (mean, var.sqrt())
            }
            NormMode::Rms => (0.0, (sum_squares(x) / n).sqrt()),
        }
    })
}
