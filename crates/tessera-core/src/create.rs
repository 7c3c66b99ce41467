//! Array factories: constant fills, ranges, identity and random fills.
//!
//! Random fills take a caller-owned generator so results are reproducible
//! from a seed.

use rand::Rng;

use crate::array::checked_size;
use crate::storage::Buffer;
use crate::{Array, DType, Result, TesseraError};

impl Array {
    // ── Constant fills ──────────────────────────────────────────────────

    pub fn zeros(shape: &[usize], dtype: DType) -> Result<Array> {
        let size = checked_size("zeros", shape)?;
        Array::from_buffer(Buffer::zeros(dtype, size), shape)
    }

    pub fn ones(shape: &[usize], dtype: DType) -> Result<Array> {
        Array::full(shape, 1.0, dtype)
    }

    /// Every element set to `value`, converted to `dtype`.
    pub fn full(shape: &[usize], value: f64, dtype: DType) -> Result<Array> {
        let size = checked_size("full", shape)?;
        Array::from_buffer(Buffer::from_fn(dtype, size, |_| value), shape)
    }

    pub fn zeros_like(other: &Array) -> Result<Array> {
        Array::zeros(other.shape(), other.dtype())
    }

    pub fn ones_like(other: &Array) -> Result<Array> {
        Array::ones(other.shape(), other.dtype())
    }

    /// `steps` evenly spaced values from `start` to `end` inclusive.
    pub fn linspace(start: f64, steps: usize, end: f64, dtype: DType) -> Result<Array> {
        if steps == 0 {
            return Err(TesseraError::InvalidArgument(
                "linspace: steps must be at least 1".into(),
            ));
        }
        let step = if steps > 1 {
            (end - start) / (steps - 1) as f64
        } else {
            0.0
        };
        let buffer = Buffer::from_fn(dtype, steps, |i| start + i as f64 * step);
        Array::from_buffer(buffer, &[steps])
    }

    /// `n x n` identity.
    pub fn eye(n: usize, dtype: DType) -> Result<Array> {
        let size = checked_size("eye", &[n, n])?;
        let buffer = Buffer::from_fn(dtype, size, |i| if i / n == i % n { 1.0 } else { 0.0 });
        Array::from_buffer(buffer, &[n, n])
    }

    // ── Random fills ────────────────────────────────────────────────────

    /// Standard normal samples via the Box-Muller transform.
    pub fn randn<R: Rng + ?Sized>(rng: &mut R, shape: &[usize], dtype: DType) -> Result<Array> {
        let size = checked_size("randn", shape)?;
        let mut samples = Vec::with_capacity(size + 1);
        while samples.len() < size {
            // u1 in (0, 1] keeps the log finite.
            let u1 = 1.0 - rng.random::<f64>();
            let u2 = rng.random::<f64>();
            let radius = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f64::consts::PI * u2;
            samples.push(radius * theta.cos());
            samples.push(radius * theta.sin());
        }
        samples.truncate(size);
        Array::from_f64(&samples, shape, dtype)
    }

    /// Samples drawn uniformly from `[low, high)`.
    pub fn uniform<R: Rng + ?Sized>(
        rng: &mut R,
        shape: &[usize],
        low: f64,
        high: f64,
        dtype: DType,
    ) -> Result<Array> {
        let size = checked_size("uniform", shape)?;
        if !(low < high) {
            return Err(TesseraError::InvalidArgument(format!(
                "uniform: empty range [{low}, {high})"
            )));
        }
        let buffer = Buffer::from_fn(dtype, size, |_| low + (high - low) * rng.random::<f64>());
        Array::from_buffer(buffer, shape)
    }

    /// Integers drawn uniformly from `[low, high)`.
    pub fn randint<R: Rng + ?Sized>(
        rng: &mut R,
        shape: &[usize],
        low: i64,
        high: i64,
        dtype: DType,
    ) -> Result<Array> {
        let size = checked_size("randint", shape)?;
        if low >= high {
            return Err(TesseraError::InvalidArgument(format!(
                "randint: empty range [{low}, {high})"
            )));
        }
        let buffer = Buffer::from_fn(dtype, size, |_| rng.random_range(low..high) as f64);
        Array::from_buffer(buffer, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_constant_fills() {
        let z = Array::zeros(&[2, 3], DType::I32).unwrap();
        assert_eq!(z.dtype(), DType::I32);
        assert!(z.to_vec_f64().iter().all(|&x| x == 0.0));

        let o = Array::ones_like(&z).unwrap();
        assert_eq!(o.shape(), &[2, 3]);
        assert!(o.to_vec_f64().iter().all(|&x| x == 1.0));

        let f = Array::full(&[2], 2.5, DType::F64).unwrap();
        assert_eq!(f.to_vec_f64(), vec![2.5, 2.5]);

        assert!(Array::zeros(&[0], DType::F32).is_err());
    }

    #[test]
    fn test_linspace() {
        let l = Array::linspace(0.0, 5, 1.0, DType::F64).unwrap();
        assert_eq!(l.to_vec_f64(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let single = Array::linspace(3.0, 1, 7.0, DType::F32).unwrap();
        assert_eq!(single.to_vec_f32(), vec![3.0]);

        assert!(Array::linspace(0.0, 0, 1.0, DType::F32).is_err());
    }

    #[test]
    fn test_eye() {
        let e = Array::eye(3, DType::F32).unwrap();
        assert_eq!(
            e.to_vec_f32(),
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_randn_reproducible() {
        let a = Array::randn(&mut StdRng::seed_from_u64(7), &[3, 3], DType::F32).unwrap();
        let b = Array::randn(&mut StdRng::seed_from_u64(7), &[3, 3], DType::F32).unwrap();
        assert_eq!(a.to_vec_f32(), b.to_vec_f32());
        assert_eq!(a.size(), 9);
    }

    #[test]
    fn test_randn_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = Array::randn(&mut rng, &[10_000], DType::F64).unwrap();
        let v = a.to_vec_f64();
        let mean = v.iter().sum::<f64>() / v.len() as f64;
        let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / v.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "var {var}");
    }

    #[test]
    fn test_uniform_and_randint_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        let u = Array::uniform(&mut rng, &[100], -2.0, 3.0, DType::F64).unwrap();
        assert!(u.to_vec_f64().iter().all(|&x| (-2.0..3.0).contains(&x)));

        let r = Array::randint(&mut rng, &[100], 0, 4, DType::I64).unwrap();
        assert!(r.to_vec_f64().iter().all(|&x| (0.0..4.0).contains(&x)));

        assert!(Array::randint(&mut rng, &[1], 3, 3, DType::I32).is_err());
        assert!(Array::uniform(&mut rng, &[1], 1.0, 0.0, DType::F32).is_err());
    }
}
