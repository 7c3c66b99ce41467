//! Eigen-decomposition.
//!
//! - [`eig`]: shifted QR iteration for general square matrices. Eigenvalues
//!   come off the diagonal of the converged (upper triangular) iterate in no
//!   particular order; the columns of the accumulated `Q` product are the
//!   eigenvectors for normal matrices and Schur vectors otherwise.
//! - [`eigh`]: classical Jacobi rotations for symmetric matrices.
//!   Eigenvalues ascending, eigenvector columns reordered to match.
//!
//! Both report whether they met their tolerance before exhausting their
//! iteration budget. Iterations accumulate in f64 over the float32-staged
//! input.

use tessera_core::{Array, Result, TesseraError};
use tessera_ops::float_result;
use tracing::warn;

use crate::batch::{assemble, for_each_batch, require_ndim, require_square, stage};
use crate::dense::{identity, matmul};
use crate::qr::{Deficient, qr_kernel};

/// QR-iteration cap.
pub const EIG_MAX_ITER: usize = 200;
/// QR iteration stops once the entries below the diagonal sum below this.
pub const EIG_TOL: f64 = 1e-8;
/// Jacobi budget, in sweeps of `n(n-1)/2` rotations.
pub const JACOBI_MAX_SWEEPS: usize = 100;
/// Jacobi stops once the largest off-diagonal magnitude is below this.
pub const JACOBI_TOL: f64 = 1e-10;

/// Result of an eigen-decomposition.
#[derive(Debug)]
pub struct Eigen {
    /// `[n]`, or `[B..., n]` when batched.
    pub values: Array,
    /// Eigenvectors as columns: `[n, n]`, or `[B..., n, n]`.
    pub vectors: Array,
    /// Every matrix met its tolerance within budget.
    pub converged: bool,
    /// QR steps (general path) or Jacobi rotations (symmetric path); the
    /// maximum over batches.
    pub iterations: usize,
    op: &'static str,
}

impl Eigen {
    /// Turn an exhausted iteration budget into an error.
    pub fn require_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(TesseraError::NotConverged {
                op: self.op,
                iterations: self.iterations,
            })
        }
    }
}

struct EigParts {
    values: Vec<f64>,
    vectors: Vec<f64>,
    converged: bool,
    iterations: usize,
}

// ── General: shifted QR iteration ───────────────────────────────────────

/// Sum of magnitudes strictly below the diagonal of row `row`.
fn row_lower_mass(h: &[f64], n: usize, row: usize) -> f64 {
    (0..row).map(|j| h[row * n + j].abs()).sum()
}

fn lower_mass(h: &[f64], n: usize) -> f64 {
    (1..n).map(|i| row_lower_mass(h, n, i)).sum()
}

/// Eigenvalue of the 2x2 block ending at `(hi, hi)` closest to its trailing
/// entry, or that entry itself when the block's eigenvalues are complex.
fn wilkinson_shift(h: &[f64], n: usize, hi: usize) -> f64 {
    let a = h[(hi - 1) * n + hi - 1];
    let b = h[(hi - 1) * n + hi];
    let c = h[hi * n + hi - 1];
    let d = h[hi * n + hi];
    let half = (a - d) / 2.0;
    let disc = half * half + b * c;
    if disc < 0.0 {
        return d;
    }
    let mid = (a + d) / 2.0;
    let root = disc.sqrt();
    let (mu1, mu2) = (mid + root, mid - root);
    if (mu1 - d).abs() <= (mu2 - d).abs() {
        mu1
    } else {
        mu2
    }
}

fn eig_kernel(a: &[f32], n: usize) -> EigParts {
    let mut h: Vec<f64> = a.iter().map(|&x| f64::from(x)).collect();
    let mut v = identity::<f64>(n);
    let mut iterations = 0;
    let mut converged = lower_mass(&h, n) < EIG_TOL;
    // Rows below `hi` have split off; the shift comes from the active block.
    let mut hi = n - 1;
    let row_tol = EIG_TOL / n as f64;

    while !converged && iterations < EIG_MAX_ITER {
        while hi > 0 && row_lower_mass(&h, n, hi) < row_tol {
            hi -= 1;
        }
        let mu = if hi == 0 { h[0] } else { wilkinson_shift(&h, n, hi) };

        for i in 0..n {
            h[i * n + i] -= mu;
        }
        let (q, r) = qr_kernel(&h, n, n, Deficient::Complete);
        h = matmul(&r, &q, n, n, n);
        for i in 0..n {
            h[i * n + i] += mu;
        }
        v = matmul(&v, &q, n, n, n);

        iterations += 1;
        converged = lower_mass(&h, n) < EIG_TOL;
    }

    EigParts {
        values: (0..n).map(|i| h[i * n + i]).collect(),
        vectors: v,
        converged,
        iterations,
    }
}

// ── Symmetric: Jacobi rotations ─────────────────────────────────────────

/// `(p, q, |s[p][q]|)` for the largest upper off-diagonal entry.
fn largest_off_diagonal(s: &[f64], n: usize) -> (usize, usize, f64) {
    let mut best = (0, 0, 0.0);
    for i in 0..n {
        for j in i + 1..n {
            let v = s[i * n + j].abs();
            if v > best.2 {
                best = (i, j, v);
            }
        }
    }
    best
}

/// Rotate rows/columns `p` and `q` so that `s[p][q]` becomes zero.
fn rotate(s: &mut [f64], v: &mut [f64], n: usize, p: usize, q: usize) {
    let app = s[p * n + p];
    let aqq = s[q * n + q];
    let apq = s[p * n + q];

    let theta = (aqq - app) / (2.0 * apq);
    let t = if theta >= 0.0 {
        1.0 / (theta + (1.0 + theta * theta).sqrt())
    } else {
        -1.0 / (-theta + (1.0 + theta * theta).sqrt())
    };
    let c = 1.0 / (1.0 + t * t).sqrt();
    let sn = t * c;

    s[p * n + p] = app - t * apq;
    s[q * n + q] = aqq + t * apq;
    s[p * n + q] = 0.0;
    s[q * n + p] = 0.0;

    for r in 0..n {
        if r == p || r == q {
            continue;
        }
        let srp = s[r * n + p];
        let srq = s[r * n + q];
        let new_rp = c * srp - sn * srq;
        let new_rq = sn * srp + c * srq;
        s[r * n + p] = new_rp;
        s[p * n + r] = new_rp;
        s[r * n + q] = new_rq;
        s[q * n + r] = new_rq;
    }

    for i in 0..n {
        let vp = v[i * n + p];
        let vq = v[i * n + q];
        v[i * n + p] = c * vp - sn * vq;
        v[i * n + q] = sn * vp + c * vq;
    }
}

fn eigh_kernel(a: &[f32], n: usize) -> EigParts {
    let mut s: Vec<f64> = a.iter().map(|&x| f64::from(x)).collect();
    let mut v = identity::<f64>(n);
    let budget = JACOBI_MAX_SWEEPS * (n * (n - 1) / 2).max(1);
    let mut rotations = 0;
    let mut converged = false;

    loop {
        let (p, q, largest) = largest_off_diagonal(&s, n);
        if largest < JACOBI_TOL {
            converged = true;
            break;
        }
        if rotations >= budget {
            break;
        }
        rotate(&mut s, &mut v, n, p, q);
        rotations += 1;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| s[i * n + i].total_cmp(&s[j * n + j]));
    let values = order.iter().map(|&i| s[i * n + i]).collect();
    let mut vectors = vec![0.0; n * n];
    for (dst, &src) in order.iter().enumerate() {
        for r in 0..n {
            vectors[r * n + dst] = v[r * n + src];
        }
    }

    EigParts {
        values,
        vectors,
        converged,
        iterations: rotations,
    }
}

// ── Entry points ────────────────────────────────────────────────────────

fn eigen_impl(
    op: &'static str,
    a: &Array,
    batched: bool,
    kernel: fn(&[f32], usize) -> EigParts,
) -> Result<Eigen> {
    require_ndim(op, a, batched)?;
    let staged = stage(op, a, 2)?;
    let n = staged.rows();
    require_square(op, n, staged.cols())?;

    let parts = for_each_batch(staged.batch_count(), |i| kernel(&staged.blocks[i], n));
    let converged = parts.iter().all(|p| p.converged);
    let iterations = parts.iter().map(|p| p.iterations).max().unwrap_or(0);
    if !converged {
        warn!(op, iterations, "eigen iteration exhausted its budget");
    }

    let (values, vectors): (Vec<_>, Vec<_>) =
        parts.into_iter().map(|p| (p.values, p.vectors)).unzip();
    let dtype = float_result(a.dtype());
    Ok(Eigen {
        values: assemble(&staged.batch_shape, &[n], &values, dtype)?,
        vectors: assemble(&staged.batch_shape, &[n, n], &vectors, dtype)?,
        converged,
        iterations,
        op,
    })
}

/// Eigenvalues and eigenvectors of a general square matrix.
pub fn eig(a: &Array) -> Result<Eigen> {
    eigen_impl("eig", a, false, eig_kernel)
}

pub fn batched_eig(a: &Array) -> Result<Eigen> {
    eigen_impl("batched_eig", a, true, eig_kernel)
}

/// Eigenvalues only; see [`eig`].
pub fn eigvals(a: &Array) -> Result<Array> {
    eig(a).map(|e| e.values)
}

pub fn batched_eigvals(a: &Array) -> Result<Array> {
    batched_eig(a).map(|e| e.values)
}

/// Eigenvalues (ascending) and eigenvectors of a symmetric matrix.
///
/// Symmetry is assumed, not checked.
pub fn eigh(a: &Array) -> Result<Eigen> {
    eigen_impl("eigh", a, false, eigh_kernel)
}

pub fn batched_eigh(a: &Array) -> Result<Eigen> {
    eigen_impl("batched_eigh", a, true, eigh_kernel)
}

/// Eigenvalues only; see [`eigh`].
pub fn eigvalsh(a: &Array) -> Result<Array> {
    eigh(a).map(|e| e.values)
}

pub fn batched_eigvalsh(a: &Array) -> Result<Array> {
    batched_eigh(a).map(|e| e.values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::DType;

    fn mat(data: &[f32], n: usize) -> Array {
        Array::create(data, &[n, n], DType::F32).unwrap()
    }

    fn sorted(mut v: Vec<f64>) -> Vec<f64> {
        v.sort_by(f64::total_cmp);
        v
    }

    #[test]
    fn test_wilkinson_shift() {
        // Block [[4, 1], [2, 3]] has eigenvalues 5 and 2; 2 is closer to 3.
        let h = [4.0, 1.0, 2.0, 3.0];
        assert!((wilkinson_shift(&h, 2, 1) - 2.0).abs() < 1e-12);
        // Rotation block: complex eigenvalues, fall back to d.
        let r = [0.0, -1.0, 1.0, 0.5];
        assert_eq!(wilkinson_shift(&r, 2, 1), 0.5);
    }

    #[test]
    fn test_eig_nonsymmetric_real_spectrum() {
        let e = eig(&mat(&[4.0, 1.0, 2.0, 3.0], 2)).unwrap();
        assert!(e.converged);
        let vals = sorted(e.values.to_vec_f64());
        assert!((vals[0] - 2.0).abs() < 1e-5);
        assert!((vals[1] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_eig_triangular_needs_no_iterations() {
        let e = eig(&mat(&[1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 0.0, 0.0, 6.0], 3)).unwrap();
        assert!(e.converged);
        assert_eq!(e.iterations, 0);
        assert_eq!(e.values.to_vec_f64(), vec![1.0, 4.0, 6.0]);
    }

    #[test]
    fn test_eig_complex_spectrum_reports_non_convergence() {
        let e = eig(&mat(&[0.0, -1.0, 1.0, 0.0], 2)).unwrap();
        assert!(!e.converged);
        assert_eq!(e.iterations, EIG_MAX_ITER);
        let err = e.require_converged().unwrap_err();
        assert_eq!(
            err,
            TesseraError::NotConverged {
                op: "eig",
                iterations: EIG_MAX_ITER
            }
        );
        assert_eq!(err.class(), tessera_core::ErrorClass::NumericalDegeneracy);
    }

    #[test]
    fn test_eigh_2x2() {
        let e = eigh(&mat(&[2.0, 1.0, 1.0, 2.0], 2)).unwrap();
        assert!(e.converged);
        assert_eq!(e.iterations, 1);
        let vals = e.values.to_vec_f64();
        assert!((vals[0] - 1.0).abs() < 1e-6);
        assert!((vals[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_eigh_diagonal_sorted() {
        let e = eigh(&mat(&[3.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0], 3)).unwrap();
        assert_eq!(e.iterations, 0);
        assert_eq!(e.values.to_vec_f64(), vec![1.0, 2.0, 3.0]);
        // Column 0 pairs with eigenvalue 1, which sat at index 1.
        assert_eq!(e.vectors.get(&[1, 0]).unwrap(), 1.0);
        assert_eq!(e.vectors.get(&[0, 2]).unwrap(), 1.0);
    }

    #[test]
    fn test_eigvals_int_input() {
        let a = Array::create(&[2.0, 0.0, 0.0, 5.0], &[2, 2], DType::I32).unwrap();
        let v = eigvalsh(&a).unwrap();
        assert_eq!(v.dtype(), DType::F32);
        assert_eq!(v.to_vec_f32(), vec![2.0, 5.0]);
    }

    #[test]
    fn test_batched_eigh() {
        let a = Array::create(
            &[2.0, 1.0, 1.0, 2.0, 5.0, 0.0, 0.0, 4.0],
            &[2, 2, 2],
            DType::F64,
        )
        .unwrap();
        let e = batched_eigh(&a).unwrap();
        assert_eq!(e.values.shape(), &[2, 2]);
        assert_eq!(e.vectors.shape(), &[2, 2, 2]);
        assert!(e.converged);
        let v = e.values.to_vec_f64();
        assert!((v[0] - 1.0).abs() < 1e-9 && (v[1] - 3.0).abs() < 1e-9);
        assert_eq!(&v[2..], &[4.0, 5.0]);
    }

    #[test]
    fn test_eig_requires_square() {
        let a = Array::zeros(&[2, 3], DType::F32).unwrap();
        assert!(matches!(eig(&a), Err(TesseraError::NotSquare { .. })));
        assert!(matches!(eigh(&a), Err(TesseraError::NotSquare { .. })));
    }
}
