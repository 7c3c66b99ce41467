//! Dense linear algebra over tessera arrays.
//!
//! Every operation comes in a plain form taking a 2-D matrix and a
//! `batched_*` form taking `[B..., m, n]`, which applies the same kernel to
//! each trailing matrix. Inputs may be any kind and any layout; results are
//! freshly owned and contiguous.
//!
//! Direct methods (det, LU, QR, LQ, inverse, solve, lstsq) work in float32.
//! Whole-array normalizations live in [`norm`].
//! The eigen solvers and rank iterate in f64 over the float32-staged input.
//!
//! With the `rayon` feature, batch entries run in parallel.

mod batch;
pub mod dense;
pub mod det;
pub mod eig;
pub mod inverse;
pub mod lu;
pub mod matmul;
pub mod norm;
pub mod qr;
pub mod rank;
pub mod solve;
pub mod vector;

pub use det::{DET_PIVOT_EPS, batched_det, det};
pub use eig::{
    EIG_MAX_ITER, EIG_TOL, Eigen, JACOBI_MAX_SWEEPS, JACOBI_TOL, batched_eig, batched_eigh,
    batched_eigvals, batched_eigvalsh, eig, eigh, eigvals, eigvalsh,
};
pub use inverse::{batched_inv, inv};
pub use lu::{Lu, batched_lu, lu};
pub use matmul::matmul;
pub use norm::{NORM_EPS, NormMode, l1_norm, l2_norm, normalize, robust_norm, unit_norm};
pub use qr::{Lq, QR_RANK_EPS, Qr, batched_lq, batched_qr, lq, qr};
pub use rank::{RANK_EPS, batched_matrix_rank, matrix_rank};
pub use solve::{batched_lstsq, batched_solve, lstsq, solve};
pub use vector::{cross, cross_axis, dot, inner, outer};
