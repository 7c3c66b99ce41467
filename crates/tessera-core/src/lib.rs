//! Strided N-dimensional arrays over kind-tagged, reference-counted buffers.
//!
//! `tessera-core` provides the foundational types (`Array`, `DType`, `Shape`,
//! `Layout`) used by the elementwise engine in `tessera-ops` and the dense
//! linear-algebra suite in `tessera-linalg`.
//!
//! # Ownership
//!
//! Every `Array` holds a handle to shared `Storage`. Views (`view`,
//! `reshape_view`, `slice_view`, `permute_view`) clone the handle and carry
//! their own layout metadata; the buffer is released exactly once, when the
//! last handle is dropped.

pub mod array;
pub mod create;
pub mod display;
pub mod element;
pub mod layout;
pub mod shape_ops;
pub mod storage;
pub mod types;

pub use array::{Array, Release};
pub use element::Element;
pub use layout::Layout;
pub use storage::{Buffer, Storage};
pub use types::{DType, DTypeInfo, Shape};

pub type Result<T> = std::result::Result<T, TesseraError>;

/// Broad category of a [`TesseraError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller passed something the operation cannot accept.
    ContractViolation,
    /// The input was valid but the computation did not produce a trustworthy
    /// answer.
    NumericalDegeneracy,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TesseraError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    Broadcast { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("Operation requires a contiguous array; call contiguous() first")]
    NotContiguous,

    #[error("Invalid axis {axis} for ndim {ndim}")]
    InvalidAxis { axis: isize, ndim: usize },

    #[error("{op}: expected {expected} dimensions, got {got}")]
    DimensionMismatch {
        op: &'static str,
        expected: String,
        got: usize,
    },

    #[error("{op}: matrix must be square, got {rows}x{cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("{op}: no convergence after {iterations} iterations")]
    NotConverged { op: &'static str, iterations: usize },
}

impl TesseraError {
    /// Whether this error is a caller bug or a numerical failure on valid input.
    pub fn class(&self) -> ErrorClass {
        match self {
            TesseraError::NotConverged { .. } => ErrorClass::NumericalDegeneracy,
            _ => ErrorClass::ContractViolation,
        }
    }
}
