//! Elementwise engine: binary arithmetic and comparison, scalar operands,
//! and unary maps.
//!
//! Inputs may be views with any strides. Results are always freshly owned
//! and contiguous.

use tessera_core::{Array, DType, Layout, Result};
use tracing::debug;

use crate::broadcast::{Policy, broadcast_layout, result_shape};
use crate::dtype_promotion::{float_result, promote};

/// Binary operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// IEEE division: `x/0` is `+inf` for `x > 0`, `-inf` for `x < 0`, NaN
    /// for `0/0`.
    Div,
    Pow,
    /// 1 where equal, 0 elsewhere.
    Equal,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
            BinaryOp::Pow => x.powf(y),
            BinaryOp::Equal => {
                if x == y {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Result kind of a binary op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResultKind {
    /// Always float32.
    #[default]
    Float32,
    /// `promote(a, b)`; comparisons yield bool.
    Promoted,
}

fn output_kind(op: BinaryOp, kind: ResultKind, promoted: DType) -> DType {
    match (kind, op) {
        (ResultKind::Float32, _) => DType::F32,
        (ResultKind::Promoted, BinaryOp::Equal) => DType::Bool,
        (ResultKind::Promoted, _) => promoted,
    }
}

fn read_f64(a: &Array, layout: &Layout) -> Vec<f64> {
    a.storage().read().gather_f64(layout.offsets())
}

/// Apply `op` pointwise to `a` and `b` under `policy`.
pub fn binary(
    op: BinaryOp,
    a: &Array,
    b: &Array,
    policy: Policy,
    kind: ResultKind,
) -> Result<Array> {
    let shape = result_shape(policy, a.shape(), b.shape())?;
    let dtype = output_kind(op, kind, promote(a.dtype(), b.dtype()));
    debug!(?op, ?policy, ?shape, %dtype, "elementwise binary");

    let xs = read_f64(a, &broadcast_layout(a.layout(), &shape));
    let ys = read_f64(b, &broadcast_layout(b.layout(), &shape));
    let out: Vec<f64> = xs.iter().zip(&ys).map(|(&x, &y)| op.apply(x, y)).collect();
    Array::from_f64(&out, &shape, dtype)
}

/// Apply `op` between every element of `a` and the scalar `s`.
///
/// On the promoted path the result keeps `a`'s kind (bool for `Equal`).
pub fn binary_scalar(op: BinaryOp, a: &Array, s: f64, kind: ResultKind) -> Result<Array> {
    let dtype = output_kind(op, kind, a.dtype());
    let out: Vec<f64> = a.to_vec_f64().into_iter().map(|x| op.apply(x, s)).collect();
    Array::from_f64(&out, a.shape(), dtype)
}

macro_rules! binary_fns {
    ($($op:ident => $exact:ident, $bcast:ident, $scalar:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($op), "` with identical shapes; float32 result.")]
            pub fn $exact(a: &Array, b: &Array) -> Result<Array> {
                binary(BinaryOp::$op, a, b, Policy::Exact, ResultKind::Float32)
            }

            #[doc = concat!("`", stringify!($op), "` with broadcasting; float32 result.")]
            pub fn $bcast(a: &Array, b: &Array) -> Result<Array> {
                binary(BinaryOp::$op, a, b, Policy::Broadcast, ResultKind::Float32)
            }

            #[doc = concat!("`", stringify!($op), "` against a scalar; float32 result.")]
            pub fn $scalar(a: &Array, s: f64) -> Result<Array> {
                binary_scalar(BinaryOp::$op, a, s, ResultKind::Float32)
            }
        )*
    };
}

binary_fns! {
    Add => add, add_broadcast, add_scalar;
    Sub => sub, sub_broadcast, sub_scalar;
    Mul => mul, mul_broadcast, mul_scalar;
    Div => div, div_broadcast, div_scalar;
    Pow => pow, pow_broadcast, pow_scalar;
    Equal => equal, equal_broadcast, equal_scalar;
}

// ── Unary maps ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Abs,
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
}

impl UnaryOp {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Abs => x.abs(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Sinh => x.sinh(),
            UnaryOp::Cosh => x.cosh(),
            UnaryOp::Tanh => x.tanh(),
        }
    }
}

/// Apply `op` to every element. Float inputs keep their kind; others
/// produce float32.
pub fn unary(op: UnaryOp, a: &Array) -> Result<Array> {
    let out: Vec<f64> = a.to_vec_f64().into_iter().map(|x| op.apply(x)).collect();
    Array::from_f64(&out, a.shape(), float_result(a.dtype()))
}

macro_rules! unary_fns {
    ($($op:ident => $name:ident),* $(,)?) => {
        $(
            pub fn $name(a: &Array) -> Result<Array> {
                unary(UnaryOp::$op, a)
            }
        )*
    };
}

unary_fns! {
    Neg => neg,
    Abs => abs,
    Sqrt => sqrt,
    Exp => exp,
    Log => log,
    Sin => sin,
    Cos => cos,
    Tan => tan,
    Sinh => sinh,
    Cosh => cosh,
    Tanh => tanh,
}
