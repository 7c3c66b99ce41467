//! Promotion lattice, broadcasting rules, and the elementwise engine.

pub mod broadcast;
pub mod dtype_promotion;
pub mod elementwise;

pub use broadcast::{Policy, broadcast_layout, broadcast_shapes, check_exact, result_shape};
pub use dtype_promotion::{float_result, promote};
pub use elementwise::{
    BinaryOp, ResultKind, UnaryOp, abs, add, add_broadcast, add_scalar, binary, binary_scalar,
    cos, cosh, div, div_broadcast, div_scalar, equal, equal_broadcast, equal_scalar, exp, log,
    mul, mul_broadcast, mul_scalar, neg, pow, pow_broadcast, pow_scalar, sin, sinh, sqrt, sub,
    sub_broadcast, sub_scalar, tan, tanh, unary,
};
