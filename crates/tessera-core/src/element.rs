//! Element trait: the Rust scalar types that back each [`DType`].

use crate::DType;

/// A scalar type that can live in a [`Buffer`](crate::Buffer).
///
/// Float to integer conversion truncates toward zero and saturates at the
/// target's bounds (NaN becomes 0). Any non-zero value converts to `true`.
pub trait Element: Copy + Send + Sync + PartialEq + std::fmt::Debug + 'static {
    const DTYPE: DType;

    fn from_f32(v: f32) -> Self;
    fn from_f64(v: f64) -> Self;
    fn to_f32(self) -> f32;
    fn to_f64(self) -> f64;
    fn zero() -> Self;
}

macro_rules! impl_numeric_element {
    ($($t:ty => $dt:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DType = DType::$dt;

                #[inline]
                fn from_f32(v: f32) -> Self {
                    v as $t
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $t
                }

                #[inline]
                fn to_f32(self) -> f32 {
                    self as f32
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn zero() -> Self {
                    0 as $t
                }
            }
        )*
    };
}

impl_numeric_element! {
    f32 => F32,
    f64 => F64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn from_f32(v: f32) -> Self {
        v != 0.0
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v != 0.0
    }

    #[inline]
    fn to_f32(self) -> f32 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn zero() -> Self {
        false
    }
}
