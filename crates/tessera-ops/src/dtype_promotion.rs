//! Element-kind promotion.
//!
//! When two arrays with different kinds are combined on the promoted path,
//! the result kind is the higher of the two in a single total order:
//!
//! `bool < uint8 < int8 < uint16 < int16 < uint32 < int32 < float32 < uint64 < int64 < float64`

use tessera_core::DType;

/// Promote two kinds to a common result kind.
pub fn promote(a: DType, b: DType) -> DType {
    if a == b {
        return a;
    }
    let pa = priority(a);
    let pb = priority(b);
    if pa >= pb { a } else { b }
}

/// Position in the promotion order (higher = wider).
pub fn priority(dt: DType) -> u8 {
    match dt {
        DType::Bool => 0,
        DType::U8 => 1,
        DType::I8 => 2,
        DType::U16 => 3,
        DType::I16 => 4,
        DType::U32 => 5,
        DType::I32 => 6,
        DType::F32 => 7,
        DType::U64 => 8,
        DType::I64 => 9,
        DType::F64 => 10,
    }
}

/// Kind used for float results: float inputs keep their kind, everything
/// else computes in float32.
pub fn float_result(dt: DType) -> DType {
    if dt.is_float() { dt } else { DType::F32 }
}
