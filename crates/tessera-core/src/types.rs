//! Core type definitions: DType registry, Shape.

use serde::{Deserialize, Serialize};

/// Supported element kinds.
///
/// Serialized under their registry names (`"float32"`, `"uint16"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    #[serde(rename = "float32")]
    F32,
    #[serde(rename = "float64")]
    F64,
    #[serde(rename = "int8")]
    I8,
    #[serde(rename = "int16")]
    I16,
    #[serde(rename = "int32")]
    I32,
    #[serde(rename = "int64")]
    I64,
    #[serde(rename = "uint8")]
    U8,
    #[serde(rename = "uint16")]
    U16,
    #[serde(rename = "uint32")]
    U32,
    #[serde(rename = "uint64")]
    U64,
    #[serde(rename = "bool")]
    Bool,
}

/// Static description of an element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DTypeInfo {
    pub size_bytes: usize,
    pub name: &'static str,
    pub is_float: bool,
    pub is_signed_int: bool,
    pub is_unsigned_int: bool,
}

const fn info(
    size_bytes: usize,
    name: &'static str,
    is_float: bool,
    is_signed_int: bool,
    is_unsigned_int: bool,
) -> DTypeInfo {
    DTypeInfo {
        size_bytes,
        name,
        is_float,
        is_signed_int,
        is_unsigned_int,
    }
}

/// Registry rows, indexed by `DType::index`.
const REGISTRY: [DTypeInfo; 11] = [
    info(4, "float32", true, false, false),
    info(8, "float64", true, false, false),
    info(1, "int8", false, true, false),
    info(2, "int16", false, true, false),
    info(4, "int32", false, true, false),
    info(8, "int64", false, true, false),
    info(1, "uint8", false, false, true),
    info(2, "uint16", false, false, true),
    info(4, "uint32", false, false, true),
    info(8, "uint64", false, false, true),
    info(1, "bool", false, false, false),
];

impl DType {
    /// Every kind, in registry order.
    pub const ALL: [DType; 11] = [
        DType::F32,
        DType::F64,
        DType::I8,
        DType::I16,
        DType::I32,
        DType::I64,
        DType::U8,
        DType::U16,
        DType::U32,
        DType::U64,
        DType::Bool,
    ];

    const fn index(self) -> usize {
        match self {
            DType::F32 => 0,
            DType::F64 => 1,
            DType::I8 => 2,
            DType::I16 => 3,
            DType::I32 => 4,
            DType::I64 => 5,
            DType::U8 => 6,
            DType::U16 => 7,
            DType::U32 => 8,
            DType::U64 => 9,
            DType::Bool => 10,
        }
    }

    /// Registry entry for this kind.
    pub const fn info(self) -> DTypeInfo {
        REGISTRY[self.index()]
    }

    /// Size in bytes of a single element.
    pub const fn size_bytes(self) -> usize {
        self.info().size_bytes
    }

    pub const fn name(self) -> &'static str {
        self.info().name
    }

    pub const fn is_float(self) -> bool {
        self.info().is_float
    }

    pub const fn is_signed_int(self) -> bool {
        self.info().is_signed_int
    }

    pub const fn is_unsigned_int(self) -> bool {
        self.info().is_unsigned_int
    }

    pub const fn is_int(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    /// Look up a kind by its display name (`"float32"`, `"uint8"`, ...).
    pub fn from_name(name: &str) -> Option<DType> {
        DType::ALL.into_iter().find(|dt| dt.name() == name)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Array shape (dimensions).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(pub Vec<usize>);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self(dims.into())
    }

    /// Scalar (rank-0) shape.
    pub fn scalar() -> Self {
        Self(vec![])
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Get dimension at axis (supports negative indexing).
    pub fn dim(&self, axis: isize) -> Option<usize> {
        let ndim = self.0.len() as isize;
        let idx = if axis < 0 { ndim + axis } else { axis };
        if idx >= 0 && idx < ndim {
            Some(self.0[idx as usize])
        } else {
            None
        }
    }

    /// Row-major strides, computed right-to-left as a cumulative product.
    pub fn contiguous_strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.0.len()];
        let mut stride = 1;
        for i in (0..self.0.len()).rev() {
            strides[i] = stride;
            stride *= self.0[i];
        }
        strides
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}
