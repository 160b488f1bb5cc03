use std::{fmt, str::FromStr};

use thiserror::Error;

/// Element type of an extracted slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    I8,
    I16,
    I32,
    U8,
    U16,
    U32,
    F32,
    F64,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown dtype descriptor {0:?}, expected e.g. f4, float32, i2, int16")]
pub struct ParseDtypeError(String);

impl Dtype {
    pub fn byte_size(self) -> usize {
        match self {
            Dtype::I8 | Dtype::U8 => 1,
            Dtype::I16 | Dtype::U16 => 2,
            Dtype::I32 | Dtype::U32 | Dtype::F32 => 4,
            Dtype::F64 => 8,
        }
    }

    /// Kind letter and width as used in NumPy `descr` strings, e.g. `f4`.
    pub fn npy_code(self) -> &'static str {
        match self {
            Dtype::I8 => "i1",
            Dtype::I16 => "i2",
            Dtype::I32 => "i4",
            Dtype::U8 => "u1",
            Dtype::U16 => "u2",
            Dtype::U32 => "u4",
            Dtype::F32 => "f4",
            Dtype::F64 => "f8",
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Dtype::F32 | Dtype::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Dtype::I8 | Dtype::I16 | Dtype::I32)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dtype::I8 => "int8",
            Dtype::I16 => "int16",
            Dtype::I32 => "int32",
            Dtype::U8 => "uint8",
            Dtype::U16 => "uint16",
            Dtype::U32 => "uint32",
            Dtype::F32 => "float32",
            Dtype::F64 => "float64",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Dtype {
    type Err = ParseDtypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // byte order is chosen separately when writing
        let descr = s.trim().trim_start_matches(['<', '>', '=', '|']);
        let dtype = match descr {
            "i1" | "b" | "int8" => Dtype::I8,
            "i2" | "h" | "int16" => Dtype::I16,
            "i4" | "i" | "int32" => Dtype::I32,
            "u1" | "B" | "uint8" => Dtype::U8,
            "u2" | "H" | "uint16" => Dtype::U16,
            "u4" | "I" | "uint32" => Dtype::U32,
            "f4" | "f" | "float32" => Dtype::F32,
            "f8" | "d" | "float64" | "float" => Dtype::F64,
            _ => return Err(ParseDtypeError(s.to_owned())),
        };
        Ok(dtype)
    }
}

/// A Rust numeric type a slice can be built from.
pub trait Element: Copy + PartialEq + fmt::Debug + 'static {
    const DTYPE: Dtype;

    /// Numeric cast with `as` semantics: saturating, NaN becomes zero for
    /// integer types.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: Dtype = $dtype;

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_element! {
    i8 => Dtype::I8,
    i16 => Dtype::I16,
    i32 => Dtype::I32,
    u8 => Dtype::U8,
    u16 => Dtype::U16,
    u32 => Dtype::U32,
    f32 => Dtype::F32,
    f64 => Dtype::F64,
}
