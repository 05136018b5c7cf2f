//! Scalar element types accepted by the distance kernels.
//!
//! The element type is the second specialization axis, orthogonal to the
//! instruction-set tier. [`Element`] is sealed: only `f32` and `f64` have
//! kernel tables.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Runtime tag for an [`Element`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// IEEE 754 single precision.
    F32,
    /// IEEE 754 double precision.
    F64,
}

impl ElementType {
    /// All element types, in table order.
    pub const ALL: [ElementType; 2] = [ElementType::F32, ElementType::F64];

    /// Size of one element in bytes.
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            ElementType::F32 => 4,
            ElementType::F64 => 8,
        }
    }

    /// Lowercase canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f32" | "float" | "float32" => Ok(ElementType::F32),
            "f64" | "double" | "float64" => Ok(ElementType::F64),
            other => Err(Error::UnknownElement(other.to_string())),
        }
    }
}

/// A distance value tagged with its element type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Single-precision result.
    F32(f32),
    /// Double-precision result.
    F64(f64),
}

impl Scalar {
    /// Element type of the value.
    #[must_use]
    pub const fn element_type(self) -> ElementType {
        match self {
            Scalar::F32(_) => ElementType::F32,
            Scalar::F64(_) => ElementType::F64,
        }
    }

    /// Widens the value to `f64`.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::F32(v) => f64::from(v),
            Scalar::F64(v) => v,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::F32(v) => v.fmt(f),
            Scalar::F64(v) => v.fmt(f),
        }
    }
}

pub(crate) mod sealed {
    use std::sync::OnceLock;

    use crate::metric::Metric;
    use crate::simd_native::{KernelSlots, Variant, VariantTables};

    /// Per-type kernel tables. Implemented next to the kernels in
    /// `simd_native::variants`.
    pub trait Sealed: Sized + 'static {
        /// Variants for `metric`, widest tier first, scalar last.
        fn variants(metric: Metric) -> &'static [Variant<Self>];

        /// Table lookup for this type within a registry's `tables`.
        fn table(tables: &VariantTables) -> fn(Metric) -> &'static [Variant<Self>];

        /// Dispatch slot holding the cached selection for `metric`.
        fn slot(slots: &KernelSlots, metric: Metric) -> &OnceLock<Option<Variant<Self>>>;
    }
}

/// Floating-point element type with dispatched distance kernels.
///
/// Results are accumulated and returned in the element type itself; no
/// variant promotes `f32` inputs to `f64` accumulation.
pub trait Element:
    sealed::Sealed
    + Copy
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// Runtime tag for this type.
    const TYPE: ElementType;
    /// Additive identity.
    const ZERO: Self;
    /// Machine epsilon.
    const EPSILON: Self;

    /// Absolute value.
    fn abs(self) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Whether the value is NaN.
    fn is_nan(self) -> bool;
    /// Lossless or rounding conversion from `f64`.
    fn from_f64(v: f64) -> Self;
    /// Widening conversion to `f64`.
    fn to_f64(self) -> f64;
    /// Wraps the value in a tagged [`Scalar`].
    fn into_scalar(self) -> Scalar;
}

impl Element for f32 {
    const TYPE: ElementType = ElementType::F32;
    const ZERO: Self = 0.0;
    const EPSILON: Self = f32::EPSILON;

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)] // Rounds to nearest by definition.
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::F32(self)
    }
}

impl Element for f64 {
    const TYPE: ElementType = ElementType::F64;
    const ZERO: Self = 0.0;
    const EPSILON: Self = f64::EPSILON;

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::F64(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_parse() {
        assert_eq!("double".parse::<ElementType>().unwrap(), ElementType::F64);
        assert_eq!("F32".parse::<ElementType>().unwrap(), ElementType::F32);
        assert!(matches!(
            "f16".parse::<ElementType>(),
            Err(Error::UnknownElement(_))
        ));
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(<f32 as Element>::TYPE, ElementType::F32);
        assert_eq!(<f64 as Element>::TYPE, ElementType::F64);
        assert_eq!(ElementType::F64.size_bytes(), std::mem::size_of::<f64>());
    }

    #[test]
    fn test_scalar_tagging() {
        let s = 1.5_f32.into_scalar();
        assert_eq!(s, Scalar::F32(1.5));
        assert_eq!(s.element_type(), ElementType::F32);
        assert_eq!(s.to_f64(), 1.5);
        assert_eq!(Scalar::F64(2.25).to_string(), "2.25");
    }
}
