//! Runtime dtypes for the SciPy-style surface.
//!
//! [`DynArray`] carries one of the element types a caller may hand to
//! `scipy.fftpack`; the promotion helpers pick the precision the engine runs
//! at, following numpy: `float32` stays single precision, booleans, integers
//! and `float64` run in double precision.

use core::fmt;
use std::borrow::Cow;

use crate::array::{MemoryLayout, NdArray};
use crate::error::FftError;
use crate::num::{Complex, Complex32, Complex64, Float};

/// Element type tag, named after the numpy dtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Two `f32` components.
    Complex64,
    /// Two `f64` components.
    Complex128,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        }
    }

    pub fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Array whose element type is only known at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum DynArray {
    Bool(NdArray<bool>),
    Int32(NdArray<i32>),
    Int64(NdArray<i64>),
    Float32(NdArray<f32>),
    Float64(NdArray<f64>),
    Complex64(NdArray<Complex32>),
    Complex128(NdArray<Complex64>),
}

macro_rules! dispatch {
    ($value:expr, $array:ident => $body:expr) => {
        match $value {
            DynArray::Bool($array) => $body,
            DynArray::Int32($array) => $body,
            DynArray::Int64($array) => $body,
            DynArray::Float32($array) => $body,
            DynArray::Float64($array) => $body,
            DynArray::Complex64($array) => $body,
            DynArray::Complex128($array) => $body,
        }
    };
}

impl DynArray {
    pub fn dtype(&self) -> DType {
        match self {
            DynArray::Bool(_) => DType::Bool,
            DynArray::Int32(_) => DType::Int32,
            DynArray::Int64(_) => DType::Int64,
            DynArray::Float32(_) => DType::Float32,
            DynArray::Float64(_) => DType::Float64,
            DynArray::Complex64(_) => DType::Complex64,
            DynArray::Complex128(_) => DType::Complex128,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        dispatch!(self, a => a.ndim())
    }

    pub fn layout(&self) -> MemoryLayout {
        dispatch!(self, a => a.layout())
    }

    pub fn as_float32(&self) -> Option<&NdArray<f32>> {
        match self {
            DynArray::Float32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&NdArray<f64>> {
        match self {
            DynArray::Float64(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_complex64(&self) -> Option<&NdArray<Complex32>> {
        match self {
            DynArray::Complex64(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_complex128(&self) -> Option<&NdArray<Complex64>> {
        match self {
            DynArray::Complex128(a) => Some(a),
            _ => None,
        }
    }

    /// Real input for `rfft`/`irfft`. Complex inputs have no real promotion.
    pub(crate) fn to_real(&self, operation: &'static str) -> Result<RealArray<'_>, FftError> {
        match self {
            DynArray::Float32(a) => Ok(RealArray::Single(Cow::Borrowed(a))),
            DynArray::Float64(a) => Ok(RealArray::Double(Cow::Borrowed(a))),
            DynArray::Bool(a) => Ok(RealArray::Double(Cow::Owned(
                a.map(|v| if v { 1.0 } else { 0.0 }),
            ))),
            DynArray::Int32(a) => Ok(RealArray::Double(Cow::Owned(a.map(f64::from)))),
            DynArray::Int64(a) => Ok(RealArray::Double(Cow::Owned(a.map(|v| v as f64)))),
            DynArray::Complex64(_) | DynArray::Complex128(_) => Err(FftError::UnsupportedDtype {
                dtype: self.dtype(),
                operation,
            }),
        }
    }

    /// Owned complex copy for complex-to-complex transforms.
    pub(crate) fn to_complex(&self) -> ComplexArray {
        match self {
            DynArray::Float32(a) => ComplexArray::Single(a.map(Complex::from)),
            DynArray::Complex64(a) => ComplexArray::Single(a.clone()),
            DynArray::Complex128(a) => ComplexArray::Double(a.clone()),
            DynArray::Float64(a) => ComplexArray::Double(a.map(Complex::from)),
            DynArray::Bool(a) => {
                ComplexArray::Double(a.map(|v| Complex::from(if v { 1.0 } else { 0.0 })))
            }
            DynArray::Int32(a) => ComplexArray::Double(a.map(|v| Complex::from(f64::from(v)))),
            DynArray::Int64(a) => ComplexArray::Double(a.map(|v| Complex::from(v as f64))),
        }
    }
}

macro_rules! impl_from_array {
    ($elem:ty, $variant:ident) => {
        impl From<NdArray<$elem>> for DynArray {
            fn from(array: NdArray<$elem>) -> Self {
                DynArray::$variant(array)
            }
        }
    };
}

impl_from_array!(bool, Bool);
impl_from_array!(i32, Int32);
impl_from_array!(i64, Int64);
impl_from_array!(f32, Float32);
impl_from_array!(f64, Float64);
impl_from_array!(Complex32, Complex64);
impl_from_array!(Complex64, Complex128);

/// Real operand resolved to an engine precision.
pub(crate) enum RealArray<'a> {
    Single(Cow<'a, NdArray<f32>>),
    Double(Cow<'a, NdArray<f64>>),
}

/// Complex operand resolved to an engine precision.
pub(crate) enum ComplexArray {
    Single(NdArray<Complex32>),
    Double(NdArray<Complex64>),
}

/// Precision-generic glue between typed arrays and [`DynArray`].
pub trait Element: Float {
    fn real_dyn(array: NdArray<Self>) -> DynArray;
    fn complex_dyn(array: NdArray<Complex<Self>>) -> DynArray;
}

impl Element for f32 {
    fn real_dyn(array: NdArray<Self>) -> DynArray {
        DynArray::Float32(array)
    }
    fn complex_dyn(array: NdArray<Complex<Self>>) -> DynArray {
        DynArray::Complex64(array)
    }
}

impl Element for f64 {
    fn real_dyn(array: NdArray<Self>) -> DynArray {
        DynArray::Float64(array)
    }
    fn complex_dyn(array: NdArray<Complex<Self>>) -> DynArray {
        DynArray::Complex128(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_promote_to_double_precision() {
        let ints: DynArray = NdArray::from_shape_vec(&[3], vec![1i32, 2, 3]).unwrap().into();
        match ints.to_real("rfft").unwrap() {
            RealArray::Double(a) => assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]),
            RealArray::Single(_) => panic!("int32 must promote to float64"),
        }
        match ints.to_complex() {
            ComplexArray::Double(a) => assert_eq!(a.to_vec()[2], Complex64::new(3.0, 0.0)),
            ComplexArray::Single(_) => panic!("int32 must promote to complex128"),
        }
    }

    #[test]
    fn float32_keeps_single_precision() {
        let a: DynArray = NdArray::from_shape_vec(&[2], vec![1.0f32, 2.0]).unwrap().into();
        assert!(matches!(a.to_real("rfft"), Ok(RealArray::Single(Cow::Borrowed(_)))));
        assert!(matches!(a.to_complex(), ComplexArray::Single(_)));
    }

    #[test]
    fn complex_input_has_no_real_promotion() {
        let a: DynArray = NdArray::from_shape_vec(&[1], vec![Complex64::zero()]).unwrap().into();
        assert_eq!(
            a.to_real("irfft").err(),
            Some(FftError::UnsupportedDtype {
                dtype: DType::Complex128,
                operation: "irfft",
            })
        );
    }

    #[test]
    fn dtype_names_follow_numpy() {
        assert_eq!(DType::Complex64.to_string(), "complex64");
        assert!(DType::Complex128.is_complex());
        assert!(!DType::Float64.is_complex());
    }
}
