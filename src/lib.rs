//! # scifftpack - SciPy-compatible FFT front-end
//!
//! Implements the `scipy.fftpack` surface on top of a pluggable FFT engine:
//!
//! - [`get_fft_plan`] validates a `(shape, axes)` request against an array
//!   and produces a [`PlanDescriptor`] an engine can plan against.
//! - [`rfft`] / [`irfft`] convert between real signals and the packed real
//!   spectrum layout `[y0, Re y1, Im y1, ..., Re y(n/2)]`.
//! - [`fft`], [`ifft`], [`fft2`], [`ifft2`], [`fftn`], [`ifftn`] run complex
//!   transforms, using one N-dimensional plan where the axes allow it.
//!
//! The numerical work is done by an [`FftEngine`]. The bundled
//! [`HostEngine`] runs a scalar radix-2/Bluestein kernel and caches plans.
//!
//! ## Cargo Features
//!
//! - `parallel`: transform independent lanes of an axis on the rayon pool
//!
//! ## Example
//!
//! ```
//! use scifftpack::{rfft, irfft, DynArray, NdArray};
//!
//! let x: DynArray = NdArray::from_shape_vec(&[4], vec![1.0f64, 2.0, 3.0, 4.0])?.into();
//! let packed = rfft(&x, None, -1, false)?;
//! let expected = [10.0, -2.0, 2.0, -2.0];
//! let values = packed.as_float64().map(|a| a.to_vec()).unwrap_or_default();
//! assert!(values.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-12));
//!
//! let back = irfft(&packed, None, -1, false)?;
//! let values = back.as_float64().map(|a| a.to_vec()).unwrap_or_default();
//! assert!(values.iter().zip([1.0, 2.0, 3.0, 4.0]).all(|(a, b)| (a - b).abs() < 1e-12));
//! # Ok::<(), scifftpack::FftError>(())
//! ```

/// Strided N-dimensional arrays and axis arithmetic.
pub mod array;
/// Packed real-spectrum encoding used by `rfft`/`irfft`.
pub mod codec;
pub mod config;
/// Runtime dtypes and numpy-style promotion.
pub mod dtype;
/// Engine capability and the bundled host engine.
pub mod engine;
pub mod error;
/// SciPy-style transform front-end.
pub mod fftpack;
/// Scalar radix-2 and Bluestein kernel.
pub mod kernel;
pub mod num;
/// Plan descriptors and axis validation.
pub mod plan;

pub use array::{MemoryLayout, NdArray, Order};
pub use config::FftConfig;
pub use dtype::{DType, DynArray};
pub use engine::{Direction, FftEngine, HostEngine, HostPlan};
pub use error::FftError;
pub use fftpack::{
    fft, fft2, fftn, ifft, ifft2, ifftn, irfft, plan, rfft, FftPack, HostPlanRef, PlanChoice,
};
pub use num::{Complex, Complex32, Complex64, Float};
pub use plan::{get_fft_plan, BatchGeometry, FftKind, PlanDescriptor, ValueType};
