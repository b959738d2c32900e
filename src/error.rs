//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

use crate::dtype::DType;
use crate::plan::FftKind;

/// Errors raised while validating a request or executing it on an engine.
///
/// Validation variants are always raised before any engine call; the
/// `Engine*` variants originate in the engine and are surfaced unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FftError {
    /// The input array is neither C- nor F-contiguous.
    #[error("input array must be C- or F-contiguous")]
    NonContiguousInput,
    /// `shape` and `axes` disagree in length, or `shape` disagrees with `ndim`.
    #[error("shape and axes have different lengths ({shape} vs {axes})")]
    ShapeAxesMismatch { shape: usize, axes: usize },
    /// More axes were requested than the array has.
    #[error("the number of axes ({axes}) exceeds the array dimension ({ndim})")]
    TooManyAxes { axes: usize, ndim: usize },
    /// The axis set cannot be expressed as a single batched plan.
    #[error(
        "axes {axes:?} of a {ndim}-d array cannot be planned: between one and three \
         contiguous, non-repeated axes including the first or last axis are required"
    )]
    UnsupportedAxisLayout { axes: Vec<usize>, ndim: usize },
    /// The requested transform kind is not a complex-to-complex kind.
    #[error("only C2C and Z2Z plans are supported, got {kind}")]
    UnsupportedTransformKind { kind: FftKind },
    /// An axis index lies outside `[-ndim, ndim)`.
    #[error("axis {axis} is out of range for a {ndim}-d array")]
    AxisOutOfRange { axis: isize, ndim: usize },
    /// A transform length is zero.
    #[error("invalid number of data points ({length}) specified")]
    InvalidLength { length: usize },
    /// The input dtype has no defined promotion for the operation.
    #[error("dtype {dtype} is not supported by {operation}")]
    UnsupportedDtype {
        dtype: DType,
        operation: &'static str,
    },
    /// Shape, strides and storage of an array do not agree.
    #[error("invalid array: {detail}")]
    InvalidArray { detail: &'static str },
    /// A supplied plan does not describe the requested transform.
    #[error("plan does not match the transform: {detail}")]
    PlanMismatch { detail: String },
    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
    /// The engine cannot plan or execute this shape.
    #[error("engine cannot handle shape: {detail}")]
    EngineUnsupportedShape { detail: String },
    /// The engine refused a request that exceeds its resource limits.
    #[error("engine resources exhausted: {requested} elements requested, limit is {limit}")]
    EngineResourceExhausted { requested: usize, limit: usize },
    /// The engine failed while executing a transform.
    #[error("engine execution failed: {detail}")]
    EngineExecution { detail: String },
}
