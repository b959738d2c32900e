//! Plan descriptors for N-dimensional transforms.
//!
//! [`get_fft_plan`] validates an array and a `(shape, axes)` request and
//! produces a [`PlanDescriptor`]: the full output shape, the normalized axes,
//! the memory order and the transform kind. The descriptor is what an
//! [`FftEngine`](crate::engine::FftEngine) plans against; it also derives the
//! batched memory geometry ([`BatchGeometry`]) of the transform.
//!
//! Plans cover one to three adjacent axes. A multi-axis selection must
//! include the first or the last axis so that the untouched axes form a
//! single batch dimension on one side of the transformed block.

use core::fmt;

use crate::array::{element_count, normalize_axis, Order};
use crate::dtype::{DType, DynArray};
use crate::error::FftError;
use crate::num::Float;

/// Most axes a single plan can transform.
pub const MAX_PLAN_AXES: usize = 3;

/// Transform family requested by the caller, independent of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    #[default]
    C2C,
    R2C,
    C2R,
}

/// Concrete transform kind, precision included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FftKind {
    /// Single-precision complex to complex.
    C2C,
    /// Single-precision real to complex.
    R2C,
    /// Single-precision complex to real.
    C2R,
    /// Double-precision complex to complex.
    Z2Z,
    /// Double-precision real to complex.
    D2Z,
    /// Double-precision complex to real.
    Z2D,
}

impl FftKind {
    pub fn name(self) -> &'static str {
        match self {
            FftKind::C2C => "C2C",
            FftKind::R2C => "R2C",
            FftKind::C2R => "C2R",
            FftKind::Z2Z => "Z2Z",
            FftKind::D2Z => "D2Z",
            FftKind::Z2D => "Z2D",
        }
    }

    pub fn is_complex_to_complex(self) -> bool {
        matches!(self, FftKind::C2C | FftKind::Z2Z)
    }

    /// The complex-to-complex kind for scalar type `T`.
    pub fn complex_for<T: Float>() -> Self {
        if T::BITS == 32 {
            FftKind::C2C
        } else {
            FftKind::Z2Z
        }
    }

    /// Resolve a value type against the dtype of the array it applies to.
    ///
    /// Only the six combinations with a matching precision exist; anything
    /// else (e.g. `C2C` on a real array) is an unsupported dtype.
    pub fn from_value_type(dtype: DType, value_type: ValueType) -> Result<Self, FftError> {
        match (value_type, dtype) {
            (ValueType::C2C, DType::Complex64) => Ok(FftKind::C2C),
            (ValueType::C2C, DType::Complex128) => Ok(FftKind::Z2Z),
            (ValueType::R2C, DType::Float32) => Ok(FftKind::R2C),
            (ValueType::R2C, DType::Float64) => Ok(FftKind::D2Z),
            (ValueType::C2R, DType::Complex64) => Ok(FftKind::C2R),
            (ValueType::C2R, DType::Complex128) => Ok(FftKind::Z2D),
            (value_type, dtype) => Err(FftError::UnsupportedDtype {
                dtype,
                operation: match value_type {
                    ValueType::C2C => "a C2C plan",
                    ValueType::R2C => "an R2C plan",
                    ValueType::C2R => "a C2R plan",
                },
            }),
        }
    }
}

impl fmt::Display for FftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized description of an N-dimensional transform plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanDescriptor {
    /// Shape of the array the plan runs on: the input shape with every
    /// transformed axis resized to its requested length.
    pub full_output_shape: Vec<usize>,
    /// Transformed axes, normalized, in the caller's order.
    pub axes: Vec<usize>,
    /// Memory order the plan addresses.
    pub order: Order,
    pub kind: FftKind,
}

/// Batched memory geometry of a plan, in elements.
///
/// Element `j` of transform `b` within outer block `o` lives at
/// `o * outer_dist + b * dist + j * stride`, where `j` runs over `dims` with
/// the last dimension varying fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchGeometry {
    /// Transformed lengths, slowest-varying first. Unused trailing slots are 0.
    pub dims: [usize; MAX_PLAN_AXES],
    pub rank: usize,
    pub stride: usize,
    pub dist: usize,
    pub batch: usize,
    pub outer_batch: usize,
    pub outer_dist: usize,
}

impl BatchGeometry {
    /// The transformed lengths actually in use.
    pub fn dims(&self) -> &[usize] {
        &self.dims[..self.rank]
    }
}

impl PlanDescriptor {
    pub fn ndim(&self) -> usize {
        self.full_output_shape.len()
    }

    pub fn sorted_axes(&self) -> Vec<usize> {
        let mut sorted = self.axes.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Lengths of the transformed axes, in the order of [`Self::axes`].
    pub fn transformed_lengths(&self) -> Vec<usize> {
        self.axes.iter().map(|&axis| self.full_output_shape[axis]).collect()
    }

    /// Total number of elements the plan covers.
    pub fn element_count(&self) -> Option<usize> {
        element_count(&self.full_output_shape)
    }

    /// Derive the batched memory geometry.
    ///
    /// Axes faster than the transformed block become the inner batch (unit
    /// distance, block stride); axes slower than it become the outer batch.
    /// When the block holds the fastest axis the slower axes are the only
    /// batch dimension.
    pub fn geometry(&self) -> BatchGeometry {
        let shape = &self.full_output_shape;
        let sorted = self.sorted_axes();
        let (first, last) = match (sorted.first(), sorted.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => (0, 0),
        };
        let block = if shape.is_empty() { &[][..] } else { &shape[first..=last] };

        let mut dims = [0usize; MAX_PLAN_AXES];
        let rank = block.len().min(MAX_PLAN_AXES);
        let (inner, outer) = match self.order {
            Order::RowMajor => {
                dims[..rank].copy_from_slice(&block[..rank]);
                (product(&shape[(last + 1).min(shape.len())..]), product(&shape[..first]))
            }
            Order::ColumnMajor => {
                for (slot, &len) in dims[..rank].iter_mut().zip(block.iter().rev()) {
                    *slot = len;
                }
                (product(&shape[..first]), product(&shape[(last + 1).min(shape.len())..]))
            }
        };
        let span = product(block);

        if inner == 1 {
            BatchGeometry {
                dims,
                rank,
                stride: 1,
                dist: span,
                batch: outer,
                outer_batch: 1,
                outer_dist: span.saturating_mul(outer),
            }
        } else {
            BatchGeometry {
                dims,
                rank,
                stride: inner,
                dist: 1,
                batch: inner,
                outer_batch: outer,
                outer_dist: span.saturating_mul(inner),
            }
        }
    }
}

fn product(dims: &[usize]) -> usize {
    dims.iter().fold(1usize, |acc, &d| acc.saturating_mul(d))
}

/// Whether a sorted axis set can be served by one N-dimensional plan: one to
/// three contiguous, distinct axes including the first or last axis.
pub fn nd_plan_is_possible(sorted_axes: &[usize], ndim: usize) -> bool {
    (1..=MAX_PLAN_AXES).contains(&sorted_axes.len())
        && (sorted_axes.contains(&0)
            || ndim
                .checked_sub(1)
                .is_some_and(|last| sorted_axes.contains(&last)))
        && sorted_axes.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

/// Whether a sorted axis set can be planned at all. A single axis is always
/// plannable as a batched 1-D transform with an outer batch level.
pub fn plan_layout_supported(sorted_axes: &[usize], ndim: usize) -> bool {
    sorted_axes.len() == 1 || nd_plan_is_possible(sorted_axes, ndim)
}

/// Build the plan descriptor for transforming `array` over `axes`, resizing
/// the transformed axes to `shape`.
///
/// Only complex-to-complex plans are supported. See [`describe`] for the
/// shape and axes rules.
pub fn get_fft_plan(
    array: &DynArray,
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
    value_type: ValueType,
) -> Result<PlanDescriptor, FftError> {
    let kind = FftKind::from_value_type(array.dtype(), value_type)?;
    if !kind.is_complex_to_complex() {
        return Err(FftError::UnsupportedTransformKind { kind });
    }
    let order = array.layout().order().ok_or(FftError::NonContiguousInput)?;
    describe(array.shape(), shape, axes, order, kind)
}

/// Validate `(shape, axes)` against an array shape and normalize them into a
/// [`PlanDescriptor`].
///
/// `shape` lists the lengths of the transformed axes, not of the output; the
/// descriptor's `full_output_shape` is `array_shape` with those entries
/// replaced. Omitted `axes` mean every axis of the array.
pub fn describe(
    array_shape: &[usize],
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
    order: Order,
    kind: FftKind,
) -> Result<PlanDescriptor, FftError> {
    let ndim = array_shape.len();
    match (shape, axes) {
        (Some(s), Some(a)) if s.len() != a.len() => Err(FftError::ShapeAxesMismatch {
            shape: s.len(),
            axes: a.len(),
        }),
        (Some(s), None) if s.len() != ndim => Err(FftError::ShapeAxesMismatch {
            shape: s.len(),
            axes: ndim,
        }),
        (None, Some(a)) if a.len() > ndim => Err(FftError::TooManyAxes {
            axes: a.len(),
            ndim,
        }),
        _ => Ok(()),
    }?;
    if let Some(&length) = shape.and_then(|s| s.iter().find(|&&len| len == 0)) {
        return Err(FftError::InvalidLength { length });
    }

    let axes = match axes {
        Some(axes) => axes
            .iter()
            .map(|&axis| normalize_axis(axis, ndim))
            .collect::<Result<Vec<_>, _>>()?,
        None => (0..ndim).collect(),
    };
    let mut sorted = axes.clone();
    sorted.sort_unstable();
    if !plan_layout_supported(&sorted, ndim) {
        return Err(FftError::UnsupportedAxisLayout { axes: sorted, ndim });
    }

    let mut full_output_shape = array_shape.to_vec();
    if let Some(shape) = shape {
        for (&len, &axis) in shape.iter().zip(&axes) {
            full_output_shape[axis] = len;
        }
    }
    log::debug!(
        "plan descriptor: shape {:?} axes {:?} order {:?} kind {}",
        full_output_shape,
        axes,
        order,
        kind
    );
    Ok(PlanDescriptor {
        full_output_shape,
        axes,
        order,
        kind,
    })
}
