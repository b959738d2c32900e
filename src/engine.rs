//! FFT engine capability and the bundled host engine.
//!
//! The front-end never computes a transform itself: it validates requests,
//! converts dtypes and packs spectra, and hands the numerical work to an
//! [`FftEngine`]. [`HostEngine`] is the engine used by default; it runs the
//! scalar kernel from [`crate::kernel`] over the lanes of each transformed
//! axis and keeps a bounded cache of plans.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::array::{
    contiguous_strides, element_count, for_each_index, MemoryLayout, NdArray, Order,
};
use crate::config::FftConfig;
use crate::error::FftError;
use crate::kernel::ScalarFft;
use crate::num::{Complex, Float};
use crate::plan::{plan_layout_supported, BatchGeometry, FftKind, PlanDescriptor};

/// Direction of a complex-to-complex transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `exp(-2πi jk/n)` kernel, unnormalized.
    Forward,
    /// `exp(+2πi jk/n)` kernel, normalized by `1/n`.
    Inverse,
}

/// Numerical backend consumed by the front-end.
///
/// Axes passed to the execution methods are already normalized. Inputs are
/// cropped or zero-padded by the engine to the requested lengths. Inverse
/// transforms are normalized by `1/N`. `overwrite_allowed` tells the engine
/// it may reuse the input buffer as scratch; engines are free to ignore it.
pub trait FftEngine: Send + Sync {
    type Plan: Send + Sync;

    /// Build a reusable plan for a descriptor.
    fn plan(&self, descriptor: &PlanDescriptor) -> Result<Self::Plan, FftError>;

    /// Complex transform over `axes`, resizing each to the paired length.
    /// A supplied plan must describe exactly this call.
    fn c2c<T: Float>(
        &self,
        plan: Option<&Self::Plan>,
        input: &NdArray<Complex<T>>,
        lengths: &[usize],
        axes: &[usize],
        direction: Direction,
        overwrite_allowed: bool,
    ) -> Result<NdArray<Complex<T>>, FftError>;

    /// Forward real transform of length `n` along `axis`, returning the
    /// `n/2 + 1` non-negative frequency bins.
    fn r2c<T: Float>(
        &self,
        input: &NdArray<T>,
        n: usize,
        axis: usize,
        overwrite_allowed: bool,
    ) -> Result<NdArray<Complex<T>>, FftError>;

    /// Inverse of [`Self::r2c`]: a half spectrum along `axis` to a real
    /// signal of length `n`.
    fn c2r<T: Float>(
        &self,
        input: &NdArray<Complex<T>>,
        n: usize,
        axis: usize,
        overwrite_allowed: bool,
    ) -> Result<NdArray<T>, FftError>;
}

/// Plan produced by [`HostEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlan {
    pub descriptor: PlanDescriptor,
    pub geometry: BatchGeometry,
}

struct PlanCache {
    entries: HashMap<PlanDescriptor, Arc<HostPlan>>,
    order: VecDeque<PlanDescriptor>,
    capacity: usize,
}

impl PlanCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&mut self, descriptor: &PlanDescriptor) -> Option<Arc<HostPlan>> {
        let plan = self.entries.get(descriptor).map(Arc::clone)?;
        self.order.retain(|d| d != descriptor);
        self.order.push_back(descriptor.clone());
        Some(plan)
    }

    fn insert(&mut self, plan: Arc<HostPlan>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(old) = self.order.pop_front() {
                log::trace!("evicting plan for shape {:?}", old.full_output_shape);
                self.entries.remove(&old);
            }
        }
        self.order.push_back(plan.descriptor.clone());
        self.entries.insert(plan.descriptor.clone(), plan);
    }
}

/// Engine running the bundled scalar kernel on the host.
pub struct HostEngine {
    config: FftConfig,
    single: ScalarFft<f32>,
    double: ScalarFft<f64>,
    plans: Mutex<PlanCache>,
}

impl Default for HostEngine {
    fn default() -> Self {
        Self::new(*FftConfig::global())
    }
}

impl HostEngine {
    pub fn new(config: FftConfig) -> Self {
        Self {
            config,
            single: ScalarFft::default(),
            double: ScalarFft::default(),
            plans: Mutex::new(PlanCache::new(config.plan_cache_size)),
        }
    }

    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    /// Number of plans currently cached.
    pub fn cached_plans(&self) -> Result<usize, FftError> {
        self.plans
            .lock()
            .map(|cache| cache.entries.len())
            .map_err(|_| FftError::EngineExecution {
                detail: "plan cache lock poisoned".into(),
            })
    }

    fn kernel<T: Float>(&self) -> Result<&ScalarFft<T>, FftError> {
        let kernel: &dyn Any = if T::BITS == 32 {
            &self.single
        } else {
            &self.double
        };
        kernel
            .downcast_ref::<ScalarFft<T>>()
            .ok_or_else(|| FftError::EngineUnsupportedShape {
                detail: format!("no kernel for {}-bit scalars", T::BITS),
            })
    }

    fn check_size(&self, shape: &[usize]) -> Result<(), FftError> {
        let limit = self.config.max_elements;
        match element_count(shape) {
            Some(count) if count <= limit => Ok(()),
            Some(count) => Err(FftError::EngineResourceExhausted {
                requested: count,
                limit,
            }),
            None => Err(FftError::EngineResourceExhausted {
                requested: usize::MAX,
                limit,
            }),
        }
    }

    fn build_plan(&self, descriptor: &PlanDescriptor) -> Result<HostPlan, FftError> {
        if !descriptor.kind.is_complex_to_complex() {
            return Err(FftError::UnsupportedTransformKind {
                kind: descriptor.kind,
            });
        }
        let ndim = descriptor.ndim();
        let sorted = descriptor.sorted_axes();
        if sorted.iter().any(|&axis| axis >= ndim) || !plan_layout_supported(&sorted, ndim) {
            return Err(FftError::EngineUnsupportedShape {
                detail: format!("axes {:?} of a {ndim}-d array", descriptor.axes),
            });
        }
        if descriptor.full_output_shape.contains(&0) {
            return Err(FftError::EngineUnsupportedShape {
                detail: format!("empty shape {:?}", descriptor.full_output_shape),
            });
        }
        self.check_size(&descriptor.full_output_shape)?;
        Ok(HostPlan {
            descriptor: descriptor.clone(),
            geometry: descriptor.geometry(),
        })
    }
}

impl FftEngine for HostEngine {
    type Plan = Arc<HostPlan>;

    fn plan(&self, descriptor: &PlanDescriptor) -> Result<Self::Plan, FftError> {
        let mut cache = self.plans.lock().map_err(|_| FftError::EngineExecution {
            detail: "plan cache lock poisoned".into(),
        })?;
        if let Some(plan) = cache.get(descriptor) {
            log::debug!("plan cache hit for shape {:?}", descriptor.full_output_shape);
            return Ok(plan);
        }
        log::debug!("plan cache miss for shape {:?}", descriptor.full_output_shape);
        let plan = Arc::new(self.build_plan(descriptor)?);
        cache.insert(Arc::clone(&plan));
        Ok(plan)
    }

    fn c2c<T: Float>(
        &self,
        plan: Option<&Self::Plan>,
        input: &NdArray<Complex<T>>,
        lengths: &[usize],
        axes: &[usize],
        direction: Direction,
        _overwrite_allowed: bool,
    ) -> Result<NdArray<Complex<T>>, FftError> {
        if lengths.len() != axes.len() {
            return Err(FftError::EngineUnsupportedShape {
                detail: format!("{} lengths for {} axes", lengths.len(), axes.len()),
            });
        }
        let mut shape = input.shape().to_vec();
        for (&n, &axis) in lengths.iter().zip(axes) {
            if n == 0 || axis >= shape.len() {
                return Err(FftError::EngineUnsupportedShape {
                    detail: format!("length {n} along axis {axis} of a {}-d array", shape.len()),
                });
            }
            shape[axis] = n;
        }
        self.check_size(&shape)?;

        // Lanes are transformed in place through the strides, so views whose
        // elements alias each other are copied out first.
        let mut work = match input.layout() {
            MemoryLayout::Strided => input.to_order(Order::RowMajor),
            _ => input.clone(),
        };
        for (&n, &axis) in lengths.iter().zip(axes) {
            if work.shape()[axis] != n {
                work = work.resized_along(axis, n, Complex::zero())?;
            }
        }
        let kernel = self.kernel::<T>()?;
        log::trace!(
            "c2c {:?} shape {:?} axes {:?} planned={}",
            direction,
            shape,
            axes,
            plan.is_some()
        );

        match plan {
            Some(plan) => {
                verify_plan::<T>(plan, &shape, axes)?;
                let order = plan.descriptor.order;
                if work.strides() != contiguous_strides(&shape, order).as_slice() {
                    work = work.to_order(order);
                }
                let geometry = &plan.geometry;
                for dim in 0..geometry.rank {
                    let (starts, stride, len) = geometry_lanes(geometry, dim);
                    transform_lanes(kernel, work.storage_mut(), &starts, stride, len, direction)?;
                }
            }
            None => {
                for &axis in axes {
                    transform_axis(kernel, &mut work, axis, direction)?;
                }
            }
        }
        Ok(work)
    }

    fn r2c<T: Float>(
        &self,
        input: &NdArray<T>,
        n: usize,
        axis: usize,
        _overwrite_allowed: bool,
    ) -> Result<NdArray<Complex<T>>, FftError> {
        let mut shape = check_axis(input.shape(), n, axis)?;
        self.check_size(&shape)?;
        let kernel = self.kernel::<T>()?;
        log::trace!("r2c n={n} axis={axis} shape {:?}", input.shape());

        let mut work = input.resized_along(axis, n, T::zero())?.map(Complex::from);
        transform_axis(kernel, &mut work, axis, Direction::Forward)?;
        shape[axis] = n / 2 + 1;
        work.resized_along(axis, shape[axis], Complex::zero())
    }

    fn c2r<T: Float>(
        &self,
        input: &NdArray<Complex<T>>,
        n: usize,
        axis: usize,
        _overwrite_allowed: bool,
    ) -> Result<NdArray<T>, FftError> {
        let shape = check_axis(input.shape(), n, axis)?;
        self.check_size(&shape)?;
        let kernel = self.kernel::<T>()?;
        log::trace!("c2r n={n} axis={axis} shape {:?}", input.shape());

        let mut full = NdArray::filled(&shape, Complex::zero(), Order::RowMajor)?;
        let keep = input.shape()[axis].min(n / 2 + 1);
        let src_stride = input.strides()[axis];
        let dst_stride = full.strides()[axis];
        let src = input.storage();
        for (s, d) in input.lane_starts(axis).into_iter().zip(full.lane_starts(axis)) {
            let lane = full.storage_mut();
            for k in 0..keep {
                lane[d + k * dst_stride] = src[s + k * src_stride];
            }
            for k in n / 2 + 1..n {
                lane[d + k * dst_stride] = lane[d + (n - k) * dst_stride].conj();
            }
        }
        transform_axis(kernel, &mut full, axis, Direction::Inverse)?;
        Ok(full.map(|c| c.re))
    }
}

fn check_axis(shape: &[usize], n: usize, axis: usize) -> Result<Vec<usize>, FftError> {
    if n == 0 || axis >= shape.len() {
        return Err(FftError::EngineUnsupportedShape {
            detail: format!("length {n} along axis {axis} of a {}-d array", shape.len()),
        });
    }
    let mut shape = shape.to_vec();
    shape[axis] = n;
    Ok(shape)
}

fn verify_plan<T: Float>(
    plan: &HostPlan,
    shape: &[usize],
    axes: &[usize],
) -> Result<(), FftError> {
    let descriptor = &plan.descriptor;
    if descriptor.full_output_shape != shape {
        return Err(FftError::PlanMismatch {
            detail: format!(
                "plan shape {:?}, transform shape {:?}",
                descriptor.full_output_shape, shape
            ),
        });
    }
    let mut sorted = axes.to_vec();
    sorted.sort_unstable();
    if descriptor.sorted_axes() != sorted {
        return Err(FftError::PlanMismatch {
            detail: format!("plan axes {:?}, transform axes {:?}", descriptor.axes, axes),
        });
    }
    let kind = FftKind::complex_for::<T>();
    if descriptor.kind != kind {
        return Err(FftError::PlanMismatch {
            detail: format!("plan kind {}, transform kind {}", descriptor.kind, kind),
        });
    }
    Ok(())
}

/// Lane offsets, element stride and length for transforming dimension `dim`
/// of every block described by `geometry`.
fn geometry_lanes(geometry: &BatchGeometry, dim: usize) -> (Vec<usize>, usize, usize) {
    let dims = geometry.dims();
    let mut block_strides = vec![geometry.stride; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        block_strides[i] = block_strides[i + 1] * dims[i + 1];
    }
    let mut others = dims.to_vec();
    others[dim] = 1;
    let mut block_offsets = Vec::new();
    for_each_index(&others, Order::RowMajor, |index| {
        let offset = index.iter().zip(&block_strides).map(|(&i, &s)| i * s);
        block_offsets.push(offset.sum::<usize>());
    });

    let lanes = geometry.outer_batch * geometry.batch * block_offsets.len();
    let mut starts = Vec::with_capacity(lanes);
    for outer in 0..geometry.outer_batch {
        for batch in 0..geometry.batch {
            let base = outer * geometry.outer_dist + batch * geometry.dist;
            starts.extend(block_offsets.iter().map(|&offset| base + offset));
        }
    }
    (starts, block_strides[dim], dims[dim])
}

fn transform_axis<T: Float>(
    kernel: &ScalarFft<T>,
    array: &mut NdArray<Complex<T>>,
    axis: usize,
    direction: Direction,
) -> Result<(), FftError> {
    let starts = array.lane_starts(axis);
    let stride = array.strides()[axis];
    let len = array.shape()[axis];
    transform_lanes(kernel, array.storage_mut(), &starts, stride, len, direction)
}

fn transform_lanes<T: Float>(
    kernel: &ScalarFft<T>,
    data: &mut [Complex<T>],
    starts: &[usize],
    stride: usize,
    len: usize,
    direction: Direction,
) -> Result<(), FftError> {
    let mut lanes: Vec<Vec<Complex<T>>> = starts
        .iter()
        .map(|&start| (0..len).map(|k| data[start + k * stride]).collect())
        .collect();

    #[cfg(feature = "parallel")]
    lanes
        .par_iter_mut()
        .try_for_each(|lane| run_lane(kernel, lane, direction))?;
    #[cfg(not(feature = "parallel"))]
    lanes
        .iter_mut()
        .try_for_each(|lane| run_lane(kernel, lane, direction))?;

    for (&start, lane) in starts.iter().zip(&lanes) {
        for (k, &value) in lane.iter().enumerate() {
            data[start + k * stride] = value;
        }
    }
    Ok(())
}

fn run_lane<T: Float>(
    kernel: &ScalarFft<T>,
    lane: &mut [Complex<T>],
    direction: Direction,
) -> Result<(), FftError> {
    match direction {
        Direction::Forward => kernel.fft(lane),
        Direction::Inverse => {
            kernel.ifft(lane)?;
            let n = T::from_usize(lane.len()).ok_or_else(|| FftError::EngineUnsupportedShape {
                detail: format!("length {} is not exactly representable", lane.len()),
            })?;
            let scale = T::one() / n;
            for value in lane.iter_mut() {
                *value = value.scale(scale);
            }
            Ok(())
        }
    }
}
