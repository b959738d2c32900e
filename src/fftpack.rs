//! `scipy.fftpack`-compatible transforms.
//!
//! [`FftPack`] binds the front-end to an [`FftEngine`]. The free functions
//! at the bottom of this module run on a process-wide [`FftPack`] backed by
//! the [`HostEngine`] and configured from the environment.

use std::sync::OnceLock;

use crate::array::{normalize_axis, NdArray};
use crate::codec::{pack_real_spectrum, unpack_real_spectrum};
use crate::config::FftConfig;
use crate::dtype::{ComplexArray, DynArray, Element, RealArray};
use crate::engine::{Direction, FftEngine, HostEngine};
use crate::error::FftError;
use crate::num::Complex;
use crate::plan::{describe, nd_plan_is_possible, FftKind, PlanDescriptor};

/// How an N-dimensional transform picks its plan.
pub enum PlanChoice<'a, P> {
    /// Run with this plan. The engine rejects it if it does not describe
    /// the call.
    Supplied(&'a P),
    /// Build a plan when one N-dimensional plan can serve the call,
    /// otherwise transform axis by axis.
    Auto,
    /// Transform axis by axis.
    Unplanned,
}

impl<P> Default for PlanChoice<'_, P> {
    fn default() -> Self {
        PlanChoice::Auto
    }
}

impl<P> Clone for PlanChoice<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PlanChoice<'_, P> {}

impl<P> core::fmt::Debug for PlanChoice<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PlanChoice::Supplied(_) => f.write_str("Supplied"),
            PlanChoice::Auto => f.write_str("Auto"),
            PlanChoice::Unplanned => f.write_str("Unplanned"),
        }
    }
}

/// SciPy-style transform front-end over an engine.
pub struct FftPack<E: FftEngine = HostEngine> {
    engine: E,
    config: FftConfig,
}

impl Default for FftPack<HostEngine> {
    fn default() -> Self {
        Self::host(*FftConfig::global())
    }
}

impl FftPack<HostEngine> {
    /// Front-end over a fresh [`HostEngine`] sharing `config`.
    pub fn host(config: FftConfig) -> Self {
        Self::new(HostEngine::new(config), config)
    }
}

impl<E: FftEngine> FftPack<E> {
    pub fn new(engine: E, config: FftConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    /// Hand a descriptor from [`crate::get_fft_plan`] to the engine for a
    /// reusable plan.
    pub fn plan(&self, descriptor: &PlanDescriptor) -> Result<E::Plan, FftError> {
        self.engine.plan(descriptor)
    }

    /// 1-D discrete Fourier transform along `axis`, cropped or zero-padded
    /// to `n` points.
    pub fn fft(
        &self,
        x: &DynArray,
        n: Option<usize>,
        axis: isize,
        overwrite_x: bool,
    ) -> Result<DynArray, FftError> {
        self.fft_1d(x, n, axis, overwrite_x, Direction::Forward)
    }

    /// Inverse of [`Self::fft`], normalized by `1/n`.
    pub fn ifft(
        &self,
        x: &DynArray,
        n: Option<usize>,
        axis: isize,
        overwrite_x: bool,
    ) -> Result<DynArray, FftError> {
        self.fft_1d(x, n, axis, overwrite_x, Direction::Inverse)
    }

    /// 2-D transform, over the last two axes unless `axes` says otherwise.
    pub fn fft2(
        &self,
        x: &DynArray,
        shape: Option<&[usize]>,
        axes: Option<&[isize]>,
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
    ) -> Result<DynArray, FftError> {
        let axes = axes.unwrap_or(&[-2, -1]);
        self.fft_nd(x, shape, Some(axes), overwrite_x, plan, Direction::Forward)
    }

    pub fn ifft2(
        &self,
        x: &DynArray,
        shape: Option<&[usize]>,
        axes: Option<&[isize]>,
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
    ) -> Result<DynArray, FftError> {
        let axes = axes.unwrap_or(&[-2, -1]);
        self.fft_nd(x, shape, Some(axes), overwrite_x, plan, Direction::Inverse)
    }

    /// N-D transform. With `shape` given and `axes` omitted the last
    /// `shape.len()` axes are transformed; with both omitted, every axis.
    pub fn fftn(
        &self,
        x: &DynArray,
        shape: Option<&[usize]>,
        axes: Option<&[isize]>,
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
    ) -> Result<DynArray, FftError> {
        self.fft_nd(x, shape, axes, overwrite_x, plan, Direction::Forward)
    }

    pub fn ifftn(
        &self,
        x: &DynArray,
        shape: Option<&[usize]>,
        axes: Option<&[isize]>,
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
    ) -> Result<DynArray, FftError> {
        self.fft_nd(x, shape, axes, overwrite_x, plan, Direction::Inverse)
    }

    /// Real forward transform in the packed layout of
    /// [`crate::codec`]: `n` reals along `axis`.
    pub fn rfft(
        &self,
        x: &DynArray,
        n: Option<usize>,
        axis: isize,
        overwrite_x: bool,
    ) -> Result<DynArray, FftError> {
        let real = x.to_real("rfft")?;
        let axis = normalize_axis(axis, x.ndim())?;
        let n = resolve_length(n, x.shape()[axis])?;
        match real {
            RealArray::Single(a) => self.rfft_typed(&*a, n, axis, overwrite_x),
            RealArray::Double(a) => self.rfft_typed(&*a, n, axis, overwrite_x),
        }
    }

    /// Inverse of [`Self::rfft`]: reads a packed spectrum along `axis` and
    /// returns a real signal of length `n`.
    pub fn irfft(
        &self,
        x: &DynArray,
        n: Option<usize>,
        axis: isize,
        overwrite_x: bool,
    ) -> Result<DynArray, FftError> {
        let real = x.to_real("irfft")?;
        let axis = normalize_axis(axis, x.ndim())?;
        let n = resolve_length(n, x.shape()[axis])?;
        match real {
            RealArray::Single(a) => self.irfft_typed(&*a, n, axis, overwrite_x),
            RealArray::Double(a) => self.irfft_typed(&*a, n, axis, overwrite_x),
        }
    }

    fn rfft_typed<T: Element>(
        &self,
        x: &NdArray<T>,
        n: usize,
        axis: usize,
        overwrite_x: bool,
    ) -> Result<DynArray, FftError> {
        let half = self.engine.r2c(x, n, axis, overwrite_x)?;
        Ok(T::real_dyn(pack_real_spectrum(&half, n, axis)?))
    }

    fn irfft_typed<T: Element>(
        &self,
        x: &NdArray<T>,
        n: usize,
        axis: usize,
        overwrite_x: bool,
    ) -> Result<DynArray, FftError> {
        let half = unpack_real_spectrum(x, n, axis)?;
        Ok(T::real_dyn(self.engine.c2r(&half, n, axis, overwrite_x)?))
    }

    fn fft_1d(
        &self,
        x: &DynArray,
        n: Option<usize>,
        axis: isize,
        overwrite_x: bool,
        direction: Direction,
    ) -> Result<DynArray, FftError> {
        let axis = normalize_axis(axis, x.ndim())?;
        let n = resolve_length(n, x.shape()[axis])?;
        self.c2c(x, &[n], &[axis], overwrite_x, PlanChoice::Unplanned, direction)
    }

    fn fft_nd(
        &self,
        x: &DynArray,
        shape: Option<&[usize]>,
        axes: Option<&[isize]>,
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
        direction: Direction,
    ) -> Result<DynArray, FftError> {
        let (lengths, axes) = cook_nd_args(x.shape(), shape, axes)?;
        self.c2c(x, &lengths, &axes, overwrite_x, plan, direction)
    }

    fn c2c(
        &self,
        x: &DynArray,
        lengths: &[usize],
        axes: &[usize],
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
        direction: Direction,
    ) -> Result<DynArray, FftError> {
        match x.to_complex() {
            ComplexArray::Single(a) => {
                self.c2c_typed(&a, lengths, axes, overwrite_x, plan, direction)
            }
            ComplexArray::Double(a) => {
                self.c2c_typed(&a, lengths, axes, overwrite_x, plan, direction)
            }
        }
    }

    fn c2c_typed<T: Element>(
        &self,
        input: &NdArray<Complex<T>>,
        lengths: &[usize],
        axes: &[usize],
        overwrite_x: bool,
        plan: PlanChoice<'_, E::Plan>,
        direction: Direction,
    ) -> Result<DynArray, FftError> {
        let auto;
        let plan = match plan {
            PlanChoice::Supplied(plan) => Some(plan),
            PlanChoice::Unplanned => None,
            PlanChoice::Auto => {
                auto = self.auto_plan::<T>(input, lengths, axes)?;
                auto.as_ref()
            }
        };
        let out = self
            .engine
            .c2c(plan, input, lengths, axes, direction, overwrite_x)?;
        Ok(T::complex_dyn(out))
    }

    fn auto_plan<T: Element>(
        &self,
        input: &NdArray<Complex<T>>,
        lengths: &[usize],
        axes: &[usize],
    ) -> Result<Option<E::Plan>, FftError> {
        if !self.config.enable_nd_planning || axes.len() < 2 {
            log::debug!("running axes {axes:?} unplanned");
            return Ok(None);
        }
        let mut sorted = axes.to_vec();
        sorted.sort_unstable();
        let order = match input.layout().order() {
            Some(order) if nd_plan_is_possible(&sorted, input.ndim()) => order,
            _ => {
                log::debug!("axes {axes:?} cannot share one plan, running unplanned");
                return Ok(None);
            }
        };
        let signed: Vec<isize> = axes.iter().map(|&axis| axis as isize).collect();
        let descriptor = describe(
            input.shape(),
            Some(lengths),
            Some(signed.as_slice()),
            order,
            FftKind::complex_for::<T>(),
        )?;
        log::debug!("running axes {axes:?} with an N-d plan");
        self.engine.plan(&descriptor).map(Some)
    }
}

fn resolve_length(n: Option<usize>, current: usize) -> Result<usize, FftError> {
    match n.unwrap_or(current) {
        0 => Err(FftError::InvalidLength { length: 0 }),
        n => Ok(n),
    }
}

/// Pair transform lengths with normalized axes.
fn cook_nd_args(
    x_shape: &[usize],
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
) -> Result<(Vec<usize>, Vec<usize>), FftError> {
    let ndim = x_shape.len();
    let axes: Vec<usize> = match (shape, axes) {
        (_, Some(axes)) => axes
            .iter()
            .map(|&axis| normalize_axis(axis, ndim))
            .collect::<Result<_, _>>()?,
        (Some(shape), None) => {
            if shape.len() > ndim {
                return Err(FftError::TooManyAxes {
                    axes: shape.len(),
                    ndim,
                });
            }
            (ndim - shape.len()..ndim).collect()
        }
        (None, None) => (0..ndim).collect(),
    };
    if axes.len() > ndim {
        return Err(FftError::TooManyAxes {
            axes: axes.len(),
            ndim,
        });
    }
    let lengths = match shape {
        Some(shape) if shape.len() != axes.len() => {
            return Err(FftError::ShapeAxesMismatch {
                shape: shape.len(),
                axes: axes.len(),
            })
        }
        Some(shape) => shape.to_vec(),
        None => axes.iter().map(|&axis| x_shape[axis]).collect(),
    };
    if let Some(&length) = lengths.iter().find(|&&len| len == 0) {
        return Err(FftError::InvalidLength { length });
    }
    Ok((lengths, axes))
}

fn global_pack() -> &'static FftPack<HostEngine> {
    static PACK: OnceLock<FftPack<HostEngine>> = OnceLock::new();
    PACK.get_or_init(FftPack::default)
}

/// Plan type of the process-wide front-end.
pub type HostPlanRef = <HostEngine as FftEngine>::Plan;

/// Build a reusable plan on the process-wide engine.
pub fn plan(descriptor: &PlanDescriptor) -> Result<HostPlanRef, FftError> {
    global_pack().plan(descriptor)
}

/// See [`FftPack::fft`].
pub fn fft(
    x: &DynArray,
    n: Option<usize>,
    axis: isize,
    overwrite_x: bool,
) -> Result<DynArray, FftError> {
    global_pack().fft(x, n, axis, overwrite_x)
}

/// See [`FftPack::ifft`].
pub fn ifft(
    x: &DynArray,
    n: Option<usize>,
    axis: isize,
    overwrite_x: bool,
) -> Result<DynArray, FftError> {
    global_pack().ifft(x, n, axis, overwrite_x)
}

/// See [`FftPack::fft2`].
pub fn fft2(
    x: &DynArray,
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
    overwrite_x: bool,
    plan: PlanChoice<'_, HostPlanRef>,
) -> Result<DynArray, FftError> {
    global_pack().fft2(x, shape, axes, overwrite_x, plan)
}

/// See [`FftPack::ifft2`].
pub fn ifft2(
    x: &DynArray,
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
    overwrite_x: bool,
    plan: PlanChoice<'_, HostPlanRef>,
) -> Result<DynArray, FftError> {
    global_pack().ifft2(x, shape, axes, overwrite_x, plan)
}

/// See [`FftPack::fftn`].
pub fn fftn(
    x: &DynArray,
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
    overwrite_x: bool,
    plan: PlanChoice<'_, HostPlanRef>,
) -> Result<DynArray, FftError> {
    global_pack().fftn(x, shape, axes, overwrite_x, plan)
}

/// See [`FftPack::ifftn`].
pub fn ifftn(
    x: &DynArray,
    shape: Option<&[usize]>,
    axes: Option<&[isize]>,
    overwrite_x: bool,
    plan: PlanChoice<'_, HostPlanRef>,
) -> Result<DynArray, FftError> {
    global_pack().ifftn(x, shape, axes, overwrite_x, plan)
}

/// See [`FftPack::rfft`].
pub fn rfft(
    x: &DynArray,
    n: Option<usize>,
    axis: isize,
    overwrite_x: bool,
) -> Result<DynArray, FftError> {
    global_pack().rfft(x, n, axis, overwrite_x)
}

/// See [`FftPack::irfft`].
pub fn irfft(
    x: &DynArray,
    n: Option<usize>,
    axis: isize,
    overwrite_x: bool,
) -> Result<DynArray, FftError> {
    global_pack().irfft(x, n, axis, overwrite_x)
}
