//! Packed real-spectrum layout used by `scipy.fftpack.rfft`.
//!
//! A real signal of length `n` has the Hermitian spectrum `f` with
//! `n/2 + 1` independent bins. The packed form stores it in `n` reals:
//!
//! ```text
//! [Re f0, Re f1, Im f1, Re f2, Im f2, ..., Re f(n/2)]          n even
//! [Re f0, Re f1, Im f1, Re f2, Im f2, ..., Re f(n/2), Im f(n/2)] n odd
//! ```
//!
//! `Im f0` is always zero. For even `n` the imaginary part of the Nyquist
//! bin is dropped, which is exact for real input.

use crate::array::{NdArray, Order};
use crate::error::FftError;
use crate::num::{Complex, Float};

/// Pack a half spectrum (`n/2 + 1` bins along `axis`) into `n` reals.
pub fn pack_real_spectrum<T: Float>(
    half: &NdArray<Complex<T>>,
    n: usize,
    axis: usize,
) -> Result<NdArray<T>, FftError> {
    let bins = n / 2 + 1;
    if half.shape().get(axis) != Some(&bins) {
        return Err(FftError::EngineExecution {
            detail: format!(
                "expected {bins} bins along axis {axis}, engine returned shape {:?}",
                half.shape()
            ),
        });
    }
    let mut shape = half.shape().to_vec();
    shape[axis] = n;
    let mut packed = NdArray::filled(&shape, T::zero(), Order::RowMajor)?;

    let src_stride = half.strides()[axis];
    let dst_stride = packed.strides()[axis];
    let src = half.storage();
    for (s, d) in half.lane_starts(axis).into_iter().zip(packed.lane_starts(axis)) {
        let dst = packed.storage_mut();
        dst[d] = src[s].re;
        for k in 1..bins {
            let bin = src[s + k * src_stride];
            dst[d + (2 * k - 1) * dst_stride] = bin.re;
            if 2 * k < n {
                dst[d + 2 * k * dst_stride] = bin.im;
            }
        }
    }
    Ok(packed)
}

/// Unpack `n` packed reals along `axis` into `n/2 + 1` complex bins.
///
/// Only the first `min(n, len)` packed values are read; bins they do not
/// reach stay zero.
pub fn unpack_real_spectrum<T: Float>(
    packed: &NdArray<T>,
    n: usize,
    axis: usize,
) -> Result<NdArray<Complex<T>>, FftError> {
    let len = packed.shape().get(axis).copied().ok_or(FftError::AxisOutOfRange {
        axis: axis as isize,
        ndim: packed.ndim(),
    })?;
    let m = n.min(len);
    let mut shape = packed.shape().to_vec();
    shape[axis] = n / 2 + 1;
    let mut half = NdArray::filled(&shape, Complex::zero(), Order::RowMajor)?;
    if m == 0 {
        return Ok(half);
    }

    let src_stride = packed.strides()[axis];
    let dst_stride = half.strides()[axis];
    let src = packed.storage();
    for (s, d) in packed.lane_starts(axis).into_iter().zip(half.lane_starts(axis)) {
        let dst = half.storage_mut();
        dst[d].re = src[s];
        for i in 1..m {
            let bin = &mut dst[d + (i + 1) / 2 * dst_stride];
            if i % 2 == 1 {
                bin.re = src[s + i * src_stride];
            } else {
                bin.im = src[s + i * src_stride];
            }
        }
    }
    Ok(half)
}
