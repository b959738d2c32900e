//! Scalar 1-D FFT kernel backing the host engine.
//!
//! Power-of-two lengths run an iterative radix-2 transform; every other
//! length goes through Bluestein's chirp-z algorithm on a padded power-of-two
//! transform. Twiddle tables and Bluestein chirps are cached per length.

use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use crate::error::FftError;
use crate::num::{Complex, Float};

type BluesteinPair<T> = (Arc<[Complex<T>]>, Arc<[Complex<T>]>);

/// Cache of twiddle tables and Bluestein chirps keyed by length.
pub struct FftPlanner<T: Float> {
    twiddles: HashMap<usize, Arc<[Complex<T>]>>,
    bluestein: HashMap<usize, BluesteinPair<T>>,
}

impl<T: Float> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FftPlanner<T> {
    pub fn new() -> Self {
        Self {
            twiddles: HashMap::new(),
            bluestein: HashMap::new(),
        }
    }

    /// `exp(-2πik/n)` for `k < n/2`.
    pub fn get_twiddles(&mut self, n: usize) -> Arc<[Complex<T>]> {
        let table = self.twiddles.entry(n).or_insert_with(|| {
            let step = -2.0 * core::f64::consts::PI / n as f64;
            (0..n / 2)
                .map(|k| {
                    let (sin, cos) = (step * k as f64).sin_cos();
                    Complex::new(T::from_f64(cos), T::from_f64(sin))
                })
                .collect()
        });
        Arc::clone(table)
    }

    /// Chirp `exp(-iπk²/n)` of length `n` and the spectrum of its conjugate,
    /// wrapped to the padded power-of-two length.
    pub fn get_bluestein(&mut self, n: usize) -> BluesteinPair<T> {
        if let Some((chirp, kernel)) = self.bluestein.get(&n) {
            return (Arc::clone(chirp), Arc::clone(kernel));
        }
        let m = (2 * n - 1).next_power_of_two();
        let modulus = 2 * n as u128;
        let chirp: Vec<Complex<T>> = (0..n)
            .map(|i| {
                let k2 = (i as u128 * i as u128) % modulus;
                let (sin, cos) = (-core::f64::consts::PI * k2 as f64 / n as f64).sin_cos();
                Complex::new(T::from_f64(cos), T::from_f64(sin))
            })
            .collect();
        let mut kernel = vec![Complex::zero(); m];
        kernel[0] = chirp[0].conj();
        for i in 1..n {
            kernel[i] = chirp[i].conj();
            kernel[m - i] = chirp[i].conj();
        }
        let twiddles = self.get_twiddles(m);
        radix2(&mut kernel, &twiddles);
        let pair: BluesteinPair<T> = (Arc::from(chirp), Arc::from(kernel));
        self.bluestein
            .insert(n, (Arc::clone(&pair.0), Arc::clone(&pair.1)));
        pair
    }
}

/// Unnormalized complex FFT over contiguous buffers.
pub struct ScalarFft<T: Float> {
    planner: Mutex<FftPlanner<T>>,
}

impl<T: Float> Default for ScalarFft<T> {
    fn default() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }
}

impl<T: Float> ScalarFft<T> {
    fn planner(&self) -> Result<std::sync::MutexGuard<'_, FftPlanner<T>>, FftError> {
        self.planner.lock().map_err(|_| FftError::EngineExecution {
            detail: "twiddle cache lock poisoned".into(),
        })
    }

    /// Forward transform in place: `X[k] = Σ x[j]·exp(-2πijk/n)`.
    pub fn fft(&self, buf: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = buf.len();
        if n == 0 {
            return Err(FftError::EngineExecution {
                detail: "empty transform".into(),
            });
        }
        if T::from_usize(n).is_none() {
            return Err(FftError::EngineUnsupportedShape {
                detail: format!("length {n} is not exactly representable at {} bits", T::BITS),
            });
        }
        if n == 1 {
            return Ok(());
        }
        if n.is_power_of_two() {
            let twiddles = self.planner()?.get_twiddles(n);
            radix2(buf, &twiddles);
        } else {
            let ((chirp, kernel), twiddles) = {
                let mut planner = self.planner()?;
                let pair = planner.get_bluestein(n);
                let m = pair.1.len();
                (pair, planner.get_twiddles(m))
            };
            bluestein(buf, &chirp, &kernel, &twiddles);
        }
        Ok(())
    }

    /// Inverse transform in place, without the `1/n` factor.
    pub fn ifft(&self, buf: &mut [Complex<T>]) -> Result<(), FftError> {
        conjugate(buf);
        self.fft(buf)?;
        conjugate(buf);
        Ok(())
    }
}

fn conjugate<T: Float>(buf: &mut [Complex<T>]) {
    for c in buf.iter_mut() {
        *c = c.conj();
    }
}

fn radix2<T: Float>(buf: &mut [Complex<T>], twiddles: &[Complex<T>]) {
    let n = buf.len();
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            buf.swap(i, j);
        }
    }
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = n / len;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let u = buf[start + k];
                let v = buf[start + k + half] * twiddles[k * step];
                buf[start + k] = u + v;
                buf[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }
}

fn bluestein<T: Float>(
    buf: &mut [Complex<T>],
    chirp: &[Complex<T>],
    kernel: &[Complex<T>],
    twiddles: &[Complex<T>],
) {
    let m = kernel.len();
    let mut work = vec![Complex::zero(); m];
    for ((w, &x), &c) in work.iter_mut().zip(buf.iter()).zip(chirp) {
        *w = x * c;
    }
    radix2(&mut work, twiddles);
    for (w, &k) in work.iter_mut().zip(kernel) {
        *w = (*w * k).conj();
    }
    radix2(&mut work, twiddles);
    let scale = T::one() / T::from_f64(m as f64);
    for ((x, &w), &c) in buf.iter_mut().zip(&work).zip(chirp) {
        *x = w.conj().scale(scale) * c;
    }
}
