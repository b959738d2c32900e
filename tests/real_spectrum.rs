use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scifftpack::{irfft, rfft, Complex64, DType, DynArray, FftError, NdArray, Order};

fn real(shape: &[usize], data: Vec<f64>) -> DynArray {
    NdArray::from_shape_vec(shape, data).unwrap().into()
}

fn values(a: &DynArray) -> Vec<f64> {
    a.as_float64().expect("float64 result").to_vec()
}

fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, b)) in actual.iter().zip(expected).enumerate() {
        assert!((a - b).abs() < tol, "index {i}: {a} vs {b}");
    }
}

#[test]
fn even_length_packs_without_nyquist_imaginary() {
    let out = rfft(&real(&[4], vec![1.0, 2.0, 3.0, 4.0]), None, -1, false).unwrap();
    assert_eq!(out.shape(), &[4]);
    assert_close(&values(&out), &[10.0, -2.0, 2.0, -2.0], 1e-12);
}

#[test]
fn odd_length_keeps_trailing_imaginary_slot() {
    let out = rfft(&real(&[5], vec![1.0, 2.0, 3.0, 4.0, 5.0]), None, -1, false).unwrap();
    assert_close(
        &values(&out),
        &[15.0, -2.5, 3.440_954_801_177_933, -2.5, 0.812_299_240_582_266],
        1e-9,
    );
}

#[test]
fn irfft_zero_fills_bins_beyond_the_input() {
    let short = real(&[4], vec![1.0, 2.0, 3.0, 4.0]);
    let padded = real(&[8], vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
    let a = irfft(&short, Some(8), 0, false).unwrap();
    let b = irfft(&padded, None, 0, false).unwrap();
    assert_eq!(a.shape(), &[8]);
    assert_close(&values(&a), &values(&b), 1e-12);
}

#[test]
fn rfft_crops_and_pads_the_signal() {
    let x = real(&[3], vec![1.0, -1.0, 2.0]);
    let padded = rfft(&x, Some(6), 0, false).unwrap();
    let explicit = rfft(&real(&[6], vec![1.0, -1.0, 2.0, 0.0, 0.0, 0.0]), None, 0, false).unwrap();
    assert_close(&values(&padded), &values(&explicit), 1e-12);

    let cropped = rfft(&x, Some(2), 0, false).unwrap();
    assert_close(&values(&cropped), &[0.0, 2.0], 1e-12);
}

#[test]
fn transforms_run_along_any_axis_and_layout() {
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<f64> = (0..24).map(|_| rng.gen_range(-5.0..5.0)).collect();
    let c = NdArray::from_shape_vec(&[4, 6], data.clone()).unwrap();
    let f = c.to_order(Order::ColumnMajor);

    for axis in [0isize, 1, -1] {
        let from_c = rfft(&c.clone().into(), None, axis, false).unwrap();
        let from_f = rfft(&f.clone().into(), None, axis, false).unwrap();
        assert_close(&values(&from_c), &values(&from_f), 1e-12);
        let back = irfft(&from_f, None, axis, false).unwrap();
        assert_close(&values(&back), &data, 1e-9);
    }

    // column 2 of a C-ordered matrix equals the 1-D transform of that column
    let column: Vec<f64> = (0..4).map(|r| data[r * 6 + 2]).collect();
    let along_rows = values(&rfft(&c.into(), None, 0, false).unwrap());
    let single = values(&rfft(&real(&[4], column), None, 0, false).unwrap());
    let picked: Vec<f64> = (0..4).map(|r| along_rows[r * 6 + 2]).collect();
    assert_close(&picked, &single, 1e-12);
}

#[test]
fn dtypes_follow_numpy_promotion() {
    let single: DynArray = NdArray::from_shape_vec(&[4], vec![1.0f32, 2.0, 3.0, 4.0])
        .unwrap()
        .into();
    assert_eq!(rfft(&single, None, 0, false).unwrap().dtype(), DType::Float32);

    let ints: DynArray = NdArray::from_shape_vec(&[4], vec![1i64, 2, 3, 4]).unwrap().into();
    let out = rfft(&ints, None, 0, false).unwrap();
    assert_eq!(out.dtype(), DType::Float64);
    assert_close(&values(&out), &[10.0, -2.0, 2.0, -2.0], 1e-12);

    let flags: DynArray = NdArray::from_shape_vec(&[2], vec![true, false]).unwrap().into();
    assert_eq!(irfft(&flags, None, 0, false).unwrap().dtype(), DType::Float64);

    let complex: DynArray = NdArray::from_shape_vec(&[2], vec![Complex64::zero(); 2])
        .unwrap()
        .into();
    assert!(matches!(
        rfft(&complex, None, 0, false),
        Err(FftError::UnsupportedDtype {
            dtype: DType::Complex128,
            ..
        })
    ));
}

#[test]
fn invalid_arguments_are_rejected_before_execution() {
    let x = real(&[2, 3], vec![0.0; 6]);
    assert_eq!(
        rfft(&x, None, 2, false),
        Err(FftError::AxisOutOfRange { axis: 2, ndim: 2 })
    );
    assert_eq!(
        irfft(&x, None, -3, false),
        Err(FftError::AxisOutOfRange { axis: -3, ndim: 2 })
    );
    assert_eq!(
        rfft(&x, Some(0), 0, false),
        Err(FftError::InvalidLength { length: 0 })
    );
    let empty = real(&[0], vec![]);
    assert_eq!(
        irfft(&empty, None, 0, false),
        Err(FftError::InvalidLength { length: 0 })
    );
}

proptest! {
    #[test]
    fn prop_rfft_irfft_roundtrip(
        ref signal in proptest::collection::vec(-1000.0f64..1000.0, 1..96)
    ) {
        let n = signal.len();
        let x = real(&[n], signal.clone());
        let packed = rfft(&x, Some(n), 0, false).unwrap();
        prop_assert_eq!(packed.shape(), &[n][..]);
        let back = values(&irfft(&packed, Some(n), 0, false).unwrap());
        for (a, b) in back.iter().zip(signal) {
            prop_assert!((a - b).abs() < 1e-7 * (1.0 + b.abs()), "{} vs {}", a, b);
        }
    }
}
