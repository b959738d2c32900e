use scifftpack::{
    get_fft_plan, Complex32, Complex64, DType, DynArray, FftError, FftKind, NdArray, Order,
    ValueType,
};

fn complex128(shape: &[usize]) -> DynArray {
    let count: usize = shape.iter().product();
    NdArray::from_shape_vec(shape, vec![Complex64::zero(); count])
        .unwrap()
        .into()
}

#[test]
fn single_axis_is_resized_in_place() {
    let a = complex128(&[3, 5, 7]);
    let plan = get_fft_plan(&a, Some(&[8][..]), Some(&[1][..]), ValueType::C2C).unwrap();
    assert_eq!(plan.full_output_shape, vec![3, 8, 7]);
    assert_eq!(plan.axes, vec![1]);
    assert_eq!(plan.order, Order::RowMajor);
    assert_eq!(plan.kind, FftKind::Z2Z);
}

#[test]
fn axes_must_touch_an_end_of_the_array() {
    let a = complex128(&[2, 3, 4, 5]);
    assert!(get_fft_plan(&a, None, Some(&[0, 1][..]), ValueType::C2C).is_ok());
    assert!(get_fft_plan(&a, None, Some(&[2, 3][..]), ValueType::C2C).is_ok());
    assert!(get_fft_plan(&a, None, Some(&[-1, -2][..]), ValueType::C2C).is_ok());
    assert_eq!(
        get_fft_plan(&a, None, Some(&[1, 2][..]), ValueType::C2C),
        Err(FftError::UnsupportedAxisLayout {
            axes: vec![1, 2],
            ndim: 4
        })
    );
    assert!(matches!(
        get_fft_plan(&a, None, Some(&[0, 2][..]), ValueType::C2C),
        Err(FftError::UnsupportedAxisLayout { .. })
    ));
    assert!(matches!(
        get_fft_plan(&a, None, Some(&[3, 3][..]), ValueType::C2C),
        Err(FftError::UnsupportedAxisLayout { .. })
    ));
}

#[test]
fn more_than_three_axes_cannot_share_a_plan() {
    let a = complex128(&[2, 2, 2, 2]);
    assert!(matches!(
        get_fft_plan(&a, None, None, ValueType::C2C),
        Err(FftError::UnsupportedAxisLayout { .. })
    ));
    let b = complex128(&[2, 2, 2]);
    let plan = get_fft_plan(&b, None, None, ValueType::C2C).unwrap();
    assert_eq!(plan.axes, vec![0, 1, 2]);
}

#[test]
fn shape_and_axes_lengths_must_agree() {
    let a = complex128(&[4, 4, 4]);
    assert_eq!(
        get_fft_plan(&a, Some(&[4, 4][..]), Some(&[0][..]), ValueType::C2C),
        Err(FftError::ShapeAxesMismatch { shape: 2, axes: 1 })
    );
    assert_eq!(
        get_fft_plan(&a, Some(&[4, 4][..]), None, ValueType::C2C),
        Err(FftError::ShapeAxesMismatch { shape: 2, axes: 3 })
    );
    let b = complex128(&[4, 4]);
    assert_eq!(
        get_fft_plan(&b, None, Some(&[0, 1, 1][..]), ValueType::C2C),
        Err(FftError::TooManyAxes { axes: 3, ndim: 2 })
    );
}

#[test]
fn shape_without_axes_overwrites_every_axis() {
    let a = complex128(&[4, 6]);
    let plan = get_fft_plan(&a, Some(&[5, 3][..]), None, ValueType::C2C).unwrap();
    assert_eq!(plan.full_output_shape, vec![5, 3]);
    assert_eq!(plan.axes, vec![0, 1]);
}

#[test]
fn lengths_and_axes_are_range_checked() {
    let a = complex128(&[4, 4]);
    assert_eq!(
        get_fft_plan(&a, Some(&[0][..]), Some(&[0][..]), ValueType::C2C),
        Err(FftError::InvalidLength { length: 0 })
    );
    assert_eq!(
        get_fft_plan(&a, None, Some(&[2][..]), ValueType::C2C),
        Err(FftError::AxisOutOfRange { axis: 2, ndim: 2 })
    );
    assert_eq!(
        get_fft_plan(&a, None, Some(&[-3][..]), ValueType::C2C),
        Err(FftError::AxisOutOfRange { axis: -3, ndim: 2 })
    );
}

#[test]
fn only_complex_to_complex_kinds_are_planned() {
    let single: DynArray = NdArray::from_shape_vec(&[4], vec![Complex32::zero(); 4])
        .unwrap()
        .into();
    assert_eq!(
        get_fft_plan(&single, None, None, ValueType::C2C).map(|p| p.kind),
        Ok(FftKind::C2C)
    );
    assert_eq!(
        get_fft_plan(&single, None, None, ValueType::C2R),
        Err(FftError::UnsupportedTransformKind { kind: FftKind::C2R })
    );

    let real: DynArray = NdArray::from_shape_vec(&[4], vec![0.0f64; 4]).unwrap().into();
    assert_eq!(
        get_fft_plan(&real, None, None, ValueType::R2C),
        Err(FftError::UnsupportedTransformKind { kind: FftKind::D2Z })
    );
    assert!(matches!(
        get_fft_plan(&real, None, None, ValueType::C2C),
        Err(FftError::UnsupportedDtype {
            dtype: DType::Float64,
            ..
        })
    ));
}

#[test]
fn layout_is_taken_from_the_array() {
    let data: Vec<Complex64> = (0..12).map(|i| Complex64::new(i as f64, 0.0)).collect();
    let f: DynArray = NdArray::from_shape_vec_with_order(&[3, 4], data.clone(), Order::ColumnMajor)
        .unwrap()
        .into();
    let plan = get_fft_plan(&f, None, None, ValueType::C2C).unwrap();
    assert_eq!(plan.order, Order::ColumnMajor);
    let geometry = plan.geometry();
    assert_eq!(geometry.dims(), &[4, 3]);

    let strided: DynArray = NdArray::from_strided(&[3, 2], &[4, 2], data).unwrap().into();
    assert_eq!(
        get_fft_plan(&strided, None, None, ValueType::C2C),
        Err(FftError::NonContiguousInput)
    );
}
