//! Strided N-dimensional arrays and the axis arithmetic shared by the
//! plan builder, the real-spectrum codec and the host engine.
//!
//! An [`NdArray`] owns a flat storage buffer and addresses it through
//! per-axis element strides, so row-major, column-major and arbitrary
//! strided views all go through the same offset computation.

use crate::error::FftError;

/// Memory order of a contiguous buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// C order: the last axis varies fastest.
    #[default]
    RowMajor,
    /// Fortran order: the first axis varies fastest.
    ColumnMajor,
}

/// Layout of an array as detected from its strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLayout {
    RowMajor,
    ColumnMajor,
    /// Neither C- nor F-contiguous.
    Strided,
}

impl MemoryLayout {
    /// The contiguous order, if any.
    pub fn order(self) -> Option<Order> {
        match self {
            MemoryLayout::RowMajor => Some(Order::RowMajor),
            MemoryLayout::ColumnMajor => Some(Order::ColumnMajor),
            MemoryLayout::Strided => None,
        }
    }
}

/// Product of `shape`, or `None` on overflow.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Element strides of a contiguous buffer with the given shape and order.
pub fn contiguous_strides(shape: &[usize], order: Order) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut acc = 1usize;
    match order {
        Order::RowMajor => {
            for (stride, &dim) in strides.iter_mut().zip(shape).rev() {
                *stride = acc;
                acc = acc.saturating_mul(dim.max(1));
            }
        }
        Order::ColumnMajor => {
            for (stride, &dim) in strides.iter_mut().zip(shape) {
                *stride = acc;
                acc = acc.saturating_mul(dim.max(1));
            }
        }
    }
    strides
}

/// Map `axis` from `[-ndim, ndim)` into `[0, ndim)`.
pub fn normalize_axis(axis: isize, ndim: usize) -> Result<usize, FftError> {
    let signed_ndim = ndim as isize;
    if axis < -signed_ndim || axis >= signed_ndim {
        return Err(FftError::AxisOutOfRange { axis, ndim });
    }
    if axis < 0 {
        Ok((axis + signed_ndim) as usize)
    } else {
        Ok(axis as usize)
    }
}

/// Step `index` to the next position of `shape` in the given order.
/// Returns `false` once every position has been visited.
fn advance(index: &mut [usize], shape: &[usize], order: Order) -> bool {
    let mut bump = |k: usize| {
        index[k] += 1;
        if index[k] < shape[k] {
            true
        } else {
            index[k] = 0;
            false
        }
    };
    match order {
        Order::RowMajor => (0..shape.len()).rev().any(&mut bump),
        Order::ColumnMajor => (0..shape.len()).any(&mut bump),
    }
}

/// Visit every multi-index of `shape` in the given order.
pub(crate) fn for_each_index(shape: &[usize], order: Order, mut f: impl FnMut(&[usize])) {
    if shape.contains(&0) {
        return;
    }
    let mut index = vec![0usize; shape.len()];
    loop {
        f(&index);
        if !advance(&mut index, shape, order) {
            break;
        }
    }
}

/// N-dimensional array over a flat, strided buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T> Default for NdArray<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            shape: vec![0],
            strides: vec![1],
        }
    }
}

impl<T: Copy> NdArray<T> {
    /// Wrap `data` laid out in C order.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self, FftError> {
        Self::from_shape_vec_with_order(shape, data, Order::RowMajor)
    }

    /// Wrap `data` laid out in the given contiguous order.
    pub fn from_shape_vec_with_order(
        shape: &[usize],
        data: Vec<T>,
        order: Order,
    ) -> Result<Self, FftError> {
        let count = element_count(shape).ok_or(FftError::InvalidArray {
            detail: "shape product overflows usize",
        })?;
        if data.len() != count {
            return Err(FftError::InvalidArray {
                detail: "data length does not match shape",
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: contiguous_strides(shape, order),
        })
    }

    /// Wrap `data` with explicit element strides, e.g. a transposed or
    /// sliced view.
    /// Strides may alias, e.g. a stride of 0 repeats one element along an
    /// axis.
    pub fn from_strided(
        shape: &[usize],
        strides: &[usize],
        data: Vec<T>,
    ) -> Result<Self, FftError> {
        if shape.len() != strides.len() {
            return Err(FftError::InvalidArray {
                detail: "shape and strides differ in length",
            });
        }
        let count = element_count(shape).ok_or(FftError::InvalidArray {
            detail: "shape product overflows usize",
        })?;
        if count > 0 {
            let mut last = 0usize;
            for (&dim, &stride) in shape.iter().zip(strides) {
                last = (dim - 1)
                    .checked_mul(stride)
                    .and_then(|span| last.checked_add(span))
                    .ok_or(FftError::InvalidArray {
                        detail: "stride offsets overflow usize",
                    })?;
            }
            if last >= data.len() {
                return Err(FftError::InvalidArray {
                    detail: "strides reach past the end of the data",
                });
            }
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: strides.to_vec(),
        })
    }

    /// Contiguous array with every element set to `value`.
    pub fn filled(shape: &[usize], value: T, order: Order) -> Result<Self, FftError> {
        let count = element_count(shape).ok_or(FftError::InvalidArray {
            detail: "shape product overflows usize",
        })?;
        Self::from_shape_vec_with_order(shape, vec![value; count], order)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Layout detected from the strides. Arrays that are both C- and
    /// F-contiguous report [`MemoryLayout::RowMajor`].
    pub fn layout(&self) -> MemoryLayout {
        if self.is_contiguous(Order::RowMajor) {
            MemoryLayout::RowMajor
        } else if self.is_contiguous(Order::ColumnMajor) {
            MemoryLayout::ColumnMajor
        } else {
            MemoryLayout::Strided
        }
    }

    fn is_contiguous(&self, order: Order) -> bool {
        if self.is_empty() {
            return true;
        }
        let expected = contiguous_strides(&self.shape, order);
        self.shape
            .iter()
            .zip(&self.strides)
            .zip(&expected)
            .all(|((&dim, &stride), &want)| dim == 1 || stride == want)
    }

    /// Storage offset of a multi-index. The index is not bounds checked.
    pub fn offset(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &stride)| i * stride)
            .sum()
    }

    pub fn get(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.ndim() || index.iter().zip(&self.shape).any(|(&i, &dim)| i >= dim) {
            return None;
        }
        self.data.get(self.offset(index)).copied()
    }

    /// Elements in logical C order, independent of the storage layout.
    pub fn to_vec(&self) -> Vec<T> {
        self.gather(Order::RowMajor)
    }

    fn gather(&self, order: Order) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for_each_index(&self.shape, order, |index| out.push(self.data[self.offset(index)]));
        out
    }

    /// Contiguous copy in the requested order.
    pub fn to_order(&self, order: Order) -> Self {
        Self {
            data: self.gather(order),
            shape: self.shape.clone(),
            strides: contiguous_strides(&self.shape, order),
        }
    }

    /// Element-wise conversion into a new C-ordered array.
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> NdArray<U> {
        NdArray {
            data: self.to_vec().into_iter().map(f).collect(),
            shape: self.shape.clone(),
            strides: contiguous_strides(&self.shape, Order::RowMajor),
        }
    }

    /// Truncate or pad with `fill` along `axis` to length `n`. The result is
    /// C-ordered.
    pub fn resized_along(&self, axis: usize, n: usize, fill: T) -> Result<Self, FftError> {
        let mut shape = self.shape.clone();
        shape[axis] = n;
        let mut out = Self::filled(&shape, fill, Order::RowMajor)?;
        let keep = n.min(self.shape[axis]);
        let src_stride = self.strides[axis];
        let dst_stride = out.strides[axis];
        for (src, dst) in self.lane_starts(axis).into_iter().zip(out.lane_starts(axis)) {
            for k in 0..keep {
                out.data[dst + k * dst_stride] = self.data[src + k * src_stride];
            }
        }
        Ok(out)
    }

    /// Storage offset of the first element of every lane along `axis`.
    ///
    /// Lanes are listed with the remaining axes in C order, so two arrays
    /// that agree on every axis except `axis` produce paired lists.
    pub(crate) fn lane_starts(&self, axis: usize) -> Vec<usize> {
        let mut outer = self.shape.clone();
        outer[axis] = 1;
        let mut starts = Vec::new();
        for_each_index(&outer, Order::RowMajor, |index| starts.push(self.offset(index)));
        starts
    }

    pub(crate) fn storage(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_detection_follows_strides() {
        let c = NdArray::from_shape_vec(&[2, 3], (0..6).collect::<Vec<i32>>()).unwrap();
        assert_eq!(c.layout(), MemoryLayout::RowMajor);

        let data = (0..6).collect::<Vec<i32>>();
        let f = NdArray::from_shape_vec_with_order(&[2, 3], data, Order::ColumnMajor).unwrap();
        assert_eq!(f.layout(), MemoryLayout::ColumnMajor);

        // every other column of a 2x6 C array
        let view = NdArray::from_strided(&[2, 3], &[6, 2], (0..12).collect::<Vec<i32>>()).unwrap();
        assert_eq!(view.layout(), MemoryLayout::Strided);

        let vector = NdArray::from_shape_vec(&[4], vec![0.0f32; 4]).unwrap();
        assert_eq!(vector.layout(), MemoryLayout::RowMajor);
    }

    #[test]
    fn column_major_reads_in_logical_order() {
        let data = vec![0, 3, 1, 4, 2, 5];
        let f = NdArray::from_shape_vec_with_order(&[2, 3], data, Order::ColumnMajor).unwrap();
        assert_eq!(f.to_vec(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(f.get(&[1, 0]), Some(3));
        assert_eq!(f.get(&[2, 0]), None);
        assert_eq!(f.to_order(Order::RowMajor).storage(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn strided_construction_is_bounds_checked() {
        let err = NdArray::from_strided(&[2, 3], &[6, 3], vec![0u8; 12]).unwrap_err();
        assert!(matches!(err, FftError::InvalidArray { .. }));
        let err = NdArray::from_shape_vec(&[2, 3], vec![0u8; 5]).unwrap_err();
        assert!(matches!(err, FftError::InvalidArray { .. }));
    }

    #[test]
    fn resize_crops_and_pads_every_lane() {
        let a = NdArray::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
        let cropped = a.resized_along(1, 2, 0).unwrap();
        assert_eq!(cropped.shape(), &[2, 2]);
        assert_eq!(cropped.to_vec(), vec![1, 2, 4, 5]);

        let padded = a.resized_along(0, 3, 0).unwrap();
        assert_eq!(padded.to_vec(), vec![1, 2, 3, 4, 5, 6, 0, 0, 0]);
    }

    #[test]
    fn lanes_pair_up_across_layouts() {
        let c = NdArray::from_shape_vec(&[2, 3], vec![0; 6]).unwrap();
        let f =
            NdArray::from_shape_vec_with_order(&[2, 3], vec![0; 6], Order::ColumnMajor).unwrap();
        assert_eq!(c.lane_starts(1), vec![0, 3]);
        assert_eq!(f.lane_starts(1), vec![0, 1]);
        assert_eq!(c.lane_starts(0), vec![0, 1, 2]);
        assert_eq!(f.lane_starts(0), vec![0, 2, 4]);
    }

    #[test]
    fn negative_axes_normalize() {
        assert_eq!(normalize_axis(-1, 3), Ok(2));
        assert_eq!(normalize_axis(0, 3), Ok(0));
        assert_eq!(
            normalize_axis(3, 3),
            Err(FftError::AxisOutOfRange { axis: 3, ndim: 3 })
        );
        assert_eq!(
            normalize_axis(-4, 3),
            Err(FftError::AxisOutOfRange { axis: -4, ndim: 3 })
        );
    }
}
