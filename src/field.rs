//! Intensity fields: the 2D arrays every stage consumes and produces.
//!
//! Samples are `f64` in `[0.0, 1.0]`, row-major, with `0.0` meaning ink
//! (foreground) and `1.0` meaning background. All fields taking part in one
//! pipeline run share a [`Shape`]; mismatches are reported by the consumer.

use crate::error::{BiasError, Result, Shape};

/// Value of a background (unmarked) sample.
pub const BACKGROUND: f64 = 1.0;
/// Value of a fully inked sample.
pub const INK: f64 = 0.0;

/// A `height × width` grid of intensities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityField {
    shape: Shape,
    data: Vec<f64>,
}

/// Validate signed dimensions, returning the unsigned shape.
pub(crate) fn checked_shape(height: i64, width: i64) -> Result<Shape> {
    if height <= 0 || width <= 0 {
        return Err(BiasError::InvalidDimension { height, width });
    }
    Ok(Shape::new(height as usize, width as usize))
}

impl IntensityField {
    /// A field of the given shape with every sample set to `value`.
    ///
    /// `value` is clamped into `[0, 1]`.
    pub fn filled(height: usize, width: usize, value: f64) -> Result<Self> {
        let shape = checked_shape(height as i64, width as i64)?;
        Ok(Self {
            shape,
            data: vec![value.clamp(INK, BACKGROUND); shape.len()],
        })
    }

    /// A blank (all background) field.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        Self::filled(height, width, BACKGROUND)
    }

    /// Wrap caller-supplied row-major samples.
    ///
    /// Fails when the length does not match the shape or any value lies
    /// outside `[0, 1]`.
    pub fn from_vec(height: usize, width: usize, data: Vec<f64>) -> Result<Self> {
        let shape = checked_shape(height as i64, width as i64)?;
        if data.len() != shape.len() {
            return Err(BiasError::DataLength {
                shape,
                expected: shape.len(),
                actual: data.len(),
            });
        }
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|(_, v)| !(INK..=BACKGROUND).contains(*v))
        {
            return Err(BiasError::ValueOutOfRange { index, value });
        }
        Ok(Self { shape, data })
    }

    /// Wrap samples already known to be valid for `shape`.
    pub(crate) fn from_parts(shape: Shape, data: Vec<f64>) -> Self {
        debug_assert_eq!(shape.len(), data.len());
        Self { shape, data }
    }

    /// Build a field by evaluating `f(row, col)`; results are clamped to `[0, 1]`.
    pub fn from_fn(
        height: usize,
        width: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self> {
        let shape = checked_shape(height as i64, width as i64)?;
        let mut data = Vec::with_capacity(shape.len());
        for i in 0..height {
            for j in 0..width {
                let v = f(i, j);
                data.push(if v.is_nan() { BACKGROUND } else { v.clamp(INK, BACKGROUND) });
            }
        }
        Ok(Self { shape, data })
    }

    /// Decode 8-bit gray levels (`v / 255`).
    pub fn from_gray8(height: usize, width: usize, pixels: &[u8]) -> Result<Self> {
        Self::from_vec(
            height,
            width,
            pixels.iter().map(|&p| p as f64 / 255.0).collect(),
        )
    }

    /// Encode as 8-bit gray levels (`round(v * 255)`).
    pub fn to_gray8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape.height
    }

    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: a field has at least one sample.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(row, col)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.shape.height && col < self.shape.width {
            Some(self.data[row * self.shape.width + col])
        } else {
            None
        }
    }

    /// Overwrite the sample at `(row, col)`; the value is clamped to `[0, 1]`.
    /// Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.shape.height && col < self.shape.width {
            self.data[row * self.shape.width + col] = value.clamp(INK, BACKGROUND);
        }
    }

    /// One row of samples.
    pub fn row(&self, row: usize) -> &[f64] {
        let w = self.shape.width;
        &self.data[row * w..(row + 1) * w]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let w = self.shape.width;
        &mut self.data[row * w..(row + 1) * w]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Number of samples satisfying `pred`.
    pub fn count_where(&self, mut pred: impl FnMut(f64) -> bool) -> usize {
        self.data.iter().filter(|&&v| pred(v)).count()
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Distinct sample values in ascending order (compared bitwise).
    pub fn distinct_values(&self) -> Vec<f64> {
        let mut values = self.data.clone();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup_by(|a, b| a.to_bits() == b.to_bits());
        values
    }

    /// Nearest-neighbour resample to `height × width`.
    pub fn resized(&self, height: usize, width: usize) -> Result<Self> {
        let (src_h, src_w) = (self.shape.height, self.shape.width);
        Self::from_fn(height, width, |i, j| {
            let si = (i * src_h / height).min(src_h - 1);
            let sj = (j * src_w / width).min(src_w - 1);
            self.data[si * src_w + sj]
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_shape_and_value() {
        let f = IntensityField::filled(3, 4, 0.3).unwrap();
        assert_eq!(f.shape(), Shape::new(3, 4));
        assert_eq!(f.len(), 12);
        assert!(f.iter().all(|v| v == 0.3));
        assert_eq!(f.row(2).len(), 4);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            IntensityField::new(0, 4),
            Err(BiasError::InvalidDimension { height: 0, width: 4 })
        ));
        assert!(matches!(
            IntensityField::new(4, 0),
            Err(BiasError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_from_vec_validates() {
        assert!(matches!(
            IntensityField::from_vec(2, 2, vec![0.0; 3]),
            Err(BiasError::DataLength { expected: 4, actual: 3, .. })
        ));
        assert!(matches!(
            IntensityField::from_vec(1, 2, vec![0.5, 1.5]),
            Err(BiasError::ValueOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            IntensityField::from_vec(1, 1, vec![f64::NAN]),
            Err(BiasError::ValueOutOfRange { index: 0, .. })
        ));
        let f = IntensityField::from_vec(1, 2, vec![0.0, 1.0]).unwrap();
        assert_eq!(f.get(0, 1), Some(1.0));
        assert_eq!(f.get(1, 0), None);
    }

    #[test]
    fn test_set_clamps_and_ignores_out_of_bounds() {
        let mut f = IntensityField::new(2, 2).unwrap();
        f.set(0, 0, -3.0);
        f.set(1, 1, 0.25);
        f.set(5, 5, 0.0);
        assert_eq!(f.as_slice(), &[0.0, 1.0, 1.0, 0.25]);
    }

    #[test]
    fn test_gray8_conversion() {
        let f = IntensityField::from_gray8(1, 3, &[0, 128, 255]).unwrap();
        assert_eq!(f.get(0, 0), Some(0.0));
        assert_eq!(f.get(0, 2), Some(1.0));
        assert_eq!(f.to_gray8(), vec![0, 128, 255]);
    }

    #[test]
    fn test_statistics() {
        let f = IntensityField::from_vec(2, 2, vec![0.3, 1.0, 0.3, 0.0]).unwrap();
        assert_eq!(f.min(), 0.0);
        assert_eq!(f.max(), 1.0);
        assert_eq!(f.count_where(|v| v < 0.5), 3);
        assert_eq!(f.distinct_values(), vec![0.0, 0.3, 1.0]);
    }

    #[test]
    fn test_from_fn_and_resize() {
        let f = IntensityField::from_fn(2, 2, |i, j| (i * 2 + j) as f64 / 3.0).unwrap();
        let big = f.resized(4, 4).unwrap();
        assert_eq!(big.shape(), Shape::new(4, 4));
        assert_eq!(big.get(0, 0), f.get(0, 0));
        assert_eq!(big.get(3, 3), f.get(1, 1));
        assert_eq!(big.get(1, 2), f.get(0, 1));

        let clamped =
            IntensityField::from_fn(1, 2, |_, j| if j == 0 { -1.0 } else { f64::NAN }).unwrap();
        assert_eq!(clamped.as_slice(), &[0.0, 1.0]);
    }
}
