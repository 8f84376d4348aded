//! Error type shared by the field, generator, masker, and renderer.

use std::fmt;

use thiserror::Error;

/// `(height, width)` of an intensity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub height: usize,
    pub width: usize,
}

impl Shape {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Number of samples in a field of this shape.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.height, self.width)
    }
}

#[derive(Error, Debug)]
pub enum BiasError {
    /// Height or width was zero or negative.
    #[error("invalid dimension: height {height} and width {width} must both be positive")]
    InvalidDimension { height: i64, width: i64 },

    /// Sample and mask (or renderer panels) differ in shape.
    #[error("shape mismatch: sample shape {sample} does not match mask shape {mask}")]
    ShapeMismatch { sample: Shape, mask: Shape },

    /// A caller-supplied sample lies outside [0, 1] or is NaN.
    #[error("value {value} at index {index} is outside [0, 1]")]
    ValueOutOfRange { index: usize, value: f64 },

    /// Caller-supplied data does not have `height * width` samples.
    #[error("expected {expected} samples for shape {shape}, got {actual}")]
    DataLength {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// Selection threshold outside [0, 1] or NaN.
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    /// The composed panel image would not fit in 32-bit pixel coordinates.
    #[error("panels of shape {shape} at scale {scale} do not fit in one image")]
    CanvasTooLarge { shape: Shape, scale: u32 },

    /// Font data could not be parsed.
    #[error("font error: {0}")]
    Font(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, BiasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_display_and_len() {
        let s = Shape::new(4, 5);
        assert_eq!(s.to_string(), "(4, 5)");
        assert_eq!(s.len(), 20);
        assert!(!s.is_empty());
        assert!(Shape::new(0, 3).is_empty());
    }

    #[test]
    fn test_messages_name_offending_values() {
        let e = BiasError::InvalidDimension {
            height: 10,
            width: -1,
        };
        assert!(e.to_string().contains("-1"));

        let e = BiasError::ShapeMismatch {
            sample: Shape::new(4, 4),
            mask: Shape::new(4, 5),
        };
        let msg = e.to_string();
        assert!(msg.contains("(4, 4)"));
        assert!(msg.contains("(4, 5)"));
    }
}
