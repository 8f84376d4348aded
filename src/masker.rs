//! Selection masking.
//!
//! Removes every sample that falls under the dark part of a mask:
//! `biased[i] = 1.0` where `mask[i] < threshold`, otherwise `sample[i]`.
//! The comparison is strict, so a mask value equal to the threshold keeps
//! its sample.

use log::debug;

use crate::error::{BiasError, Result, Shape};
use crate::field::{IntensityField, BACKGROUND, INK};

/// Mask values below this count as masked by default.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Counts describing one masking pass.
///
/// A stipple is a sample at exactly `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionStats {
    pub shape: Shape,
    pub total_pixels: usize,
    pub masked_pixels: usize,
    pub stipples_before: usize,
    pub stipples_removed: usize,
    pub stipples_after: usize,
}

impl SelectionStats {
    /// Share of pixels under the mask, in `[0, 1]`.
    pub fn masked_fraction(&self) -> f64 {
        self.masked_pixels as f64 / self.total_pixels.max(1) as f64
    }

    /// Percentage of stipples that survived, `None` when there were none.
    pub fn retained_percent(&self) -> Option<f64> {
        (self.stipples_before > 0)
            .then(|| 100.0 * self.stipples_after as f64 / self.stipples_before as f64)
    }
}

/// Applies a mask to samples at a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionMasker {
    threshold: f64,
}

impl Default for SelectionMasker {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl SelectionMasker {
    /// Fails with [`BiasError::InvalidThreshold`] outside `[0, 1]` or for NaN.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(BiasError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns `true` if `mask_value` removes the sample under it.
    #[inline]
    pub fn is_masked(&self, mask_value: f64) -> bool {
        mask_value < self.threshold
    }

    /// A new field with masked samples set to background.
    pub fn apply(&self, sample: &IntensityField, mask: &IntensityField) -> Result<IntensityField> {
        check_shapes(sample, mask)?;
        let data = sample
            .iter()
            .zip(mask.iter())
            .map(|(s, m)| if self.is_masked(m) { BACKGROUND } else { s })
            .collect();
        Ok(IntensityField::from_parts(sample.shape(), data))
    }

    /// [`apply`](Self::apply) plus the counts of what was removed.
    pub fn apply_with_stats(
        &self,
        sample: &IntensityField,
        mask: &IntensityField,
    ) -> Result<(IntensityField, SelectionStats)> {
        let biased = self.apply(sample, mask)?;

        let mut masked_pixels = 0;
        let mut stipples_removed = 0;
        for (s, m) in sample.iter().zip(mask.iter()) {
            if self.is_masked(m) {
                masked_pixels += 1;
                if s == INK {
                    stipples_removed += 1;
                }
            }
        }
        let stats = SelectionStats {
            shape: sample.shape(),
            total_pixels: sample.len(),
            masked_pixels,
            stipples_before: sample.count_where(|v| v == INK),
            stipples_removed,
            stipples_after: biased.count_where(|v| v == INK),
        };

        debug!(
            "masked {}/{} pixels ({:.1}%) at threshold {}, stipples {} -> {} ({} removed)",
            stats.masked_pixels,
            stats.total_pixels,
            100.0 * stats.masked_fraction(),
            self.threshold,
            stats.stipples_before,
            stats.stipples_after,
            stats.stipples_removed,
        );
        Ok((biased, stats))
    }
}

/// One-shot [`SelectionMasker::apply`] with an explicit threshold.
pub fn apply_selection(
    sample: &IntensityField,
    mask: &IntensityField,
    threshold: f64,
) -> Result<IntensityField> {
    SelectionMasker::new(threshold)?.apply(sample, mask)
}

fn check_shapes(sample: &IntensityField, mask: &IntensityField) -> Result<()> {
    if sample.shape() != mask.shape() {
        return Err(BiasError::ShapeMismatch {
            sample: sample.shape(),
            mask: mask.shape(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(h: usize, w: usize, data: &[f64]) -> IntensityField {
        IntensityField::from_vec(h, w, data.to_vec()).unwrap()
    }

    #[test]
    fn test_masked_cells_become_background() {
        let sample = field(2, 2, &[0.0, 0.3, 0.0, 0.7]);
        let mask = field(2, 2, &[0.0, 0.2, 1.0, 0.9]);
        let out = SelectionMasker::default().apply(&sample, &mask).unwrap();
        assert_eq!(out.as_slice(), &[1.0, 1.0, 0.0, 0.7]);
    }

    #[test]
    fn test_threshold_tie_keeps_sample() {
        let sample = field(1, 3, &[0.0, 0.0, 0.0]);
        let mask = field(1, 3, &[0.4999, 0.5, 0.5001]);
        let out = apply_selection(&sample, &mask, 0.5).unwrap();
        assert_eq!(out.as_slice(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let sample = IntensityField::new(4, 4).unwrap();
        let mask = IntensityField::new(4, 5).unwrap();
        match SelectionMasker::default().apply(&sample, &mask) {
            Err(BiasError::ShapeMismatch { sample, mask }) => {
                assert_eq!(sample, Shape::new(4, 4));
                assert_eq!(mask, Shape::new(4, 5));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_threshold() {
        for t in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(SelectionMasker::new(t), Err(BiasError::InvalidThreshold(_))));
        }
        assert_eq!(SelectionMasker::new(0.0).unwrap().threshold(), 0.0);
        assert_eq!(SelectionMasker::new(1.0).unwrap().threshold(), 1.0);
    }

    #[test]
    fn test_inputs_untouched_and_repeatable() {
        let sample = field(1, 4, &[0.0, 0.25, 0.5, 1.0]);
        let mask = field(1, 4, &[0.1, 0.9, 0.1, 0.9]);
        let before = sample.clone();
        let m = SelectionMasker::default();
        let a = m.apply(&sample, &mask).unwrap();
        let b = m.apply(&sample, &mask).unwrap();
        assert_eq!(sample, before);
        assert_eq!(
            a.iter().map(f64::to_bits).collect::<Vec<_>>(),
            b.iter().map(f64::to_bits).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_stats() {
        let sample = field(2, 3, &[0.0, 0.0, 0.0, 0.0, 0.5, 1.0]);
        let mask = field(2, 3, &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let (out, stats) = SelectionMasker::default().apply_with_stats(&sample, &mask).unwrap();
        assert_eq!(out.as_slice(), &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        assert_eq!(stats.total_pixels, 6);
        assert_eq!(stats.masked_pixels, 3);
        assert_eq!(stats.stipples_before, 4);
        assert_eq!(stats.stipples_removed, 2);
        assert_eq!(stats.stipples_after, 2);
        assert_eq!(stats.masked_fraction(), 0.5);
        assert_eq!(stats.retained_percent(), Some(50.0));
    }

    #[test]
    fn test_retained_percent_without_stipples() {
        let sample = IntensityField::filled(2, 2, 0.3).unwrap();
        let mask = IntensityField::new(2, 2).unwrap();
        let (_, stats) = SelectionMasker::default().apply_with_stats(&sample, &mask).unwrap();
        assert_eq!(stats.retained_percent(), None);
        assert_eq!(stats.masked_pixels, 0);
    }
}
