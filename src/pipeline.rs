//! Reality, model, mask, estimate: one full selection-bias run.

use log::debug;

use crate::config::MaskConfig;
use crate::error::Result;
use crate::field::IntensityField;
use crate::glyph_mask::GlyphReport;
use crate::masker::SelectionStats;
use crate::renderer::PanelSet;

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub panels: PanelSet,
    pub glyph: GlyphReport,
    pub selection: SelectionStats,
}

/// A radial gradient: dark in the centre, light toward the corners.
pub fn synthetic_reality(height: usize, width: usize) -> Result<IntensityField> {
    let cy = (height as f64 - 1.0) / 2.0;
    let cx = (width as f64 - 1.0) / 2.0;
    let max_dist = cx.hypot(cy).max(1.0);
    IntensityField::from_fn(height, width, |i, j| {
        let d = (i as f64 - cy).hypot(j as f64 - cx) / max_dist;
        0.15 + 0.8 * d
    })
}

/// Generate a mask shaped like `reality` and apply it to `sample`.
///
/// `sample` must already have `reality`'s shape.
pub fn run(
    config: &MaskConfig,
    reality: IntensityField,
    sample: IntensityField,
) -> Result<PipelineOutput> {
    let masker = config.masker()?;
    let shape = reality.shape();
    let (mask, glyph) = config.generator().generate_with_report(
        shape.height as i64,
        shape.width as i64,
        config.letter,
        config.size_ratio,
    )?;
    let (estimate, selection) = masker.apply_with_stats(&sample, &mask)?;
    debug!(
        "mask {shape}: {} ink pixels via {}, {} pixels masked",
        glyph.ink_pixels, glyph.provenance, selection.masked_pixels
    );

    let panels = PanelSet::new(reality, sample, mask, estimate)?;
    Ok(PipelineOutput {
        panels,
        glyph,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BiasError, Shape};
    use crate::renderer::Panel;

    #[test]
    fn test_synthetic_reality() {
        let f = synthetic_reality(21, 31).unwrap();
        assert_eq!(f.shape(), Shape::new(21, 31));
        assert!((f.get(10, 15).unwrap() - 0.15).abs() < 1e-12);
        assert!((f.get(0, 0).unwrap() - 0.95).abs() < 1e-12);
        assert!(f.get(10, 15) < f.get(10, 25));
    }

    #[test]
    fn test_run_fills_every_panel() {
        let reality = synthetic_reality(40, 30).unwrap();
        let out = run(&MaskConfig::default(), reality.clone(), reality).unwrap();
        assert_eq!(out.panels.shape(), Shape::new(40, 30));
        assert_eq!(out.selection.total_pixels, 1200);
        assert!(out.selection.masked_pixels > 0);
        let mask = out.panels.get(Panel::BiasMask);
        assert_eq!(out.selection.masked_pixels, mask.count_where(|v| v < 0.5));
        assert_eq!(out.panels.get(Panel::Model), out.panels.get(Panel::Reality));
    }

    #[test]
    fn test_run_rejects_mismatched_sample() {
        let reality = synthetic_reality(10, 10).unwrap();
        let sample = IntensityField::new(10, 11).unwrap();
        assert!(matches!(
            run(&MaskConfig::default(), reality, sample),
            Err(BiasError::ShapeMismatch { .. })
        ));
    }
}
