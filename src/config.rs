//! Run configuration shared by the library pipeline and the binary.

use std::path::PathBuf;

use crate::error::Result;
use crate::glyph_mask::{GlyphMaskGenerator, DEFAULT_SIZE_RATIO};
use crate::masker::{SelectionMasker, DEFAULT_THRESHOLD};

/// Parameters of one mask-and-select run.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskConfig {
    /// Character drawn as the mask.
    pub letter: char,
    /// Font size as a fraction of the shorter field side.
    pub size_ratio: f64,
    /// Mask values below this remove the sample under them.
    pub threshold: f64,
    /// Font files tried before the system fonts.
    pub font_paths: Vec<PathBuf>,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            letter: 'S',
            size_ratio: DEFAULT_SIZE_RATIO,
            threshold: DEFAULT_THRESHOLD,
            font_paths: Vec::new(),
        }
    }
}

impl MaskConfig {
    /// Generator with this config's font paths ahead of the default chain.
    pub fn generator(&self) -> GlyphMaskGenerator {
        GlyphMaskGenerator::with_font_paths(&self.font_paths)
    }

    /// Masker at this config's threshold.
    pub fn masker(&self) -> Result<SelectionMasker> {
        SelectionMasker::new(self.threshold)
    }
}
