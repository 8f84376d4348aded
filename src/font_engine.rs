//! TrueType font engine using `ttf-parser`.
//!
//! Loads a TTF/OTF face (or one face of a collection) and extracts glyph
//! outlines in layout coordinates: pixels, y growing downward, origin at
//! the top-left of the line box (pen position on the x axis, ascender line
//! on the y axis).

use std::path::Path;

use crate::basics::RectD;
use crate::bounding_rect::bounding_rect;
use crate::curves::ConvCurve;
use crate::error::{BiasError, Result};
use crate::path_storage::PathStorage;

/// Prepared glyph data: outline and metrics at the engine's current height.
#[derive(Debug, Clone)]
pub struct GlyphData {
    /// Ink box of the flattened outline in layout coordinates, `None` for
    /// glyphs without an outline (space and friends).
    pub bounds: Option<RectD>,
    /// Horizontal advance in pixels.
    pub advance_x: f64,
    /// Outline in layout coordinates.
    pub outline: PathStorage,
}

/// TrueType font engine.
pub struct FontEngine {
    /// Owned font data bytes.
    face_data: Vec<u8>,
    /// Font face index (for font collections).
    face_index: u32,
    /// Desired em-height in pixels.
    height: f64,
}

impl FontEngine {
    /// Create a font engine from raw TTF/OTF data.
    ///
    /// `face_index` selects the face in a font collection (use 0 for single fonts).
    pub fn from_data(data: Vec<u8>, face_index: u32) -> Result<Self> {
        ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| BiasError::Font(format!("failed to parse font: {e}")))?;

        Ok(Self {
            face_data: data,
            face_index,
            height: 12.0,
        })
    }

    /// Read and parse a font file.
    pub fn from_file(path: impl AsRef<Path>, face_index: u32) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_data(data, face_index)
    }

    /// Set the em-height in pixels.
    pub fn set_height(&mut self, h: f64) {
        self.height = h;
    }

    /// Ascender in pixels (positive, above the baseline).
    pub fn ascender(&self) -> f64 {
        self.face()
            .map_or(0.0, |face| face.ascender() as f64 * self.scale(&face))
    }

    /// Descender in pixels (typically negative).
    pub fn descender(&self) -> f64 {
        self.face()
            .map_or(0.0, |face| face.descender() as f64 * self.scale(&face))
    }

    /// Height of one line box: ascender minus descender.
    pub fn line_height(&self) -> f64 {
        self.ascender() - self.descender()
    }

    /// Extract a glyph's outline and metrics.
    ///
    /// Returns `None` if the character has no mapping in this font's cmap.
    /// Mapped glyphs without an outline come back with `bounds == None`.
    pub fn prepare_glyph(&self, ch: char) -> Option<GlyphData> {
        let face = self.face()?;
        let glyph_id = face.glyph_index(ch)?;
        let scale = self.scale(&face);

        let advance_x = face
            .glyph_hor_advance(glyph_id)
            .map(|a| a as f64 * scale)
            .unwrap_or(0.0);

        let mut builder = OutlineCollector::new(scale, face.ascender() as f64);
        let bounds = match face.outline_glyph(glyph_id, &mut builder) {
            Some(_) => bounding_rect(&mut ConvCurve::new(&mut builder.path)),
            None => None,
        };

        Some(GlyphData {
            bounds,
            advance_x,
            outline: builder.path,
        })
    }

    // -- Internal helpers --

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.face_data, self.face_index).ok()
    }

    /// Compute the scale factor: height / units_per_em.
    fn scale(&self, face: &ttf_parser::Face<'_>) -> f64 {
        self.height / face.units_per_em().max(1) as f64
    }
}

// ============================================================================
// OutlineCollector: implements ttf_parser::OutlineBuilder
// ============================================================================

/// Collects glyph outline commands into a path in layout coordinates.
struct OutlineCollector {
    path: PathStorage,
    scale: f64,
    /// Ascender in font units; font y is flipped around it.
    ascender: f64,
}

impl OutlineCollector {
    fn new(scale: f64, ascender: f64) -> Self {
        Self {
            path: PathStorage::new(),
            scale,
            ascender,
        }
    }

    #[inline]
    fn sx(&self, v: f32) -> f64 {
        v as f64 * self.scale
    }

    #[inline]
    fn sy(&self, v: f32) -> f64 {
        (self.ascender - v as f64) * self.scale
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = (self.sx(x1), self.sy(y1));
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.curve3(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.sx(x1), self.sy(y1));
        let (x2, y2) = (self.sx(x2), self.sy(y2));
        let (x, y) = (self.sx(x), self.sy(y));
        self.path.curve4(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close_polygon();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{
        PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO,
        PATH_FLAGS_CLOSE,
    };

    #[test]
    fn test_outline_collector_flips_around_ascender() {
        let c = OutlineCollector::new(0.5, 800.0);
        assert!((c.sx(100.0) - 50.0).abs() < 1e-10);
        // Ascender line maps to y = 0, baseline to ascender * scale.
        assert!(c.sy(800.0).abs() < 1e-10);
        assert!((c.sy(0.0) - 400.0).abs() < 1e-10);
        assert!((c.sy(-200.0) - 500.0).abs() < 1e-10);
    }

    #[test]
    fn test_outline_collector_commands() {
        let mut c = OutlineCollector::new(1.0, 0.0);
        ttf_parser::OutlineBuilder::move_to(&mut c, 10.0, 20.0);
        ttf_parser::OutlineBuilder::line_to(&mut c, 30.0, 40.0);
        ttf_parser::OutlineBuilder::quad_to(&mut c, 50.0, 60.0, 70.0, 80.0);
        ttf_parser::OutlineBuilder::curve_to(&mut c, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        ttf_parser::OutlineBuilder::close(&mut c);

        let cmds: Vec<u32> = c.path.vertices().iter().map(|v| v.cmd).collect();
        assert_eq!(
            cmds,
            vec![
                PATH_CMD_MOVE_TO,
                PATH_CMD_LINE_TO,
                PATH_CMD_CURVE3,
                PATH_CMD_CURVE3,
                PATH_CMD_CURVE4,
                PATH_CMD_CURVE4,
                PATH_CMD_CURVE4,
                PATH_CMD_END_POLY | PATH_FLAGS_CLOSE,
            ]
        );
        assert_eq!(c.path.vertices()[0].y, -20.0);
    }

    #[test]
    fn test_garbage_data_is_a_font_error() {
        let err = FontEngine::from_data(vec![0u8; 16], 0).err().unwrap();
        assert!(matches!(err, BiasError::Font(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FontEngine::from_file("/nonexistent/font/file.ttf", 0).err().unwrap();
        assert!(matches!(err, BiasError::Io(_)));
    }
}
