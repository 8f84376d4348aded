//! Glyph sources for the mask generator.
//!
//! A [`GlyphSource`] turns a character and a font size into an outline in
//! layout coordinates (pixels, y down, origin at the top-left of the line
//! box). The generator tries its sources in order and takes the first
//! glyph with visible ink, so every failure here is soft: a missing file,
//! an unparsable font, an unmapped character, or an empty outline all
//! come back as `None` with a `debug!` record.

use std::fmt;
use std::path::PathBuf;

use log::debug;

use crate::basics::RectD;
use crate::block_font;
use crate::bounding_rect::bounding_rect;
use crate::curves::ConvCurve;
use crate::path_storage::PathStorage;

/// Bold sans fonts tried by default, in order: macOS, Linux, Windows.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A glyph outline with the metrics the bounds strategies need.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Outline in layout coordinates. May contain curves.
    pub outline: PathStorage,
    /// Horizontal advance in pixels.
    pub advance: f64,
    /// Line box height (ascender minus descender) in pixels.
    pub line_height: f64,
}

impl Glyph {
    /// Bounding box of the flattened outline.
    pub fn ink_bounds(&self) -> Option<RectD> {
        bounding_rect(&mut ConvCurve::new(self.outline.clone()))
    }
}

/// Where the stamped glyph came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// A glyph source, by name.
    Source(String),
    /// Every source failed and the arc-and-bar approximation was drawn.
    Geometric,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Source(name) => f.write_str(name),
            Provenance::Geometric => f.write_str("geometric approximation"),
        }
    }
}

/// One entry of the generator's fallback chain.
pub trait GlyphSource: Send + Sync {
    /// Short human-readable name used in reports and logs.
    fn name(&self) -> String;

    /// Outline for `ch` at an em size of `size` pixels, or `None`.
    fn acquire(&self, ch: char, size: f64) -> Option<Glyph>;
}

// ============================================================================
// TrueType
// ============================================================================

/// A TrueType/OpenType font file, read on every acquisition.
#[cfg(feature = "font")]
#[derive(Debug, Clone)]
pub struct TrueTypeSource {
    path: PathBuf,
}

#[cfg(feature = "font")]
impl TrueTypeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(feature = "font")]
impl GlyphSource for TrueTypeSource {
    fn name(&self) -> String {
        format!("truetype {}", self.path.display())
    }

    fn acquire(&self, ch: char, size: f64) -> Option<Glyph> {
        let mut engine = match crate::font_engine::FontEngine::from_file(&self.path, 0) {
            Ok(engine) => engine,
            Err(e) => {
                debug!("skipping font {}: {e}", self.path.display());
                return None;
            }
        };
        engine.set_height(size);

        let Some(data) = engine.prepare_glyph(ch) else {
            debug!("font {} has no mapping for {ch:?}", self.path.display());
            return None;
        };
        if data.bounds.is_none() {
            debug!("font {} has no outline for {ch:?}", self.path.display());
            return None;
        }

        Some(Glyph {
            outline: data.outline,
            advance: data.advance_x,
            line_height: engine.line_height(),
        })
    }
}

// ============================================================================
// Built-in block font
// ============================================================================

/// The built-in 5×7 block font, scaled so its em square is `size` pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFontSource;

impl GlyphSource for BlockFontSource {
    fn name(&self) -> String {
        "built-in block font".to_string()
    }

    fn acquire(&self, ch: char, size: f64) -> Option<Glyph> {
        let cell = size / block_font::EM_CELLS;
        let Some(outline) = block_font::outline(ch, cell) else {
            debug!("block font has no bitmap for {ch:?}");
            return None;
        };
        Some(Glyph {
            outline,
            advance: block_font::ADVANCE_CELLS * cell,
            line_height: block_font::EM_CELLS * cell,
        })
    }
}

/// The default chain: `extra_fonts`, then [`SYSTEM_FONT_PATHS`], then the
/// block font. Without the `font` feature only the block font remains.
pub fn default_sources(extra_fonts: &[PathBuf]) -> Vec<Box<dyn GlyphSource>> {
    let mut sources: Vec<Box<dyn GlyphSource>> = Vec::new();

    #[cfg(feature = "font")]
    {
        sources.extend(
            extra_fonts
                .iter()
                .map(|p| Box::new(TrueTypeSource::new(p.clone())) as Box<dyn GlyphSource>),
        );
        sources.extend(
            SYSTEM_FONT_PATHS
                .iter()
                .map(|p| Box::new(TrueTypeSource::new(*p)) as Box<dyn GlyphSource>),
        );
    }
    #[cfg(not(feature = "font"))]
    {
        if !extra_fonts.is_empty() {
            debug!("ignoring {} font paths: built without the font feature", extra_fonts.len());
        }
    }

    sources.push(Box::new(BlockFontSource));
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_font_metrics() {
        let g = BlockFontSource.acquire('S', 80.0).unwrap();
        assert_eq!(g.line_height, 80.0);
        assert_eq!(g.advance, 60.0);
        let ink = g.ink_bounds().unwrap();
        assert_eq!(ink, RectD::new(0.0, 0.0, 50.0, 70.0));
    }

    #[test]
    fn test_block_font_unknown_char() {
        assert!(BlockFontSource.acquire('\u{263A}', 40.0).is_none());
        assert!(BlockFontSource.acquire(' ', 40.0).is_none());
    }

    #[test]
    fn test_default_chain_ends_with_block_font() {
        let sources = default_sources(&[]);
        assert_eq!(sources.last().unwrap().name(), "built-in block font");
        #[cfg(feature = "font")]
        assert_eq!(sources.len(), SYSTEM_FONT_PATHS.len() + 1);
    }

    #[cfg(feature = "font")]
    #[test]
    fn test_extra_fonts_come_first() {
        let sources = default_sources(&[PathBuf::from("/tmp/custom.ttf")]);
        assert_eq!(sources[0].name(), "truetype /tmp/custom.ttf");
    }

    #[cfg(feature = "font")]
    #[test]
    fn test_missing_font_file_is_soft_failure() {
        let src = TrueTypeSource::new("/nonexistent/dir/nothing.ttf");
        assert!(src.acquire('S', 40.0).is_none());
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::Geometric.to_string(), "geometric approximation");
        assert_eq!(Provenance::Source("x".into()).to_string(), "x");
    }
}
