//! Glyph mask generation.
//!
//! [`GlyphMaskGenerator`] renders one character, centered, into a fresh
//! intensity field: ink `0.0`, background `1.0`, anti-aliased edges in
//! between. The glyph comes from the first [`GlyphSource`] in the chain
//! that produces visible ink; its box is measured by the first
//! [`BoundsStrategy`] that succeeds. When no source produces a glyph the
//! generator draws a geometric approximation of an "S" instead, so the
//! only failure is an invalid shape.

use std::path::PathBuf;

use log::{debug, warn};

use crate::arc::arc_band;
use crate::basics::{floor_div, scaled_extent};
use crate::error::{Result, Shape};
use crate::field::{checked_shape, IntensityField, BACKGROUND, INK};
use crate::glyph_source::{default_sources, Glyph, GlyphSource, Provenance};
use crate::path_storage::PathStorage;
use crate::rasterizer_scanline_aa::RasterizerScanlineAa;

/// Fraction of `min(height, width)` used as the font size by default.
pub const DEFAULT_SIZE_RATIO: f64 = 0.9;

/// Font sizes are capped at this multiple of the larger field extent; a
/// glyph that big is clipped to nothing but its interior anyway.
const MAX_SIZE_FACTOR: f64 = 4.0;

/// Measured glyph box in whole pixels.
///
/// `origin_x`/`origin_y` locate the box's top-left corner in the glyph's
/// layout coordinates; stamping moves that corner to the centering offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: i64,
    pub height: i64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl TextExtent {
    fn at_origin(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

/// One way of measuring a glyph. Strategies are tried in order; the first
/// `Some` wins.
pub trait BoundsStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn measure(&self, glyph: Option<&Glyph>, shape: Shape) -> Option<TextExtent>;
}

/// Exact bounding box of the flattened outline, snapped outward to pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct InkBounds;

impl BoundsStrategy for InkBounds {
    fn name(&self) -> &'static str {
        "ink"
    }

    fn measure(&self, glyph: Option<&Glyph>, _shape: Shape) -> Option<TextExtent> {
        let r = glyph?.ink_bounds()?;
        let (x1, y1) = (r.x1.floor(), r.y1.floor());
        let (x2, y2) = (r.x2.ceil(), r.y2.ceil());
        if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
            return None;
        }
        Some(TextExtent {
            width: (x2 - x1) as i64,
            height: (y2 - y1) as i64,
            origin_x: x1,
            origin_y: y1,
        })
    }
}

/// Advance width by line height, measured from the pen origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceBounds;

impl BoundsStrategy for AdvanceBounds {
    fn name(&self) -> &'static str {
        "advance"
    }

    fn measure(&self, glyph: Option<&Glyph>, _shape: Shape) -> Option<TextExtent> {
        let g = glyph?;
        let (w, h) = (g.advance.round(), g.line_height.round());
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some(TextExtent::at_origin(w as i64, h as i64))
    }
}

/// `floor(0.6 * width) × floor(0.8 * height)`, independent of the glyph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalBounds;

impl ProportionalBounds {
    pub fn extent(shape: Shape) -> TextExtent {
        TextExtent::at_origin(
            scaled_extent(shape.width, 0.6) as i64,
            scaled_extent(shape.height, 0.8) as i64,
        )
    }
}

impl BoundsStrategy for ProportionalBounds {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn measure(&self, _glyph: Option<&Glyph>, shape: Shape) -> Option<TextExtent> {
        Some(Self::extent(shape))
    }
}

/// Ink, advance, proportional.
pub fn default_bounds() -> Vec<Box<dyn BoundsStrategy>> {
    vec![
        Box::new(InkBounds),
        Box::new(AdvanceBounds),
        Box::new(ProportionalBounds),
    ]
}

/// What the generator did for one mask.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphReport {
    pub letter: char,
    pub shape: Shape,
    /// Em size in pixels.
    pub font_size: f64,
    pub provenance: Provenance,
    /// Name of the bounds strategy that measured the glyph.
    pub bounds: &'static str,
    pub extent: TextExtent,
    /// Top-left corner of the measured box in field coordinates.
    pub offset: (i64, i64),
    /// Pixels at exactly `0.0`.
    pub ink_pixels: usize,
    /// Pixels at exactly `1.0`.
    pub background_pixels: usize,
}

/// Font size for a field: `floor(r * min(h, w))`, at least one pixel.
pub fn font_size_for(shape: Shape, size_ratio: f64) -> f64 {
    let min_side = shape.height.min(shape.width) as f64;
    let cap = shape.height.max(shape.width) as f64 * MAX_SIZE_FACTOR;
    let size = (size_ratio * min_side).floor();
    if size.is_finite() && size >= 1.0 {
        size.min(cap)
    } else {
        1.0
    }
}

/// Renders centered glyph masks.
pub struct GlyphMaskGenerator {
    sources: Vec<Box<dyn GlyphSource>>,
    bounds: Vec<Box<dyn BoundsStrategy>>,
}

impl Default for GlyphMaskGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphMaskGenerator {
    /// The default chain: system fonts, then the built-in block font.
    pub fn new() -> Self {
        Self::with_sources(default_sources(&[]))
    }

    /// Use exactly `sources`, in order. An empty chain always draws the
    /// geometric approximation.
    pub fn with_sources(sources: Vec<Box<dyn GlyphSource>>) -> Self {
        Self {
            sources,
            bounds: default_bounds(),
        }
    }

    /// The default chain with `paths` tried before the system fonts.
    pub fn with_font_paths(paths: &[PathBuf]) -> Self {
        Self::with_sources(default_sources(paths))
    }

    /// Replace the bounds strategies. The proportional box is still used
    /// when none of them succeeds.
    pub fn with_bounds(mut self, bounds: Vec<Box<dyn BoundsStrategy>>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Names of the glyph sources, in the order they are tried.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Render `letter` centered in a `height × width` field.
    pub fn generate(
        &self,
        height: i64,
        width: i64,
        letter: char,
        size_ratio: f64,
    ) -> Result<IntensityField> {
        self.generate_with_report(height, width, letter, size_ratio)
            .map(|(field, _)| field)
    }

    /// Like [`generate`](Self::generate), also describing how the mask was made.
    pub fn generate_with_report(
        &self,
        height: i64,
        width: i64,
        letter: char,
        size_ratio: f64,
    ) -> Result<(IntensityField, GlyphReport)> {
        let shape = checked_shape(height, width)?;
        let font_size = font_size_for(shape, size_ratio);
        let mut field = IntensityField::new(shape.height, shape.width)?;
        let mut ras = RasterizerScanlineAa::new(shape.width, shape.height);

        for source in &self.sources {
            let Some(glyph) = source.acquire(letter, font_size) else {
                continue;
            };
            let (extent, bounds) = self.measure(Some(&glyph), shape);
            let offset = centered(shape, &extent);

            let mut outline = glyph.outline;
            outline.translate(
                offset.0 as f64 - extent.origin_x,
                offset.1 as f64 - extent.origin_y,
            );
            ras.reset();
            ras.add_path(&mut outline);
            if ras.render_ink(&mut field) == 0 {
                debug!(
                    "{} drew no visible ink for {letter:?} at {font_size}px",
                    source.name()
                );
                continue;
            }

            let report = report(
                &field,
                letter,
                font_size,
                Provenance::Source(source.name()),
                bounds,
                extent,
                offset,
            );
            debug!(
                "glyph {letter:?} from {} at {font_size}px, {} bounds {}x{} at {:?}",
                report.provenance, bounds, extent.width, extent.height, offset
            );
            return Ok((field, report));
        }

        warn!("no glyph source could render {letter:?}; drawing geometric approximation");
        let (extent, bounds) = self.measure(None, shape);
        let offset = centered(shape, &extent);
        for mut piece in geometric_approximation(shape) {
            ras.reset();
            ras.add_path(&mut piece);
            ras.render_ink(&mut field);
        }
        let report = report(
            &field,
            letter,
            font_size,
            Provenance::Geometric,
            bounds,
            extent,
            offset,
        );
        Ok((field, report))
    }

    fn measure(&self, glyph: Option<&Glyph>, shape: Shape) -> (TextExtent, &'static str) {
        self.bounds
            .iter()
            .find_map(|b| b.measure(glyph, shape).map(|e| (e, b.name())))
            .unwrap_or_else(|| (ProportionalBounds::extent(shape), ProportionalBounds.name()))
    }
}

/// Top-left corner that centers `extent`; negative when it does not fit.
fn centered(shape: Shape, extent: &TextExtent) -> (i64, i64) {
    (
        floor_div(shape.width as i64 - extent.width, 2),
        floor_div(shape.height as i64 - extent.height, 2),
    )
}

fn report(
    field: &IntensityField,
    letter: char,
    font_size: f64,
    provenance: Provenance,
    bounds: &'static str,
    extent: TextExtent,
    offset: (i64, i64),
) -> GlyphReport {
    GlyphReport {
        letter,
        shape: field.shape(),
        font_size,
        provenance,
        bounds,
        extent,
        offset,
        ink_pixels: field.count_where(|v| v == INK),
        background_pixels: field.count_where(|v| v == BACKGROUND),
    }
}

/// An "S" built from two arc bands and a bar.
///
/// The shape has its own centered box, half the field wide and 70% of it
/// tall. The upper band is the left half of an ellipse filling the top
/// third of that box, the lower band the right half of one filling the
/// bottom third; the bar joins them down the middle half. Corners are
/// inclusive pixel coordinates. Each piece is returned separately so
/// overlaps composite instead of cancelling.
fn geometric_approximation(shape: Shape) -> Vec<PathStorage> {
    let (height, width) = (shape.height as i64, shape.width as i64);
    let (s_w, s_h) = (width / 2, scaled_extent(shape.height, 0.7) as i64);
    let (s_x, s_y) = (floor_div(width - s_w, 2), floor_div(height - s_h, 2));
    let thickness = 10i64.max(height.min(width) / 20);

    let pixel_box = |x1: i64, y1: i64, x2: i64, y2: i64| {
        (x1 as f64, y1 as f64, (x2 + 1) as f64, (y2 + 1) as f64)
    };
    let t = thickness as f64;
    let top = arc_band(pixel_box(s_x, s_y, s_x + s_w, s_y + s_h / 3), 90.0, 270.0, t);
    let bottom = arc_band(pixel_box(s_x, s_y + 2 * s_h / 3, s_x + s_w, s_y + s_h), 270.0, 90.0, t);

    let cx = s_x + s_w / 2;
    let (x1, y1, x2, y2) = pixel_box(
        cx - thickness / 2,
        s_y + s_h / 4,
        cx + thickness / 2,
        s_y + 3 * s_h / 4,
    );
    let mut bar = PathStorage::new();
    bar.rect(x1, y1, x2, y2);

    vec![top, bottom, bar]
}
