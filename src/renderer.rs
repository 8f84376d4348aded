//! Four-panel presentation of a selection-bias run.
//!
//! Panels are laid out left to right (or in a 2×2 grid), each scaled by an
//! integer factor with nearest-neighbour sampling. Titles above the panels,
//! captions below them, and an optional headline and footnote are drawn with
//! the built-in block font, word-wrapped to the space they label. The result
//! is an 8-bit grayscale image written as PNG.

use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};

use crate::block_font;
use crate::error::{BiasError, Result, Shape};
use crate::field::IntensityField;
use crate::glyph_source::{BlockFontSource, GlyphSource};
use crate::path_storage::PathStorage;
use crate::rasterizer_scanline_aa::RasterizerScanlineAa;

/// The four panels, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Reality,
    Model,
    BiasMask,
    Estimate,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Reality, Panel::Model, Panel::BiasMask, Panel::Estimate];

    /// Machine-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Panel::Reality => "reality",
            Panel::Model => "model",
            Panel::BiasMask => "bias mask",
            Panel::Estimate => "estimate",
        }
    }

    /// Title drawn above the panel.
    pub fn title(&self) -> &'static str {
        match self {
            Panel::Reality => "Reality",
            Panel::Model => "Your Model",
            Panel::BiasMask => "Selection Bias",
            Panel::Estimate => "Estimate",
        }
    }

    /// One-line explanation of the panel.
    pub fn caption(&self) -> &'static str {
        match self {
            Panel::Reality => "The true underlying data distribution",
            Panel::Model => "Unbiased sample from the population",
            Panel::BiasMask => "Systematic exclusion of certain data points",
            Panel::Estimate => "Biased sample after selection mechanism",
        }
    }
}

/// Four equally shaped fields.
#[derive(Debug, Clone)]
pub struct PanelSet {
    reality: IntensityField,
    model: IntensityField,
    bias_mask: IntensityField,
    estimate: IntensityField,
}

impl PanelSet {
    /// Fails with [`BiasError::ShapeMismatch`] (against the reality panel)
    /// when any field differs in shape.
    pub fn new(
        reality: IntensityField,
        model: IntensityField,
        bias_mask: IntensityField,
        estimate: IntensityField,
    ) -> Result<Self> {
        for other in [&model, &bias_mask, &estimate] {
            if other.shape() != reality.shape() {
                return Err(BiasError::ShapeMismatch {
                    sample: other.shape(),
                    mask: reality.shape(),
                });
            }
        }
        Ok(Self {
            reality,
            model,
            bias_mask,
            estimate,
        })
    }

    pub fn shape(&self) -> Shape {
        self.reality.shape()
    }

    pub fn get(&self, panel: Panel) -> &IntensityField {
        match panel {
            Panel::Reality => &self.reality,
            Panel::Model => &self.model,
            Panel::BiasMask => &self.bias_mask,
            Panel::Estimate => &self.estimate,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Panel, &IntensityField)> + '_ {
        Panel::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// Panel arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One row of four.
    #[default]
    Strip,
    /// Two rows of two.
    Grid,
}

impl Layout {
    /// `(rows, columns)`.
    pub fn dims(&self) -> (u32, u32) {
        match self {
            Layout::Strip => (1, 4),
            Layout::Grid => (2, 2),
        }
    }
}

/// Footnote under the strip layout.
pub const EXPLANATION: &str = "The letter 'S' (for Selection) emerges not from the underlying \
    reality, but from the systematic removal of data points, demonstrating how selection \
    bias can create false patterns in your analysis.";

/// Headline over the grid layout.
pub const HEADLINE: &str = "Selection Bias Creates False Patterns";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub layout: Layout,
    /// Integer upscaling factor, at least 1.
    pub scale: u32,
    /// Pixels between panels.
    pub gutter: u32,
    /// Pixels around the whole image.
    pub margin: u32,
    /// Gray level of everything outside the panels.
    pub background: u8,
    /// Draw each panel's title above it.
    pub titles: bool,
    /// Em size of titles and the headline in pixels.
    pub title_size: u32,
    /// Draw each panel's caption below it.
    pub captions: bool,
    /// Em size of captions and the footnote in pixels.
    pub caption_size: u32,
    /// Text above all panels.
    pub headline: Option<String>,
    /// Text below all panels.
    pub footnote: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Strip,
            scale: 1,
            gutter: 16,
            margin: 24,
            background: 255,
            titles: true,
            title_size: 16,
            captions: true,
            caption_size: 8,
            headline: None,
            footnote: None,
        }
    }
}

impl RenderOptions {
    /// The figure text each layout carries: the strip gets captions and the
    /// explanation underneath, the grid a headline and titles only.
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::Strip => Self {
                layout,
                footnote: Some(EXPLANATION.to_string()),
                ..Self::default()
            },
            Layout::Grid => Self {
                layout,
                captions: false,
                headline: Some(HEADLINE.to_string()),
                ..Self::default()
            },
        }
    }
}

/// Something that can present a [`PanelSet`] at a path.
pub trait PanelRenderer {
    fn render(&self, panels: &PanelSet, path: &Path) -> Result<()>;
}

/// Pixel geometry of one composed image.
struct Frame {
    panel_w: u32,
    panel_h: u32,
    title_h: u32,
    caption_h: u32,
    headline_h: u32,
    titles: Vec<Vec<String>>,
    captions: Vec<Vec<String>>,
    headline: Vec<String>,
    footnote: Vec<String>,
    width: u32,
    height: u32,
}

/// Renders panels into a single grayscale PNG.
#[derive(Debug, Clone, Default)]
pub struct PngPanelRenderer {
    options: RenderOptions,
}

impl PngPanelRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Size of the composed image for panels of `shape`.
    ///
    /// Fails with [`BiasError::CanvasTooLarge`] when the image would not fit
    /// in `u32` pixel coordinates.
    pub fn canvas_size(&self, shape: Shape) -> Result<(u32, u32)> {
        self.frame(shape).map(|f| (f.width, f.height))
    }

    /// Lay out and rasterize all panels.
    pub fn compose(&self, panels: &PanelSet) -> Result<GrayImage> {
        let o = &self.options;
        let frame = self.frame(panels.shape())?;
        let scale = o.scale.max(1) as usize;
        let (_, cols) = o.layout.dims();
        let (pw, ph) = (frame.panel_w, frame.panel_h);
        let (cw, ch) = (frame.width, frame.height);
        let content_w = cols * pw + (cols - 1) * o.gutter;

        let mut canvas =
            IntensityField::filled(ch as usize, cw as usize, o.background as f64 / 255.0)?;
        let mut ras = RasterizerScanlineAa::new(cw as usize, ch as usize);
        let mut text = TextPainter {
            ras: &mut ras,
            canvas: &mut canvas,
        };

        text.lines(&frame.headline, o.title_size, o.margin, content_w, o.margin);

        let panels_top = o.margin + frame.headline_h;
        let cell_h = frame.title_h + ph + frame.caption_h;
        for (k, (_, field)) in panels.iter().enumerate() {
            let (r, c) = (k as u32 / cols, k as u32 % cols);
            let left = o.margin + c * (pw + o.gutter);
            let top = panels_top + r * (cell_h + o.gutter);

            let image_top = (top + frame.title_h) as usize;
            for py in 0..ph as usize {
                let src = field.row(py / scale);
                for px in 0..pw as usize {
                    text.canvas.set(image_top + py, left as usize + px, src[px / scale]);
                }
            }

            text.lines(&frame.titles[k], o.title_size, left, pw, top);
            let caption_top = top + frame.title_h + ph;
            text.lines(&frame.captions[k], o.caption_size, left, pw, caption_top);
        }

        let (rows, _) = o.layout.dims();
        let footnote_top = panels_top + rows * cell_h + (rows - 1) * o.gutter;
        text.lines(&frame.footnote, o.caption_size, o.margin, content_w, footnote_top);

        let gray = canvas.to_gray8();
        Ok(GrayImage::from_fn(cw, ch, |x, y| {
            Luma([gray[y as usize * cw as usize + x as usize]])
        }))
    }

    fn frame(&self, shape: Shape) -> Result<Frame> {
        let o = &self.options;
        let scale = o.scale.max(1);
        let too_large = || BiasError::CanvasTooLarge { shape, scale };
        let scaled = |n: usize| {
            u32::try_from(n)
                .ok()
                .and_then(|n| n.checked_mul(scale))
                .ok_or_else(too_large)
        };
        let (panel_w, panel_h) = (scaled(shape.width)?, scaled(shape.height)?);
        let (rows, cols) = o.layout.dims();
        let (rows, cols) = (rows as u64, cols as u64);
        let content_w = cols * panel_w as u64 + (cols - 1) * o.gutter as u64;

        let wrap_all = |on: bool, text: fn(&Panel) -> &'static str, size: u32| {
            Panel::ALL
                .iter()
                .map(|p| {
                    if on {
                        wrap_text(text(p), size as f64, panel_w as f64)
                    } else {
                        Vec::new()
                    }
                })
                .collect::<Vec<_>>()
        };
        let titles = wrap_all(o.titles, Panel::title, o.title_size);
        let captions = wrap_all(o.captions, Panel::caption, o.caption_size);
        let wrap_figure = |text: &Option<String>, size: u32| {
            text.as_deref()
                .map(|t| wrap_text(t, size as f64, content_w as f64))
                .unwrap_or_default()
        };
        let headline = wrap_figure(&o.headline, o.title_size);
        let footnote = wrap_figure(&o.footnote, o.caption_size);

        let band = |lines: usize, size: u32| lines as u64 * line_height(size);
        let tallest = |blocks: &[Vec<String>]| blocks.iter().map(Vec::len).max().unwrap_or(0);
        let title_h = band(tallest(&titles), o.title_size);
        let caption_h = band(tallest(&captions), o.caption_size);
        let headline_h = band(headline.len(), o.title_size);
        let footnote_h = band(footnote.len(), o.caption_size);

        let margins = 2 * o.margin as u64;
        let width = margins + content_w;
        let height = margins
            + headline_h
            + rows * (title_h + panel_h as u64 + caption_h)
            + (rows - 1) * o.gutter as u64
            + footnote_h;

        let fit = |v: u64| u32::try_from(v).map_err(|_| too_large());
        Ok(Frame {
            panel_w,
            panel_h,
            title_h: fit(title_h)?,
            caption_h: fit(caption_h)?,
            headline_h: fit(headline_h)?,
            titles,
            captions,
            headline,
            footnote,
            width: fit(width)?,
            height: fit(height)?,
        })
    }
}

impl PanelRenderer for PngPanelRenderer {
    fn render(&self, panels: &PanelSet, path: &Path) -> Result<()> {
        let image = self.compose(panels)?;
        image.save_with_format(path, ImageFormat::Png)?;
        log::debug!(
            "wrote {}x{} panel image to {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(())
    }
}

/// Height of one line of text at `size`: the em plus half an em of leading.
fn line_height(size: u32) -> u64 {
    size as u64 * 3 / 2
}

struct TextPainter<'a> {
    ras: &'a mut RasterizerScanlineAa,
    canvas: &'a mut IntensityField,
}

impl TextPainter<'_> {
    /// Stack `lines` from `top`, each centered across `width` pixels at `left`.
    fn lines(&mut self, lines: &[String], size: u32, left: u32, width: u32, top: u32) {
        let em = size as f64;
        let step = line_height(size) as f64;
        for (i, line) in lines.iter().enumerate() {
            let mut path = text_path(line, em);
            let x = left as f64 + (width as f64 - text_width(line, em)) / 2.0;
            let y = top as f64 + i as f64 * step + (step - em) / 2.0;
            path.translate(x.max(0.0).round(), y.round());
            self.ras.reset();
            self.ras.add_path(&mut path);
            self.ras.render_ink(self.canvas);
        }
    }
}

/// A line of block-font text at `size`, starting at the origin.
fn text_path(text: &str, size: f64) -> PathStorage {
    let font = BlockFontSource;
    let advance = block_font::ADVANCE_CELLS * size / block_font::EM_CELLS;
    let mut path = PathStorage::new();
    for (i, ch) in text.chars().enumerate() {
        if let Some(mut glyph) = font.acquire(ch, size) {
            glyph.outline.translate(i as f64 * advance, 0.0);
            path.concat_path(&mut glyph.outline);
        }
    }
    path
}

/// Width of [`text_path`] without the spacing after the last glyph.
fn text_width(text: &str, size: f64) -> f64 {
    let cell = size / block_font::EM_CELLS;
    let spacing = block_font::ADVANCE_CELLS - block_font::GLYPH_COLUMNS as f64;
    let trailing = match text.chars().last() {
        Some(ch) if block_font::bitmap(ch).is_some() => spacing,
        _ => 0.0,
    };
    let count = text.chars().count() as f64;
    (count * block_font::ADVANCE_CELLS - trailing).max(0.0) * cell
}

/// Greedy word wrap to `max_width` pixels. A word wider than the limit
/// gets a line of its own.
fn wrap_text(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() {
            let candidate = format!("{line} {word}");
            if text_width(&candidate, size) <= max_width {
                line = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut line));
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Save one field as an 8-bit grayscale PNG.
pub fn save_field_png(field: &IntensityField, path: &Path) -> Result<()> {
    let gray = field.to_gray8();
    let w = field.width();
    let image = GrayImage::from_fn(w as u32, field.height() as u32, |x, y| {
        Luma([gray[y as usize * w + x as usize]])
    });
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Load an image as a grayscale field (`v / 255`).
pub fn load_field_png(path: &Path) -> Result<IntensityField> {
    let image = image::open(path)?.to_luma8();
    IntensityField::from_gray8(image.height() as usize, image.width() as usize, image.as_raw())
}

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use super::*;

    fn panels(h: usize, w: usize) -> PanelSet {
        PanelSet::new(
            IntensityField::filled(h, w, 0.0).unwrap(),
            IntensityField::filled(h, w, 0.2).unwrap(),
            IntensityField::filled(h, w, 0.6).unwrap(),
            IntensityField::filled(h, w, 1.0).unwrap(),
        )
        .unwrap()
    }

    fn plain(layout: Layout, scale: u32) -> RenderOptions {
        RenderOptions {
            layout,
            scale,
            gutter: 2,
            margin: 3,
            background: 128,
            titles: false,
            captions: false,
            ..RenderOptions::default()
        }
    }

    fn dark_pixels(img: &GrayImage, xs: Range<u32>, ys: Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] < 64)
            .count()
    }

    #[test]
    fn test_panel_labels() {
        let labels: Vec<_> = Panel::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, ["reality", "model", "bias mask", "estimate"]);
        assert_eq!(Panel::BiasMask.title(), "Selection Bias");
    }

    #[test]
    fn test_panel_set_rejects_mismatch() {
        let r = PanelSet::new(
            IntensityField::new(4, 4).unwrap(),
            IntensityField::new(4, 4).unwrap(),
            IntensityField::new(4, 5).unwrap(),
            IntensityField::new(4, 4).unwrap(),
        );
        assert!(matches!(r, Err(BiasError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_strip_layout() {
        let renderer = PngPanelRenderer::new(plain(Layout::Strip, 2));
        let img = renderer.compose(&panels(5, 4)).unwrap();
        // 2*3 + 4*8 + 3*2 = 44 wide, 2*3 + 10 = 16 tall.
        assert_eq!(img.dimensions(), (44, 16));
        assert_eq!(img.get_pixel(0, 0).0, [128]);
        // First panel starts at the margin.
        assert_eq!(img.get_pixel(3, 3).0, [0]);
        assert_eq!(img.get_pixel(10, 12).0, [0]);
        // Gutter between panels 1 and 2.
        assert_eq!(img.get_pixel(11, 5).0, [128]);
        // Second panel: 0.2 * 255 = 51.
        assert_eq!(img.get_pixel(13, 5).0, [51]);
        // Last panel is white.
        assert_eq!(img.get_pixel(40, 12).0, [255]);
    }

    #[test]
    fn test_grid_layout() {
        let renderer = PngPanelRenderer::new(plain(Layout::Grid, 1));
        let img = renderer.compose(&panels(5, 4)).unwrap();
        assert_eq!(img.dimensions(), (2 * 3 + 2 * 4 + 2, 2 * 3 + 2 * 5 + 2));
        // Bias mask is bottom-left: 0.6 * 255 = 153.
        assert_eq!(img.get_pixel(3, 10).0, [153]);
        assert_eq!(img.get_pixel(9, 10).0, [255]);
    }

    #[test]
    fn test_titles_add_ink_above_panels() {
        let mut options = plain(Layout::Strip, 1);
        options.titles = true;
        let renderer = PngPanelRenderer::new(options);
        let set = panels(20, 200);
        let (w, h) = renderer.canvas_size(set.shape()).unwrap();
        // Every title fits on one 24px line.
        assert_eq!(h, 2 * 3 + 24 + 20);
        let img = renderer.compose(&set).unwrap();
        assert_eq!(img.dimensions(), (w, h));
        assert!(dark_pixels(&img, 3..203, 3..27) > 0);
    }

    #[test]
    fn test_captions_below_panels() {
        let mut options = plain(Layout::Strip, 1);
        options.background = 255;
        options.captions = true;
        let renderer = PngPanelRenderer::new(options);
        // White panels, so any dark pixel is caption ink.
        let set = PanelSet::new(
            IntensityField::new(10, 300).unwrap(),
            IntensityField::new(10, 300).unwrap(),
            IntensityField::new(10, 300).unwrap(),
            IntensityField::new(10, 300).unwrap(),
        )
        .unwrap();
        let (_, h) = renderer.canvas_size(set.shape()).unwrap();
        // Each caption fits on one 12px line at 300px.
        assert_eq!(h, 2 * 3 + 10 + 12);
        let img = renderer.compose(&set).unwrap();
        assert_eq!(dark_pixels(&img, 0..img.width(), 0..13), 0);
        for k in 0..4 {
            let left = 3 + k * 302;
            assert!(dark_pixels(&img, left..left + 300, 13..25) > 0, "panel {k}");
        }
    }

    #[test]
    fn test_grid_headline_above_panels() {
        let options = RenderOptions {
            titles: false,
            ..RenderOptions::for_layout(Layout::Grid)
        };
        assert!(!options.captions);
        let renderer = PngPanelRenderer::new(options);
        let set = panels(300, 300);
        let (w, h) = renderer.canvas_size(set.shape()).unwrap();
        // The 442px headline fits on one 24px line over 616px.
        assert_eq!((w, h), (2 * 24 + 616, 2 * 24 + 24 + 616));
        let img = renderer.compose(&set).unwrap();
        assert!(dark_pixels(&img, 24..640, 24..48) > 0);
    }

    #[test]
    fn test_strip_footnote_wraps() {
        let options = RenderOptions {
            titles: false,
            captions: false,
            ..RenderOptions::for_layout(Layout::Strip)
        };
        let renderer = PngPanelRenderer::new(options);
        let (_, h) = renderer.canvas_size(Shape::new(10, 40)).unwrap();
        let lines = wrap_text(EXPLANATION, 8.0, (4 * 40 + 3 * 16) as f64);
        assert!(lines.len() > 1);
        assert_eq!(h, 2 * 24 + 10 + 12 * lines.len() as u32);
    }

    #[test]
    fn test_oversized_canvas_is_an_error() {
        let renderer = PngPanelRenderer::new(RenderOptions {
            scale: u32::MAX,
            ..RenderOptions::default()
        });
        let err = renderer.canvas_size(Shape::new(2, 2)).unwrap_err();
        assert!(matches!(err, BiasError::CanvasTooLarge { scale: u32::MAX, .. }));

        // Each panel fits, the strip of four does not.
        let renderer = PngPanelRenderer::new(RenderOptions {
            scale: u32::MAX / 3,
            titles: false,
            captions: false,
            ..RenderOptions::default()
        });
        assert!(renderer.canvas_size(Shape::new(1, 1)).is_err());
        assert!(renderer.compose(&panels(1, 1)).is_err());
    }

    #[test]
    fn test_text_width() {
        // Two glyphs at 8px: 6px advance each, no spacing after the last.
        assert_eq!(text_width("II", 8.0), 11.0);
        assert_eq!(text_width("I ", 8.0), 12.0);
        assert_eq!(text_width("", 8.0), 0.0);
        assert!(text_path("", 8.0).is_empty());
    }

    #[test]
    fn test_wrap_text() {
        // "AB CD" is 29px at 8px, "AB" 11px.
        assert_eq!(wrap_text("AB CD", 8.0, 29.0), ["AB CD"]);
        assert_eq!(wrap_text("AB CD", 8.0, 28.0), ["AB", "CD"]);
        assert_eq!(wrap_text("ABCDEFGH", 8.0, 10.0), ["ABCDEFGH"]);
        assert!(wrap_text("   ", 8.0, 100.0).is_empty());
    }
}
