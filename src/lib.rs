//! # selection-bias
//!
//! Glyph masks and selection masking for illustrating selection bias.
//!
//! A single character is rendered, centered and anti-aliased, into a 2D
//! intensity field (ink `0.0`, background `1.0`). That field then decides
//! which samples of an equally shaped image survive: wherever the mask is
//! darker than a threshold the sample is replaced by background, so the
//! "estimate" shows a pattern that was never in the data.
//!
//! ## Architecture
//!
//! 1. **Glyph sources**: TrueType fonts, then a built-in block font
//! 2. **Bounds strategies**: ink box, advance box, proportional box
//! 3. **Rasterizer**: outlines to per-pixel coverage
//! 4. **Masker**: threshold the mask against the sample
//! 5. **Renderer**: the four panels side by side as a PNG
//!
//! ```no_run
//! use selection_bias::{GlyphMaskGenerator, IntensityField, SelectionMasker};
//!
//! let mask = GlyphMaskGenerator::new().generate(100, 100, 'S', 0.9)?;
//! let sample = IntensityField::filled(100, 100, 0.3)?;
//! let estimate = SelectionMasker::default().apply(&sample, &mask)?;
//! assert!(estimate.iter().all(|v| v == 0.3 || v == 1.0));
//! # Ok::<(), selection_bias::BiasError>(())
//! ```

// Foundation
pub mod basics;
pub mod error;
pub mod field;

// Geometry and rasterization
pub mod arc;
pub mod bounding_rect;
pub mod curves;
pub mod path_storage;
pub mod rasterizer_scanline_aa;

// Glyphs
pub mod block_font;
#[cfg(feature = "font")]
pub mod font_engine;
pub mod glyph_mask;
pub mod glyph_source;

// Selection and presentation
pub mod config;
pub mod masker;
pub mod pipeline;
pub mod renderer;

pub use config::MaskConfig;
pub use error::{BiasError, Result, Shape};
pub use field::IntensityField;
pub use glyph_mask::{BoundsStrategy, GlyphMaskGenerator, GlyphReport, TextExtent};
pub use glyph_source::{BlockFontSource, Glyph, GlyphSource, Provenance};
#[cfg(feature = "font")]
pub use glyph_source::TrueTypeSource;
pub use masker::{apply_selection, SelectionMasker, SelectionStats};
pub use renderer::{Layout, Panel, PanelRenderer, PanelSet, PngPanelRenderer, RenderOptions};
