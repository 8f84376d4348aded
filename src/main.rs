use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use selection_bias::pipeline::{self, synthetic_reality};
use selection_bias::renderer::{load_field_png, save_field_png};
use selection_bias::{
    BiasError, IntensityField, Layout, MaskConfig, PanelRenderer, PngPanelRenderer, RenderOptions,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Four panels in a row
    Strip,
    /// Two rows of two panels
    Grid,
}

impl From<LayoutArg> for Layout {
    fn from(l: LayoutArg) -> Self {
        match l {
            LayoutArg::Strip => Layout::Strip,
            LayoutArg::Grid => Layout::Grid,
        }
    }
}

/// Render a letter-shaped selection mask, apply it to a sample, and save
/// reality, model, mask, and estimate side by side.
#[derive(Debug, Parser)]
#[command(name = "selection-bias", version)]
struct Args {
    /// Field height in pixels
    #[arg(long, default_value_t = 400, allow_negative_numbers = true)]
    height: i64,

    /// Field width in pixels
    #[arg(long, default_value_t = 400, allow_negative_numbers = true)]
    width: i64,

    /// Character drawn as the mask
    #[arg(long, default_value_t = 'S')]
    letter: char,

    /// Font size as a fraction of the shorter side
    #[arg(long, default_value_t = 0.9)]
    size_ratio: f64,

    /// Mask values below this remove the sample under them
    #[arg(long, default_value_t = 0.5)]
    threshold: f64,

    /// Font file to try before the system fonts (repeatable)
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Grayscale PNG used as the reality panel (default: radial gradient)
    #[arg(long)]
    reality: Option<PathBuf>,

    /// Grayscale PNG used as the sample (default: the reality panel)
    #[arg(long)]
    sample: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LayoutArg::Strip)]
    layout: LayoutArg,

    /// Integer upscaling of every panel
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Output image
    #[arg(short, long, default_value = "selection_bias.png")]
    output: PathBuf,

    /// Also save the raw mask here
    #[arg(long)]
    mask_out: Option<PathBuf>,
}

fn load_or(
    path: Option<&PathBuf>,
    height: usize,
    width: usize,
    fallback: &IntensityField,
) -> Result<IntensityField, BiasError> {
    match path {
        Some(p) => {
            let field = load_field_png(p)?;
            info!("loaded {} as {}", p.display(), field.shape());
            field.resized(height, width)
        }
        None => Ok(fallback.clone()),
    }
}

fn run(args: Args) -> Result<(), BiasError> {
    if args.height <= 0 || args.width <= 0 {
        return Err(BiasError::InvalidDimension {
            height: args.height,
            width: args.width,
        });
    }
    let (height, width) = (args.height as usize, args.width as usize);

    let config = MaskConfig {
        letter: args.letter,
        size_ratio: args.size_ratio,
        threshold: args.threshold,
        font_paths: args.fonts,
    };

    let synthetic = synthetic_reality(height, width)?;
    let reality = load_or(args.reality.as_ref(), height, width, &synthetic)?;
    let sample = load_or(args.sample.as_ref(), height, width, &reality)?;

    info!(
        "masking {height}x{width} with {:?} at size ratio {} and threshold {}",
        config.letter, config.size_ratio, config.threshold
    );
    let out = pipeline::run(&config, reality, sample)?;
    info!(
        "glyph from {} ({} bounds, {}px font), offset {:?}",
        out.glyph.provenance, out.glyph.bounds, out.glyph.font_size, out.glyph.offset
    );
    let stats = &out.selection;
    info!(
        "masked {}/{} pixels ({:.1}%), stipples {} -> {}{}",
        stats.masked_pixels,
        stats.total_pixels,
        100.0 * stats.masked_fraction(),
        stats.stipples_before,
        stats.stipples_after,
        stats
            .retained_percent()
            .map(|p| format!(" ({p:.1}% retained)"))
            .unwrap_or_default()
    );

    if let Some(path) = &args.mask_out {
        save_field_png(out.panels.get(selection_bias::Panel::BiasMask), path)?;
        info!("mask written to {}", path.display());
    }

    let renderer = PngPanelRenderer::new(RenderOptions {
        scale: args.scale.max(1),
        ..RenderOptions::for_layout(args.layout.into())
    });
    renderer.render(&out.panels, &args.output)?;
    info!("panels written to {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
