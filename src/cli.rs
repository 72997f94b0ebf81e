// ============================================================================
// GlassMap CLI — headless displacement-map generation
// ============================================================================
//
// Usage examples:
//   glassmap --shape circle --size 420 --bezel 0.3 --thickness 50 -o glass.png
//   glassmap --shape pill --width 800 --height 80 -o header.png --svg-filter header.svg
//   glassmap --preset hero.json -o hero.png --verbose
//   glassmap --shape circle --size 256 --save-preset small.json
//
// All processing runs synchronously; only the pixel loop fans out across
// rayon worker threads.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{encode_and_write, write_svg_filter};
use crate::ops::geometry::ShapeGeometry;
use crate::ops::profile::OpticalProfile;
use crate::ops::raster::{DEFAULT_NORMALIZATION_FACTOR, Normalization, rasterize};
use crate::preset::{GlassPreset, ShapeParams, load_preset, save_preset};
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// GlassMap headless displacement-map generator.
///
/// Synthesize "liquid glass" refraction maps for feDisplacementMap-style
/// compositing filters — no GUI, no browser.
#[derive(Parser, Debug)]
#[command(
    name = "glassmap",
    about = "Liquid-glass displacement map generator",
    long_about = "Generate 2-channel vector-displacement PNGs (R = x, G = y, 128 = rest)\n\
                  for a circle or a rounded-rectangle pill, plus an optional ready-to-use\n\
                  SVG filter wrapper.\n\n\
                  Example:\n  \
                  glassmap --shape circle --size 420 --bezel 0.3 --thickness 50 -o glass.png\n  \
                  glassmap --shape pill --width 800 --height 80 --svg-filter header.svg"
)]
pub struct CliArgs {
    /// Shape to rasterize: circle or pill (rounded rectangle).
    #[arg(short, long, value_name = "SHAPE")]
    pub shape: Option<String>,

    /// Circle output size in pixels (square image).
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Circle radius in pixels. Defaults to half the output size.
    #[arg(long, value_name = "PX")]
    pub radius: Option<f32>,

    /// Pill output width in pixels.
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Pill output height in pixels.
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Pill corner radius in pixels. Defaults to half the height.
    #[arg(long, value_name = "PX")]
    pub corner_radius: Option<f32>,

    /// Bezel width as a fraction of the interior radius (0-1).
    #[arg(short, long, value_name = "FRAC")]
    pub bezel: Option<f32>,

    /// Glass thickness in pixels.
    #[arg(short, long, value_name = "PX")]
    pub thickness: Option<f32>,

    /// Profile sample count (>= 2). 127 pairs naturally with 8-bit channels.
    #[arg(long, value_name = "N")]
    pub samples: Option<usize>,

    /// Normalization strategy: fixed or profile-max.
    #[arg(short, long, default_value = "fixed", value_name = "STRATEGY")]
    pub normalize: String,

    /// Divisor for the fixed strategy.
    #[arg(long, default_value_t = DEFAULT_NORMALIZATION_FACTOR, value_name = "N")]
    pub norm_factor: f32,

    /// feDisplacementMap scale recorded in the SVG filter wrapper.
    #[arg(long, value_name = "N")]
    pub scale: Option<f32>,

    /// Output PNG path (default: glassmap.png).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write a self-contained SVG filter document here.
    #[arg(long, value_name = "FILE.svg")]
    pub svg_filter: Option<PathBuf>,

    /// Filter id used inside the SVG document.
    #[arg(long, default_value = "liquidGlassFilter", value_name = "ID")]
    pub filter_id: String,

    /// Load parameters from a preset JSON; explicit flags still win.
    #[arg(short, long, value_name = "FILE.json")]
    pub preset: Option<PathBuf>,

    /// Write the effective parameters to a preset JSON and exit.
    #[arg(long, value_name = "FILE.json")]
    pub save_preset: Option<PathBuf>,

    /// Print timing and max-displacement diagnostics.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the generator and return an OS exit code:
/// `0` on success, `1` on any failure.
pub fn run(args: CliArgs) -> ExitCode {
    match run_inner(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            log_err!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(), String> {
    let preset = resolve_params(args)?;

    if let Some(path) = &args.save_preset {
        save_preset(&preset, path).map_err(|e| {
            format!("could not write preset '{}': {}", path.display(), e)
        })?;
        println!("→ {}", path.display());
        log_info!("saved preset to {}", path.display());
        return Ok(());
    }

    generate(&preset, args)
}

// ============================================================================
// Parameter resolution — preset file, then explicit flag overrides
// ============================================================================

fn resolve_params(args: &CliArgs) -> Result<GlassPreset, String> {
    let mut preset = match &args.preset {
        Some(path) => load_preset(path)
            .map_err(|e| format!("could not read preset '{}': {}", path.display(), e))?,
        None => match args.shape.as_deref() {
            Some("pill") | Some("rounded-rect") => GlassPreset::default_pill(),
            _ => GlassPreset::default(),
        },
    };

    if let Some(name) = args.shape.as_deref() {
        preset.shape = match name {
            "circle" => ShapeParams::Circle {
                size: args.size.unwrap_or(420),
                radius: args.radius,
            },
            "pill" | "rounded-rect" => ShapeParams::Pill {
                width: args.width.unwrap_or(800),
                height: args.height.unwrap_or(80),
                corner_radius: args.corner_radius,
            },
            other => {
                return Err(format!(
                    "unknown shape '{}' (expected circle or pill)",
                    other
                ));
            }
        };
    } else {
        // No shape switch: apply any dimension flags to the preset's shape
        match &mut preset.shape {
            ShapeParams::Circle { size, radius } => {
                if let Some(s) = args.size {
                    *size = s;
                }
                if args.radius.is_some() {
                    *radius = args.radius;
                }
            }
            ShapeParams::Pill {
                width,
                height,
                corner_radius,
            } => {
                if let Some(w) = args.width {
                    *width = w;
                }
                if let Some(h) = args.height {
                    *height = h;
                }
                if args.corner_radius.is_some() {
                    *corner_radius = args.corner_radius;
                }
            }
        }
    }

    if let Some(samples) = args.samples {
        preset.samples = samples;
    }
    if let Some(bezel) = args.bezel {
        preset.bezel_width = bezel;
    }
    if let Some(thickness) = args.thickness {
        preset.glass_thickness = thickness;
    }
    if let Some(scale) = args.scale {
        preset.scale = scale;
    }

    if preset.glass_thickness > 1000.0 {
        eprintln!(
            "warning: thickness {} is far beyond the usual 0-1000 range.",
            preset.glass_thickness
        );
    }

    Ok(preset)
}

fn parse_normalization(name: &str, factor: f32) -> Result<Normalization, String> {
    match name.to_lowercase().as_str() {
        "fixed" => Ok(Normalization::Fixed(factor)),
        "profile-max" | "profilemax" => Ok(Normalization::ProfileMax),
        other => Err(format!(
            "unknown normalization '{}' (expected fixed or profile-max)",
            other
        )),
    }
}

// ============================================================================
// Generation pipeline
// ============================================================================

fn generate(preset: &GlassPreset, args: &CliArgs) -> Result<(), String> {
    let normalization = parse_normalization(&args.normalize, args.norm_factor)?;

    // -- Step 1: optical profile -----------------------------------------
    let profile_start = Instant::now();
    let profile =
        OpticalProfile::generate(preset.samples, preset.bezel_width, preset.glass_thickness)
            .map_err(|e| format!("invalid parameters: {}", e))?;
    let profile_ms = profile_start.elapsed().as_secs_f64() * 1000.0;

    // -- Step 2: rasterize -----------------------------------------------
    let geometry = match preset.shape {
        ShapeParams::Circle { size, radius } => {
            ShapeGeometry::circle(radius.unwrap_or(size as f32 / 2.0))
        }
        ShapeParams::Pill {
            width,
            height,
            corner_radius,
        } => ShapeGeometry::rounded_rect(
            width as f32,
            height as f32,
            corner_radius.unwrap_or(height as f32 / 2.0),
        ),
    }
    .map_err(|e| format!("invalid geometry: {}", e))?;

    let raster_start = Instant::now();
    let (out_w, out_h) = preset.shape.output_size();
    let image = rasterize(&profile, geometry, out_w, out_h, normalization)
        .map_err(|e| format!("invalid geometry: {}", e))?;
    let raster_ms = raster_start.elapsed().as_secs_f64() * 1000.0;

    // -- Step 3: write ---------------------------------------------------
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("glassmap.png"));
    encode_and_write(&image, &output).map_err(|e| format!("save failed: {}", e))?;

    if let Some(svg_path) = &args.svg_filter {
        write_svg_filter(&image, svg_path, &args.filter_id, preset.scale)
            .map_err(|e| format!("SVG filter save failed: {}", e))?;
        if args.verbose {
            println!("→ {}", svg_path.display());
        }
    }

    log_info!(
        "generated {}x{} map ({:?}, bezel {}, thickness {}) to {}",
        out_w,
        out_h,
        normalization,
        preset.bezel_width,
        preset.glass_thickness,
        output.display()
    );

    if args.verbose {
        println!(
            "profile: {} samples in {:.1}ms, max displacement {:.2}px",
            profile.len(),
            profile_ms,
            profile.max_magnitude()
        );
        println!("raster:  {}x{} in {:.1}ms", out_w, out_h, raster_ms);
        println!("→ {}", output.display());
    }

    Ok(())
}
