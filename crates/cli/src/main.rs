#![deny(unsafe_code)]
//! CLI binary for headless energy-wave renders.
//!
//! Subcommands:
//! - `render` — mount the engine on an offscreen raster, run N frames, write PNG
//! - `info` — print the engine's parameters and field sources

mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use energy_wave::driver::{FrameDriver, HostEvent};
use energy_wave::field::SOURCES;
use energy_wave::EnergyWave;
use energy_wave_core::{Dimensions, Engine, EngineError, Seed, Srgb};
use energy_wave_raster::snapshot::write_png;
use energy_wave_raster::{pump, HeadlessHost};
use error::CliError;
use log::info;

const ENGINE_NAME: &str = "energy-wave";
const MAX_SIDE: f64 = 8192.0;
const MAX_DEVICE_PIXEL_RATIO: f64 = 4.0;
/// Backing pixels allowed in one render (8192 x 8192).
const MAX_BACKING_PIXELS: u64 = 1 << 26;

#[derive(Parser)]
#[command(name = "energy-wave", about = "Headless renders of the energy-wave animation")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the animation for N frames and write a PNG snapshot.
    Render {
        /// Surface width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 1280.0, value_parser = parse_side)]
        width: f64,

        /// Surface height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 720.0, value_parser = parse_side)]
        height: f64,

        /// Device pixel ratio; the PNG is `width * dpr` pixels wide.
        #[arg(long, default_value_t = 1.0, value_parser = parse_ratio)]
        dpr: f64,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 240, value_parser = clap::value_parser!(u64).range(1..))]
        frames: u64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Hold the pointer at `x,y` (CSS pixels) for the whole run.
        #[arg(long, value_parser = parse_point)]
        pointer: Option<[f64; 2]>,

        /// Background color as hex, or "transparent".
        #[arg(short, long, default_value = "#0b1120")]
        background: String,

        /// Replay a seed record written by `render --json`; overrides the
        /// size, ratio, frame, seed and pointer options.
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "energy-wave.png")]
        output: PathBuf,
    },
    /// Print the engine's internal parameters and field sources.
    Info,
}

fn parse_side(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v >= 1.0 && v <= MAX_SIDE {
        Ok(v)
    } else {
        Err(format!("must be between 1 and {MAX_SIDE}"))
    }
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 && v <= MAX_DEVICE_PIXEL_RATIO {
        Ok(v)
    } else {
        Err(format!("must be in (0, {MAX_DEVICE_PIXEL_RATIO}]"))
    }
}

fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite())
            .ok_or_else(|| format!("invalid coordinate {v:?}"))
    };
    Ok([coord(x)?, coord(y)?])
}

fn parse_background(s: &str) -> Result<Option<Srgb>, CliError> {
    if s.eq_ignore_ascii_case("transparent") {
        return Ok(None);
    }
    Ok(Some(Srgb::from_hex(s)?))
}

fn load_seed(path: &Path) -> Result<Seed, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    let seed: Seed = serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid seed file {}: {e}", path.display())))?;
    if seed.engine != ENGINE_NAME {
        return Err(CliError::Input(format!(
            "seed file is for engine {:?}, expected {ENGINE_NAME:?}",
            seed.engine
        )));
    }
    if seed.frames == 0 {
        return Err(CliError::Input("seed file has zero frames".into()));
    }
    Ok(seed)
}

/// Rejects sizes whose backing raster would exceed [`MAX_BACKING_PIXELS`].
fn check_backing_size(dimensions: Dimensions, device_pixel_ratio: f64) -> Result<(), CliError> {
    if dimensions.width > MAX_SIDE
        || dimensions.height > MAX_SIDE
        || !(device_pixel_ratio > 0.0 && device_pixel_ratio <= MAX_DEVICE_PIXEL_RATIO)
    {
        return Err(CliError::Engine(EngineError::InvalidDimensions));
    }
    let (w, h) = dimensions.backing_size(device_pixel_ratio);
    if u64::from(w) * u64::from(h) > MAX_BACKING_PIXELS {
        return Err(CliError::Engine(EngineError::InvalidDimensions));
    }
    Ok(())
}

/// Mounts on an offscreen host, holds the pointer, and runs every frame.
fn render_frames(seed: &Seed) -> Result<FrameDriver<HeadlessHost>, CliError> {
    let dimensions = seed.dimensions()?;
    check_backing_size(dimensions, seed.device_pixel_ratio)?;
    let host = HeadlessHost::new(dimensions, seed.device_pixel_ratio);
    let mut driver = FrameDriver::mount(host, seed.seed).ok_or_else(|| {
        CliError::Engine(EngineError::SurfaceUnavailable("offscreen mount failed".into()))
    })?;
    if let Some([x, y]) = seed.pointer {
        driver.handle_event(HostEvent::PointerMove {
            client_x: x,
            client_y: y,
        });
    }
    let ran = pump(&mut driver, seed.frames);
    if ran < seed.frames {
        return Err(CliError::Engine(EngineError::Scheduler(format!(
            "loop stopped after {ran} of {} frames",
            seed.frames
        ))));
    }
    Ok(driver)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Info => {
            let engine = EnergyWave::new(Dimensions::new(1280.0, 720.0)?, 0);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&engine.params())?);
            } else {
                let params = engine.wave_params();
                println!("Engine: {ENGINE_NAME}");
                println!("  time step: {} s/frame", params.time_step);
                println!("  particles: {}", params.particles.count);
                println!("  field lines: {}", params.field_lines.count);
                println!("Sources:");
                for source in &SOURCES {
                    println!(
                        "  {:<10} ({:.2}, {:.2})  strength {:.1}  {:?}",
                        source.name, source.x, source.y, source.strength, source.polarity
                    );
                }
            }
        }
        Command::Render {
            width,
            height,
            dpr,
            frames,
            seed,
            pointer,
            background,
            replay,
            output,
        } => {
            let background = parse_background(&background)?;
            let record = match replay {
                Some(path) => load_seed(&path)?,
                None => Seed {
                    device_pixel_ratio: dpr,
                    frames,
                    pointer,
                    ..Seed::new(ENGINE_NAME, width, height, seed)
                },
            };

            let driver = render_frames(&record)?;
            let raster = driver.host().raster();
            write_png(raster, background, &output)?;
            info!(
                "{} frames, {} of {} backing pixels painted",
                driver.engine().frame(),
                raster.painted_pixels(),
                raster.backing_width() * raster.backing_height()
            );

            if cli.json {
                let mut info = serde_json::to_value(&record)?;
                info["output"] = serde_json::json!(output.display().to_string());
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {ENGINE_NAME} ({}x{} @{}x, {} frames, seed {}) -> {}",
                    record.width,
                    record.height,
                    record.device_pixel_ratio,
                    record.frames,
                    record.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
