//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations. Every command works on the
//! session stored in the configured file store.

mod dna;
mod info;
mod raster;
mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::brush::MAX_BRUSH_SIZE;
use crate::config::{load_config, merge_cli_overrides, CanvasConfig, CliOverrides};
use crate::grid::Point;

use session::Session;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Pixel Canvas - 64x64 palette pixel art editor
#[derive(Parser)]
#[command(name = "pxc")]
#[command(about = "Pixel Canvas - edit 64x64 palette pixel art with undo/redo and DNA sharing")]
#[command(version)]
pub struct Cli {
    /// Path to canvas.toml (default: discovered from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the session (overrides storage.dir)
    #[arg(long, global = true)]
    pub session_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new blank session
    Init {
        /// Replace an existing session
        #[arg(long)]
        force: bool,
    },

    /// Paint one stroke
    Paint {
        /// Palette index to paint with (0-63)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=63))]
        color: u8,

        /// Brush size: paints a (2 * size + 1) square around each point
        #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=MAX_BRUSH_SIZE as i64))]
        size: u8,

        /// Points as "x,y", in stroke order
        #[arg(required = true)]
        points: Vec<Point>,
    },

    /// Revert the last stroke
    Undo,

    /// Re-apply the last undone stroke
    Redo,

    /// Blank the canvas and drop history
    Clear,

    /// Print the canvas
    Show {
        /// Print rows of palette indices and history state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the DNA of the canvas
    Dna,

    /// Replace the canvas with a DNA string
    LoadDna {
        /// DNA string (base64)
        dna: String,
    },

    /// Replace the canvas with a 64x64 PNG, JPEG or BMP
    Import {
        /// Image file
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save the canvas as PNG
    Export {
        /// Output file
        output: PathBuf,

        /// Upscale each cell to a square of export.upscale_factor pixels
        #[arg(long)]
        upscale: bool,

        /// Upscale by this factor instead of export.upscale_factor
        /// (implies --upscale)
        #[arg(long)]
        factor: Option<u32>,
    },

    /// Print the on-chain bit-tree payload of the canvas (or of a DNA string)
    Tree {
        /// DNA string to encode instead of the canvas
        #[arg(long)]
        dna: Option<String>,

        /// Write raw bytes here instead of printing base64
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the shape of a bit-tree payload and print its DNA
    VerifyTree {
        /// Base64 payload
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        payload: Option<String>,

        /// Read raw payload bytes from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List the palette
    Palette {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = CliOverrides {
        session_dir: cli.session_dir.clone(),
        upscale_factor: match &cli.command {
            Commands::Export { factor, .. } => *factor,
            _ => None,
        },
    };
    let config = match resolve_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let session = Session::new(&config);

    match cli.command {
        Commands::Init { force } => session::run_init(&session, force),
        Commands::Paint { color, size, points } => {
            session::run_paint(&session, color, size, &points)
        }
        Commands::Undo => session::run_undo(&session),
        Commands::Redo => session::run_redo(&session),
        Commands::Clear => session::run_clear(&session),
        Commands::Show { json } => session::run_show(&session, json),
        Commands::Dna => dna::run_dna(&session),
        Commands::LoadDna { dna } => dna::run_load_dna(&session, &dna),
        Commands::Import { input, json } => raster::run_import(&session, &input, json),
        Commands::Export { output, upscale, factor } => {
            let upscale = upscale || factor.is_some();
            raster::run_export(&session, &output, upscale, config.export.upscale_factor)
        }
        Commands::Tree { dna, output } => dna::run_tree(&session, dna.as_deref(), output.as_deref()),
        Commands::VerifyTree { payload, file } => {
            dna::run_verify_tree(payload.as_deref(), file.as_deref())
        }
        Commands::Palette { json } => info::run_palette(json),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

fn resolve_config(
    path: Option<&std::path::Path>,
    overrides: &CliOverrides,
) -> Result<CanvasConfig, ExitCode> {
    let mut config = load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    merge_cli_overrides(&mut config, overrides).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;
    Ok(config)
}
