//! layerpath - toolpath generation for layer-based printing
//!
//! Usage:
//!   layerpath print <outline.svg> -c <config.yaml> -o <out.gcode>   G-code for every part
//!   layerpath layer <outline.svg> [layer options] -f svg|json       One ordered layer
//!   layerpath infill <outline.svg> --stage <stage> [infill options] Infill pipeline stages
//!   layerpath preview <outline.svg> -o <out.png> [layer options]    PNG of one layer

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use cli::common::{LayerArgs, OutputFormat, StageArg};

/// Shell, infill and travel-ordered toolpaths from a closed outline
#[derive(Parser, Debug)]
#[command(name = "layerpath")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate G-code for every part in a config file
    Print {
        /// Outline SVG ("-" for stdin)
        #[arg(value_name = "INPUT")]
        input: String,

        /// Print configuration (YAML or JSON)
        #[arg(short, long, value_name = "CONFIG")]
        config: PathBuf,

        /// Output G-code file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Which closed outline of the SVG to print
        #[arg(long, default_value = "0")]
        index: usize,
    },

    /// Build one ordered layer and write it as SVG or JSON
    Layer {
        #[arg(value_name = "INPUT")]
        input: String,

        #[command(flatten)]
        layer: LayerArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "svg")]
        format: OutputFormat,

        /// Draw pen-up travel moves (SVG only)
        #[arg(long)]
        travel: bool,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        index: usize,
    },

    /// Run the infill pipeline up to a stage and write the pattern as SVG
    Infill {
        #[arg(value_name = "INPUT")]
        input: String,

        /// Last stage to run
        #[arg(long, value_enum, default_value = "trimmed-field")]
        stage: StageArg,

        /// Infill angle in degrees
        #[arg(short, long, default_value = "0")]
        angle: f64,

        /// Row spacing
        #[arg(short, long, default_value = "1.0")]
        spacing: f64,

        #[arg(long, default_value = "0")]
        shift_x: f64,

        #[arg(long, default_value = "0")]
        shift_y: f64,

        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        index: usize,
    },

    /// Render one ordered layer to PNG
    Preview {
        #[arg(value_name = "INPUT")]
        input: String,

        #[command(flatten)]
        layer: LayerArgs,

        /// Output PNG file
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Image width in pixels
        #[arg(long, default_value = "1200")]
        width: u32,

        #[arg(long)]
        travel: bool,

        #[arg(long, default_value = "0")]
        index: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Print { input, config, output, index } => {
            cli::print::cmd_print(&input, &config, output.as_deref(), index)
        }
        Commands::Layer { input, layer, format, travel, output, index } => {
            cli::layer::cmd_layer(&input, &layer, format, travel, output.as_deref(), index)
        }
        Commands::Infill { input, stage, angle, spacing, shift_x, shift_y, output, index } => {
            let settings = cli::infill::InfillSettings { stage, angle, spacing, shift_x, shift_y };
            cli::infill::cmd_infill(&input, &settings, output.as_deref(), index)
        }
        Commands::Preview { input, layer, output, width, travel, index } => {
            cli::preview::cmd_preview(&input, &layer, &output, width, travel, index)
        }
    }
}
