// levelcast-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Levelcast: audio-level-driven animation renderer",
    long_about = "Measures an audio track's levels with ffmpeg and renders a video whose \
                  ball zoom and displacement jitter follow the music."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Write a timestamped log file into this directory.
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Renders a full video from an audio track and image assets
    Render(RenderArgs),
    /// Prints category statistics and the chunk layout of a levels log
    Analyze(AnalyzeArgs),
    /// Writes every chunk's sendcmd command streams without rendering
    Emit(EmitArgs),
}

/// Timing and mapping options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Optional: JSON configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG_JSON")]
    pub config: Option<PathBuf>,

    /// Frames per second of the measurement windows and output video
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Length of each render chunk in seconds
    #[arg(long, value_name = "SECONDS")]
    pub chunk_length: Option<f64>,

    /// Spread of the displacement jitter
    #[arg(long, value_name = "SCALE")]
    pub jitter_scale: Option<f64>,

    /// Seed for reproducible jitter
    #[arg(long, value_name = "SEED", env = "LEVELCAST_SEED")]
    pub seed: Option<u64>,

    /// Category timing the chunk splicer
    #[arg(long, value_name = "CATEGORY")]
    pub reference_category: Option<String>,

    /// Category driving the ball zoom
    #[arg(long, value_name = "CATEGORY")]
    pub zoom_category: Option<String>,

    /// Category driving the displacement jitter
    #[arg(long, value_name = "CATEGORY")]
    pub jitter_category: Option<String>,

    /// Print the result as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Audio track to visualise
    #[arg(short = 'a', long = "audio", value_name = "AUDIO")]
    pub audio: Option<PathBuf>,

    /// Full-frame background image
    #[arg(long, value_name = "IMAGE")]
    pub background: Option<PathBuf>,

    /// Ball image scaled by the music
    #[arg(long, value_name = "IMAGE")]
    pub ball: Option<PathBuf>,

    /// Cover art image
    #[arg(long, value_name = "IMAGE")]
    pub art: Option<PathBuf>,

    /// Optional: text file drawn as the title
    #[arg(long, value_name = "TEXT_FILE")]
    pub title: Option<PathBuf>,

    /// Output video file
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Optional: work directory (a temporary one next to the output by default)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Keep the temporary work directory after rendering
    #[arg(long, default_value_t = false)]
    pub keep_work_dir: bool,

    /// Output width in pixels
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Output height in pixels
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    #[command(flatten)]
    pub mapping: MappingArgs,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Levels log to analyse, or an audio file with --measure
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Measure INPUT as audio with ffmpeg first
    #[arg(long, default_value_t = false)]
    pub measure: bool,

    /// Optional: work directory for the measurement
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    #[command(flatten)]
    pub mapping: MappingArgs,
}

#[derive(Parser, Debug)]
pub struct EmitArgs {
    /// Levels log to map
    #[arg(required = true, value_name = "LEVELS_LOG")]
    pub levels_log: PathBuf,

    /// Directory receiving one chunk_NNNN directory per chunk
    #[arg(short = 'o', long = "output-dir", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub mapping: MappingArgs,
}
