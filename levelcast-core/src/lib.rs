//! Core library for audio-level-driven animation rendering.
//!
//! An audio track is measured in one-frame windows, the resulting levels are
//! normalised, split into fixed-length chunks and mapped to per-frame renderer
//! parameters (a ball zoom and six displacement jitter channels). The
//! parameters are written as `sendcmd` command streams that drive an ffmpeg
//! render graph, one chunk at a time, and the rendered frames are muxed with
//! the original audio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use levelcast_core::config::CoreConfigBuilder;
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .audio_path(PathBuf::from("track.wav"))
//!     .background_path(PathBuf::from("bg.png"))
//!     .ball_path(PathBuf::from("circle.png"))
//!     .art_path(PathBuf::from("art.png"))
//!     .output_path(PathBuf::from("track.mp4"))
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let summary = levelcast_core::run_render(&config).unwrap();
//! println!("{} frames in {} chunks", summary.frame_count, summary.chunk_count);
//! ```
//!
//! The pure stages can also be driven directly:
//!
//! ```rust
//! use levelcast_core::levels::{PEAK_LEVEL, compute_statistics, parse_levels_str};
//! use levelcast_core::splicer::splice_chunks;
//!
//! let log = "frame:0 pts:0 pts_time:0\nlavfi.astats.Overall.Peak_level=-10\n\
//!            frame:1 pts:1 pts_time:0.5\nlavfi.astats.Overall.Peak_level=0\n";
//! let set = compute_statistics(parse_levels_str(log).unwrap()).unwrap();
//! let chunks = splice_chunks(&set, PEAK_LEVEL, 30.0).unwrap();
//! assert_eq!(chunks.len(), 1);
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod graphs;
pub mod levels;
pub mod mapping;
pub mod orchestrator;
pub mod progress;
pub mod splicer;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use levels::{CategorySet, ParsedLevels, TimeLevelPoint, compute_statistics, parse_levels_file};
pub use mapping::{ChannelBindings, FrameParameters, JitterCurve, ParameterMapper};
pub use orchestrator::{
    AnalysisReport, EmittedChunk, PipelineSummary, analyze_audio, analyze_levels_file,
    emit_command_streams, run_pipeline, run_render,
};
pub use splicer::{Chunk, splice_chunks};
pub use utils::format_timestr;
