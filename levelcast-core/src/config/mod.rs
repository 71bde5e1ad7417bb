//! Configuration structures and constants for the levelcast-core library.
//!
//! This module provides the configuration for a render run: input media,
//! output locations, timing (frame rate and chunk length), the categories that
//! drive each animation channel and the jitter curve's spread.

mod builder;

use crate::error::{CoreError, CoreResult};
use crate::levels::{MAX_LEVEL, PEAK_LEVEL};
use crate::mapping::{ChannelBindings, DEFAULT_JITTER_SCALE, JitterCurve};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use builder::CoreConfigBuilder;

// Default constants

/// Default output frame rate; also the measurement window rate.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Default chunk length in seconds.
pub const DEFAULT_CHUNK_LENGTH: f64 = 30.0;

/// Default output video width in pixels.
pub const DEFAULT_VIDEO_WIDTH: u32 = 1920;

/// Default output video height in pixels.
pub const DEFAULT_VIDEO_HEIGHT: u32 = 1080;

/// Tolerance when checking that a chunk holds a whole number of frames.
const FRAME_ALIGNMENT_EPSILON: f64 = 1e-6;

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

fn default_chunk_length() -> f64 {
    DEFAULT_CHUNK_LENGTH
}

fn default_jitter_scale() -> f64 {
    DEFAULT_JITTER_SCALE
}

fn default_reference_category() -> String {
    PEAK_LEVEL.to_string()
}

fn default_zoom_category() -> String {
    PEAK_LEVEL.to_string()
}

fn default_jitter_category() -> String {
    MAX_LEVEL.to_string()
}

fn default_video_width() -> u32 {
    DEFAULT_VIDEO_WIDTH
}

fn default_video_height() -> u32 {
    DEFAULT_VIDEO_HEIGHT
}

fn default_true() -> bool {
    true
}

/// Main configuration structure for a levelcast run.
///
/// Only the media paths and the output path are required; everything else
/// has a default. Instances are usually built with [`CoreConfigBuilder`] or
/// deserialised from a JSON file.
///
/// # Examples
///
/// ```rust,no_run
/// use levelcast_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .audio_path(PathBuf::from("audio.wav"))
///     .background_path(PathBuf::from("bg.png"))
///     .ball_path(PathBuf::from("circle.png"))
///     .art_path(PathBuf::from("art.png"))
///     .output_path(PathBuf::from("video.mp4"))
///     .chunk_length(30.0)
///     .seed(7)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Audio track to visualise
    pub audio_path: PathBuf,

    /// Full-frame background image
    pub background_path: PathBuf,

    /// Ball image scaled by the zoom curve
    pub ball_path: PathBuf,

    /// Cover art image
    pub art_path: PathBuf,

    /// Optional text file whose contents are drawn as a title
    #[serde(default)]
    pub title_path: Option<PathBuf>,

    /// Final muxed video file
    pub output_path: PathBuf,

    /// Directory for levels log, command streams and frames.
    /// A temporary directory next to the output is used when unset.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Keep the temporary work directory after the run
    #[serde(default)]
    pub keep_work_dir: bool,

    /// Output and measurement frame rate
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Length of each render chunk in seconds
    #[serde(default = "default_chunk_length")]
    pub chunk_length: f64,

    /// Spread of the jitter curve
    #[serde(default = "default_jitter_scale")]
    pub jitter_scale: f64,

    /// Seed for reproducible jitter; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Category whose timestamps time the chunk splicer
    #[serde(default = "default_reference_category")]
    pub reference_category: String,

    /// Category driving the zoom curve
    #[serde(default = "default_zoom_category")]
    pub zoom_category: String,

    /// Category driving the jitter curve
    #[serde(default = "default_jitter_category")]
    pub jitter_category: String,

    /// Output width in pixels
    #[serde(default = "default_video_width")]
    pub video_width: u32,

    /// Output height in pixels
    #[serde(default = "default_video_height")]
    pub video_height: u32,

    /// Show a progress bar while rendering chunks
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            audio_path: PathBuf::from("audio.wav"),
            background_path: PathBuf::from("bg.png"),
            ball_path: PathBuf::from("circle.png"),
            art_path: PathBuf::from("art.png"),
            title_path: None,
            output_path: PathBuf::from("output.mp4"),
            work_dir: None,
            keep_work_dir: false,
            frame_rate: DEFAULT_FRAME_RATE,
            chunk_length: DEFAULT_CHUNK_LENGTH,
            jitter_scale: DEFAULT_JITTER_SCALE,
            seed: None,
            reference_category: default_reference_category(),
            zoom_category: default_zoom_category(),
            jitter_category: default_jitter_category(),
            video_width: DEFAULT_VIDEO_WIDTH,
            video_height: DEFAULT_VIDEO_HEIGHT,
            show_progress: true,
        }
    }
}

impl CoreConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: CoreConfig = serde_json::from_str(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validates numeric ranges and timing consistency.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(CoreError::Config(format!(
                "frame rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.chunk_length.is_finite() && self.chunk_length > 0.0) {
            return Err(CoreError::Config(format!(
                "chunk length must be positive, got {}",
                self.chunk_length
            )));
        }
        let frames_per_chunk = self.chunk_length * self.frame_rate;
        if (frames_per_chunk - frames_per_chunk.round()).abs() > FRAME_ALIGNMENT_EPSILON {
            return Err(CoreError::Config(format!(
                "chunk length {}s at {} fps is {} frames; it must be a whole number",
                self.chunk_length, self.frame_rate, frames_per_chunk
            )));
        }
        if !(self.jitter_scale.is_finite() && self.jitter_scale >= 0.0) {
            return Err(CoreError::Config(format!(
                "jitter scale must be non-negative, got {}",
                self.jitter_scale
            )));
        }
        if self.video_width == 0 || self.video_height == 0 {
            return Err(CoreError::Config(format!(
                "video size must be positive, got {}x{}",
                self.video_width, self.video_height
            )));
        }
        for (label, name) in [
            ("reference", &self.reference_category),
            ("zoom", &self.zoom_category),
            ("jitter", &self.jitter_category),
        ] {
            if name.trim().is_empty() {
                return Err(CoreError::Config(format!("{label} category name is empty")));
            }
        }
        Ok(())
    }

    /// Frames in one full chunk.
    pub fn frames_per_chunk(&self) -> u64 {
        (self.chunk_length * self.frame_rate).round() as u64
    }

    pub fn channel_bindings(&self) -> ChannelBindings {
        ChannelBindings {
            zoom_category: self.zoom_category.clone(),
            jitter_category: self.jitter_category.clone(),
        }
    }

    pub fn jitter_curve(&self) -> JitterCurve {
        JitterCurve::new(self.jitter_scale)
    }
}
