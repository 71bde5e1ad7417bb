// ============================================================================
// levelcast-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig with defaults for every optional field.
// `build()` validates the result, so a built configuration is always usable.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

use std::path::PathBuf;

use super::CoreConfig;
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from JSON.
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    pub fn audio_path(mut self, path: PathBuf) -> Self {
        self.config.audio_path = path;
        self
    }

    pub fn background_path(mut self, path: PathBuf) -> Self {
        self.config.background_path = path;
        self
    }

    pub fn ball_path(mut self, path: PathBuf) -> Self {
        self.config.ball_path = path;
        self
    }

    pub fn art_path(mut self, path: PathBuf) -> Self {
        self.config.art_path = path;
        self
    }

    pub fn title_path(mut self, path: PathBuf) -> Self {
        self.config.title_path = Some(path);
        self
    }

    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.config.output_path = path;
        self
    }

    pub fn work_dir(mut self, path: PathBuf) -> Self {
        self.config.work_dir = Some(path);
        self
    }

    pub fn keep_work_dir(mut self, keep: bool) -> Self {
        self.config.keep_work_dir = keep;
        self
    }

    pub fn frame_rate(mut self, frame_rate: f64) -> Self {
        self.config.frame_rate = frame_rate;
        self
    }

    /// Sets the chunk length in seconds.
    pub fn chunk_length(mut self, seconds: f64) -> Self {
        self.config.chunk_length = seconds;
        self
    }

    pub fn jitter_scale(mut self, scale: f64) -> Self {
        self.config.jitter_scale = scale;
        self
    }

    /// Makes jitter reproducible across runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn reference_category(mut self, name: impl Into<String>) -> Self {
        self.config.reference_category = name.into();
        self
    }

    pub fn zoom_category(mut self, name: impl Into<String>) -> Self {
        self.config.zoom_category = name.into();
        self
    }

    pub fn jitter_category(mut self, name: impl Into<String>) -> Self {
        self.config.jitter_category = name.into();
        self
    }

    pub fn video_size(mut self, width: u32, height: u32) -> Self {
        self.config.video_width = width;
        self.config.video_height = height;
        self
    }

    pub fn video_width(mut self, width: u32) -> Self {
        self.config.video_width = width;
        self
    }

    pub fn video_height(mut self, height: u32) -> Self {
        self.config.video_height = height;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_builder_sets_fields() {
        let config = CoreConfigBuilder::new()
            .audio_path(PathBuf::from("song.wav"))
            .output_path(PathBuf::from("song.mp4"))
            .title_path(PathBuf::from("title.txt"))
            .frame_rate(30.0)
            .chunk_length(10.0)
            .seed(11)
            .video_size(1280, 720)
            .build()
            .unwrap();

        assert_eq!(config.audio_path, PathBuf::from("song.wav"));
        assert_eq!(config.title_path, Some(PathBuf::from("title.txt")));
        assert_eq!(config.frames_per_chunk(), 300);
        assert_eq!(config.seed, Some(11));
        assert_eq!((config.video_width, config.video_height), (1280, 720));
    }

    #[test]
    fn test_builder_rejects_invalid_timing() {
        let err = CoreConfigBuilder::new()
            .frame_rate(60.0)
            .chunk_length(0.01)
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
