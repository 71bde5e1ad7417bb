// levelcast-cli/src/config.rs
//
// Builds a CoreConfig from an optional JSON file plus command-line overrides.
// Flags always win over file values; both fall back to the core defaults.

use crate::cli::{MappingArgs, RenderArgs};
use anyhow::{Context, Result};
use levelcast_core::config::{CoreConfig, CoreConfigBuilder};

/// Loads the `--config` file when given, otherwise the core defaults.
pub fn base_config(args: &MappingArgs) -> Result<CoreConfig> {
    match &args.config {
        Some(path) => CoreConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display())),
        None => Ok(CoreConfig::default()),
    }
}

/// Applies the shared mapping flags on top of `builder`.
pub fn apply_mapping(mut builder: CoreConfigBuilder, args: &MappingArgs) -> CoreConfigBuilder {
    if let Some(fps) = args.fps {
        builder = builder.frame_rate(fps);
    }
    if let Some(length) = args.chunk_length {
        builder = builder.chunk_length(length);
    }
    if let Some(scale) = args.jitter_scale {
        builder = builder.jitter_scale(scale);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(name) = &args.reference_category {
        builder = builder.reference_category(name.as_str());
    }
    if let Some(name) = &args.zoom_category {
        builder = builder.zoom_category(name.as_str());
    }
    if let Some(name) = &args.jitter_category {
        builder = builder.jitter_category(name.as_str());
    }
    builder
}

/// Configuration for commands that only need timing and mapping options.
pub fn mapping_config(args: &MappingArgs) -> Result<CoreConfig> {
    let builder = apply_mapping(CoreConfigBuilder::from_config(base_config(args)?), args);
    Ok(builder.build()?)
}

/// Configuration for `render`.
pub fn render_config(args: &RenderArgs) -> Result<CoreConfig> {
    let base = base_config(&args.mapping)?;
    let from_file = args.mapping.config.is_some();
    let mut builder = apply_mapping(CoreConfigBuilder::from_config(base), &args.mapping);

    // Without a config file every input must come from the command line.
    let required = [
        ("--audio", args.audio.is_some()),
        ("--background", args.background.is_some()),
        ("--ball", args.ball.is_some()),
        ("--art", args.art.is_some()),
        ("--output", args.output.is_some()),
    ];
    if !from_file {
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, given)| !given)
            .map(|(flag, _)| *flag)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required arguments without --config: {}",
                missing.join(", ")
            );
        }
    }

    if let Some(path) = &args.audio {
        builder = builder.audio_path(path.clone());
    }
    if let Some(path) = &args.background {
        builder = builder.background_path(path.clone());
    }
    if let Some(path) = &args.ball {
        builder = builder.ball_path(path.clone());
    }
    if let Some(path) = &args.art {
        builder = builder.art_path(path.clone());
    }
    if let Some(path) = &args.title {
        builder = builder.title_path(path.clone());
    }
    if let Some(path) = &args.output {
        builder = builder.output_path(path.clone());
    }
    if let Some(path) = &args.work_dir {
        builder = builder.work_dir(path.clone());
    }
    if args.keep_work_dir {
        builder = builder.keep_work_dir(true);
    }
    if args.no_progress || args.mapping.json {
        builder = builder.show_progress(false);
    }
    if let Some(width) = args.width {
        builder = builder.video_width(width);
    }
    if let Some(height) = args.height {
        builder = builder.video_height(height);
    }

    Ok(builder.build()?)
}
