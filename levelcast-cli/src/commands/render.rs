//! Implementation of the 'render' subcommand.
//!
//! Builds the configuration from flags and an optional JSON file, runs the
//! full pipeline with the installed ffmpeg/ffprobe and reports the result.

use crate::cli::RenderArgs;
use crate::commands::print_json;
use crate::config::render_config;

use anyhow::{Context, Result};
use levelcast_core::PipelineSummary;
use levelcast_core::utils::format_timestr;
use log::{debug, info};

/// Human-readable summary of a finished render.
pub fn format_summary(summary: &PipelineSummary) -> String {
    let mut lines = vec![
        format!("Output:     {}", summary.output_path.display()),
        format!("Audio:      {} ({})", summary.audio_path.display(), format_timestr(summary.audio.duration)),
        format!("Chunks:     {}", summary.chunk_count),
        format!("Frames:     {}", summary.frame_count),
        format!("Elapsed:    {:.1}s", summary.elapsed_secs),
    ];
    if let Some(dir) = &summary.work_dir {
        lines.push(format!("Work dir:   {}", dir.display()));
    }
    lines.join("\n")
}

pub fn run_render(args: RenderArgs) -> Result<()> {
    let config = render_config(&args)?;
    debug!("Render configuration: {:?}", config);
    info!(
        "Rendering {} -> {}",
        config.audio_path.display(),
        config.output_path.display()
    );

    let summary = levelcast_core::run_render(&config)
        .with_context(|| format!("Failed to render '{}'", config.audio_path.display()))?;

    if args.mapping.json {
        print_json(&summary)
    } else {
        println!("{}", format_summary(&summary));
        Ok(())
    }
}
