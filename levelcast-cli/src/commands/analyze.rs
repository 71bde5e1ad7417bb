//! Implementation of the 'analyze' subcommand.
//!
//! Reads an existing levels log (or measures an audio file first) and prints
//! per-category statistics and the chunk layout the splicer would produce.

use crate::cli::AnalyzeArgs;
use crate::commands::print_json;
use crate::config::mapping_config;

use anyhow::{Context, Result};
use levelcast_core::config::CoreConfigBuilder;
use levelcast_core::external::{SidecarSpawner, check_dependency};
use levelcast_core::utils::format_timestr;
use levelcast_core::{AnalysisReport, analyze_audio, analyze_levels_file};

/// Human-readable rendering of an analysis report.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::from("Categories:\n");
    for category in &report.categories {
        out.push_str(&format!(
            "  {:<40} {:>8} samples  min {:>10.3}  max {:>10.3}  range {:.3}..{:.3}\n",
            category.name,
            category.samples,
            category.min_value,
            category.max_value,
            category.normal_min,
            category.normal_max
        ));
    }
    out.push_str(&format!(
        "Chunks ({}s, {} frames each, timed by {}):\n",
        report.chunk_length, report.frames_per_chunk, report.reference_category
    ));
    for chunk in &report.chunks {
        out.push_str(&format!(
            "  #{:<4} from {:<12} points {}..={} ({})\n",
            chunk.index,
            format_timestr(chunk.time_offset),
            chunk.from_i,
            chunk.to_i,
            chunk.points
        ));
    }
    out
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = mapping_config(&args.mapping)?;

    let report = if args.measure {
        check_dependency("ffmpeg")?;
        let mut builder = CoreConfigBuilder::from_config(config).audio_path(args.input.clone());
        if let Some(dir) = &args.work_dir {
            builder = builder.work_dir(dir.clone());
        }
        let config = builder.build()?;
        analyze_audio(&SidecarSpawner, &config)
            .with_context(|| format!("Failed to measure '{}'", args.input.display()))?
    } else {
        analyze_levels_file(&args.input, &config)
            .with_context(|| format!("Failed to analyse '{}'", args.input.display()))?
    };

    if args.mapping.json {
        print_json(&report)
    } else {
        print!("{}", format_report(&report));
        Ok(())
    }
}
