//! Implementation of the 'emit' subcommand.

use crate::cli::EmitArgs;
use crate::commands::print_json;
use crate::config::mapping_config;

use anyhow::{Context, Result};
use levelcast_core::emit_command_streams;

pub fn run_emit(args: EmitArgs) -> Result<()> {
    let config = mapping_config(&args.mapping)?;
    let emitted = emit_command_streams(&args.levels_log, &args.output_dir, &config)
        .with_context(|| format!("Failed to emit command streams for '{}'", args.levels_log.display()))?;

    if args.mapping.json {
        return print_json(&emitted);
    }
    for chunk in &emitted {
        println!(
            "chunk {:>4}  offset {:>8.3}s  {:>6} frames  {}",
            chunk.index,
            chunk.time_offset,
            chunk.frames,
            chunk.dir.display()
        );
    }
    Ok(())
}
