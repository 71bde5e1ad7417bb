//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Measures the audio and renders the full video.
pub mod render;

/// Prints category statistics and the chunk layout of a levels log.
pub mod analyze;

/// Writes command streams for every chunk without rendering.
pub mod emit;

use anyhow::Result;
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
