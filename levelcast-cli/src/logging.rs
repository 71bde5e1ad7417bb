// ============================================================================
// levelcast-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and file logging for the CLI
//
// With `--log-dir`, log4rs (via levelcast-core) writes a timestamped log
// file per run and mirrors it to stderr. Otherwise env_logger logs to stderr
// and honours RUST_LOG:
// - RUST_LOG=info (default): pipeline stages
// - RUST_LOG=debug: per-chunk and per-command detail (same as --verbose)
//
// AI-ASSISTANT-INFO: Logging initialisation for the CLI

use anyhow::Result;
use levelcast_core::file_logging::{log_file_name, setup_logging};
use log::LevelFilter;
use std::path::{Path, PathBuf};

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialises logging for one run of `action`.
///
/// Returns the log file path when file logging is enabled.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>, action: &str) -> Result<Option<PathBuf>> {
    let level = level_for(verbose);
    match log_dir {
        Some(dir) => {
            let log_file = dir.join(log_file_name(action));
            setup_logging(&log_file, level, true)?;
            log::debug!("Logging to {}", log_file.display());
            Ok(Some(log_file))
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .format_timestamp_secs()
                .try_init()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_selects_debug() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
