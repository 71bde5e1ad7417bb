//! Utility functions for formatting times and paths.
//!
//! This module provides general-purpose helpers used throughout the
//! levelcast-core library: elapsed-time formatting for log output, ffmpeg
//! time strings and filter-graph-safe path escaping.

use std::path::Path;
use std::time::Duration;

/// Formats an elapsed wall-clock duration as "Xh Ym Zs".
#[must_use]
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

/// Formats seconds as an ffmpeg `H:M:S.fff` position (e.g., 3725.5 -> "1:2:5.500").
///
/// Negative inputs clamp to zero, since ffmpeg positions are never negative here.
#[must_use]
pub fn format_timestr(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds - hours * 3600.0) / 60.0).floor();
    let secs = seconds - hours * 3600.0 - minutes * 60.0;
    format!("{}:{}:{:.3}", hours as u64, minutes as u64, secs)
}

/// Escapes a path for use inside an ffmpeg filter graph option value.
///
/// Backslashes become forward slashes and colons are escaped, so Windows
/// drive letters survive the filter option parser. The result is meant to be
/// wrapped in single quotes, so embedded quotes close the quoted run, emit an
/// escaped quote and reopen it.
#[must_use]
pub fn filter_escape_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_format_timestr() {
        assert_eq!(format_timestr(0.0), "0:0:0.000");
        assert_eq!(format_timestr(59.5), "0:0:59.500");
        assert_eq!(format_timestr(3725.5), "1:2:5.500");
        assert_eq!(format_timestr(-4.0), "0:0:0.000");
    }

    #[test]
    fn test_filter_escape_path() {
        assert_eq!(
            filter_escape_path(&PathBuf::from("C:\\work\\levels.log")),
            "C\\:/work/levels.log"
        );
        assert_eq!(
            filter_escape_path(&PathBuf::from("/tmp/work/levels.log")),
            "/tmp/work/levels.log"
        );
    }

    #[test]
    fn test_filter_escape_path_quotes() {
        assert_eq!(
            filter_escape_path(&PathBuf::from("/music/it's live/cmd.txt")),
            "/music/it'\\''s live/cmd.txt"
        );
    }
}
