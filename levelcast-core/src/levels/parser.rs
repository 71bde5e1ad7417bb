//! Parser for `ametadata=mode=print` level logs.
//!
//! A log looks like:
//!
//! ```text
//! frame:11059 pts:8127568 pts_time:184.298594
//! lavfi.astats.Overall.Min_level=-0.000001
//! lavfi.astats.Overall.Peak_level=-inf
//! ```

use super::{ParsedLevels, TimeLevelPoint};
use crate::error::{CoreResult, malformed};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const PTS_TIME_TOKEN: &str = "pts_time:";
const FRAME_TOKEN: &str = "frame:";

enum LogLine<'a> {
    FrameMarker(&'a str),
    Measurement { key: &'a str, value: &'a str },
    Other,
}

fn classify_line(line: &str) -> LogLine<'_> {
    if line.contains(FRAME_TOKEN) {
        if let Some(pos) = line.find(PTS_TIME_TOKEN) {
            let rest = &line[pos + PTS_TIME_TOKEN.len()..];
            let end = rest
                .find(|c: char| c.is_whitespace())
                .unwrap_or(rest.len());
            return LogLine::FrameMarker(&rest[..end]);
        }
    }

    match line.split_once('=') {
        Some((key, value)) => LogLine::Measurement {
            key: key.trim(),
            value: value.trim(),
        },
        None => LogLine::Other,
    }
}

/// Parses a level value. Accepts fixed and scientific notation as well as
/// `inf`/`-inf`; rejects NaN.
fn parse_level_value(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parses a complete levels log from any buffered reader.
pub fn parse_levels<R: BufRead>(reader: R) -> CoreResult<ParsedLevels> {
    let mut cursor: Option<f64> = None;
    let mut series: BTreeMap<String, Vec<TimeLevelPoint>> = BTreeMap::new();
    let mut markers = 0usize;
    let mut ignored = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match classify_line(line) {
            LogLine::FrameMarker(pts) => {
                let time = pts
                    .parse::<f64>()
                    .ok()
                    .filter(|t| t.is_finite())
                    .ok_or_else(|| malformed(line_no, format!("invalid pts_time '{pts}'")))?;
                cursor = Some(time);
                markers += 1;
            }
            LogLine::Measurement { key, value } => {
                if key.is_empty() {
                    return Err(malformed(line_no, "measurement without a category name"));
                }
                let time = cursor.ok_or_else(|| {
                    malformed(
                        line_no,
                        format!("measurement '{key}' appears before any frame marker"),
                    )
                })?;
                let level = parse_level_value(value).ok_or_else(|| {
                    malformed(line_no, format!("invalid value '{value}' for '{key}'"))
                })?;
                series
                    .entry(key.to_string())
                    .or_default()
                    .push(TimeLevelPoint::new(time, level));
            }
            LogLine::Other => {
                ignored += 1;
                log::trace!("Ignoring levels log line {line_no}: {line}");
            }
        }
    }

    for points in series.values_mut() {
        // Stable, so samples sharing a timestamp keep their emission order.
        points.sort_by(|a, b| a.time_point.total_cmp(&b.time_point));
    }

    log::debug!(
        "Parsed levels log: {} frame markers, {} categories, {} ignored lines",
        markers,
        series.len(),
        ignored
    );

    Ok(ParsedLevels { series })
}

/// Parses a levels log held in memory.
pub fn parse_levels_str(text: &str) -> CoreResult<ParsedLevels> {
    parse_levels(text.as_bytes())
}

/// Parses a levels log file written by the measurement engine.
pub fn parse_levels_file(path: &Path) -> CoreResult<ParsedLevels> {
    log::debug!("Parsing levels log {}", path.display());
    let file = File::open(path)?;
    parse_levels(BufReader::new(file))
}
