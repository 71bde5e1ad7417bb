//! `sendcmd` command stream emission.
//!
//! Each frame becomes one line per channel group:
//!
//! ```text
//! 0.0166 scale@b width '0.75*in_w', scale@b height '0.75*in_h';
//! ```
//!
//! Timestamps are seconds relative to the chunk start. Directives always come
//! in the same order: zoom width, zoom height, then x r/g/b and y r/g/b.

use crate::error::CoreResult;
use crate::mapping::FrameParameters;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Filter instance names the render graph exposes to `sendcmd`.
pub const BALL_TARGET: &str = "scale@b";
pub const DISPLACE_X_TARGET: &str = "lut@dx";
pub const DISPLACE_Y_TARGET: &str = "lut@dy";

const SEPARATOR: &str = ", ";
const TERMINATOR: char = ';';

/// One renderer command: `<target> <param> '<value>*<base>'`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub target: &'static str,
    pub param: &'static str,
    pub value: f64,
    pub base: &'static str,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}*{}'", self.target, self.param, self.value, self.base)
    }
}

/// Output channel groups; each is written to its own stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    All,
    Ball,
    DisplaceX,
    DisplaceY,
}

impl ChannelGroup {
    pub const ALL_GROUPS: [ChannelGroup; 4] = [
        ChannelGroup::All,
        ChannelGroup::Ball,
        ChannelGroup::DisplaceX,
        ChannelGroup::DisplaceY,
    ];

    /// File name of the group's stream inside a chunk directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ChannelGroup::All => "sendcmd_all.txt",
            ChannelGroup::Ball => "sendcmd_b.txt",
            ChannelGroup::DisplaceX => "sendcmd_dx.txt",
            ChannelGroup::DisplaceY => "sendcmd_dy.txt",
        }
    }

    /// Range of a frame's directive list this group carries.
    fn directive_range(self) -> std::ops::Range<usize> {
        match self {
            ChannelGroup::All => 0..8,
            ChannelGroup::Ball => 0..2,
            ChannelGroup::DisplaceX => 2..5,
            ChannelGroup::DisplaceY => 5..8,
        }
    }
}

/// All eight directives of a frame in their fixed order.
pub fn frame_directives(frame: &FrameParameters) -> [Directive; 8] {
    let d = |target, param, value, base| Directive {
        target,
        param,
        value,
        base,
    };
    [
        d(BALL_TARGET, "width", frame.zoom, "in_w"),
        d(BALL_TARGET, "height", frame.zoom, "in_h"),
        d(DISPLACE_X_TARGET, "r", frame.displace_x[0], "255"),
        d(DISPLACE_X_TARGET, "g", frame.displace_x[1], "255"),
        d(DISPLACE_X_TARGET, "b", frame.displace_x[2], "255"),
        d(DISPLACE_Y_TARGET, "r", frame.displace_y[0], "255"),
        d(DISPLACE_Y_TARGET, "g", frame.displace_y[1], "255"),
        d(DISPLACE_Y_TARGET, "b", frame.displace_y[2], "255"),
    ]
}

/// Formats one record of `group` for `frame`, without the trailing newline.
pub fn format_record(frame: &FrameParameters, group: ChannelGroup) -> String {
    let directives = frame_directives(frame);
    let body = directives[group.directive_range()]
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    format!("{} {}{}", frame.time, body, TERMINATOR)
}

/// Writes one record per frame of `group` to `writer`.
pub fn write_stream<W: Write>(
    writer: &mut W,
    frames: &[FrameParameters],
    group: ChannelGroup,
) -> CoreResult<()> {
    for frame in frames {
        writeln!(writer, "{}", format_record(frame, group))?;
    }
    Ok(())
}

/// Renders a whole stream into memory.
pub fn render_stream(frames: &[FrameParameters], group: ChannelGroup) -> String {
    frames
        .iter()
        .map(|frame| format_record(frame, group) + "\n")
        .collect()
}

/// Paths of the stream files written for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStreamFiles {
    pub all: PathBuf,
    pub ball: PathBuf,
    pub displace_x: PathBuf,
    pub displace_y: PathBuf,
}

impl CommandStreamFiles {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            all: dir.join(ChannelGroup::All.file_name()),
            ball: dir.join(ChannelGroup::Ball.file_name()),
            displace_x: dir.join(ChannelGroup::DisplaceX.file_name()),
            displace_y: dir.join(ChannelGroup::DisplaceY.file_name()),
        }
    }

    pub fn path(&self, group: ChannelGroup) -> &Path {
        match group {
            ChannelGroup::All => &self.all,
            ChannelGroup::Ball => &self.ball,
            ChannelGroup::DisplaceX => &self.displace_x,
            ChannelGroup::DisplaceY => &self.displace_y,
        }
    }
}

/// Writes every channel group's stream for `frames` into `dir`.
pub fn write_command_streams(frames: &[FrameParameters], dir: &Path) -> CoreResult<CommandStreamFiles> {
    std::fs::create_dir_all(dir)?;
    let files = CommandStreamFiles::in_dir(dir);

    for group in ChannelGroup::ALL_GROUPS {
        let mut writer = BufWriter::new(File::create(files.path(group))?);
        write_stream(&mut writer, frames, group)?;
        writer.flush()?;
    }

    log::debug!(
        "Wrote {} command records per stream to {}",
        frames.len(),
        dir.display()
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: f64) -> FrameParameters {
        FrameParameters {
            time,
            zoom: 0.75,
            displace_x: [0.5, 0.51, 0.49],
            displace_y: [0.45, 0.55, 0.5],
        }
    }

    #[test]
    fn test_ball_record_syntax() {
        assert_eq!(
            format_record(&frame(0.25), ChannelGroup::Ball),
            "0.25 scale@b width '0.75*in_w', scale@b height '0.75*in_h';"
        );
    }

    #[test]
    fn test_displace_records() {
        assert_eq!(
            format_record(&frame(1.0), ChannelGroup::DisplaceX),
            "1 lut@dx r '0.5*255', lut@dx g '0.51*255', lut@dx b '0.49*255';"
        );
        assert_eq!(
            format_record(&frame(1.0), ChannelGroup::DisplaceY),
            "1 lut@dy r '0.45*255', lut@dy g '0.55*255', lut@dy b '0.5*255';"
        );
    }

    #[test]
    fn test_all_group_orders_every_directive() {
        let record = format_record(&frame(0.0), ChannelGroup::All);
        let order: Vec<String> = record
            .trim_end_matches(';')
            .splitn(2, ' ')
            .nth(1)
            .unwrap()
            .split(", ")
            .map(|d| d.split(' ').take(2).collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(
            order,
            vec![
                "scale@b width",
                "scale@b height",
                "lut@dx r",
                "lut@dx g",
                "lut@dx b",
                "lut@dy r",
                "lut@dy g",
                "lut@dy b",
            ]
        );
    }

    #[test]
    fn test_stream_has_one_increasing_record_per_frame() {
        let frames: Vec<FrameParameters> = (0..10).map(|i| frame(i as f64 / 60.0)).collect();
        let stream = render_stream(&frames, ChannelGroup::All);
        let times: Vec<f64> = stream
            .lines()
            .map(|line| line.split(' ').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(times.len(), 10);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_render_stream_matches_written_stream() {
        let frames: Vec<FrameParameters> = (0..4).map(|i| frame(i as f64 * 0.25)).collect();
        for group in ChannelGroup::ALL_GROUPS {
            let mut written = Vec::new();
            write_stream(&mut written, &frames, group).unwrap();
            assert_eq!(String::from_utf8(written).unwrap(), render_stream(&frames, group));
        }
        assert_eq!(render_stream(&[], ChannelGroup::All), "");
    }

    #[test]
    fn test_write_command_streams_creates_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![frame(0.0), frame(0.5)];
        let files = write_command_streams(&frames, dir.path()).unwrap();

        for group in ChannelGroup::ALL_GROUPS {
            let contents = std::fs::read_to_string(files.path(group)).unwrap();
            assert_eq!(contents, render_stream(&frames, group));
            assert_eq!(contents.lines().count(), 2);
        }
    }
}
