//! FFprobe integration for audio track inspection.
//!
//! The orchestrator needs the total track duration (to time the ball's travel
//! and truncate the final chunk) and, for log output, the bit rate.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use serde::Serialize;
use std::path::Path;

/// Audio properties reported by the prober.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    /// Track duration in seconds
    pub duration: f64,
    /// Bit rate of the first audio stream in bits per second, if reported
    pub bit_rate: Option<u64>,
    /// Sample rate of the first audio stream, if reported
    pub sample_rate: Option<u32>,
    /// Channel count of the first audio stream, if reported
    pub channels: Option<u32>,
}

/// Something that can inspect an audio file.
pub trait AudioProber {
    fn probe_audio(&self, path: &Path) -> CoreResult<AudioInfo>;
}

/// `AudioProber` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct FfprobeAudioProber;

impl FfprobeAudioProber {
    pub fn new() -> Self {
        Self
    }
}

impl AudioProber for FfprobeAudioProber {
    fn probe_audio(&self, path: &Path) -> CoreResult<AudioInfo> {
        log::debug!("Running ffprobe (via crate) on: {}", path.display());
        let metadata = ffprobe(path).map_err(|err| {
            log::error!("ffprobe failed on {}: {:?}", path.display(), err);
            map_ffprobe_error(err)
        })?;

        let stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"))
            .ok_or_else(|| CoreError::Probe(format!("No audio stream found in {}", path.display())))?;

        let duration = metadata
            .format
            .duration
            .as_deref()
            .or(stream.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| {
                CoreError::Probe(format!("Failed to parse duration for {}", path.display()))
            })?;

        let bit_rate = stream
            .bit_rate
            .as_deref()
            .or(metadata.format.bit_rate.as_deref())
            .and_then(|b| b.parse::<u64>().ok());
        let sample_rate = stream.sample_rate.as_deref().and_then(|s| s.parse::<u32>().ok());
        let channels = stream.channels.and_then(|c| u32::try_from(c).ok());

        Ok(AudioInfo {
            duration,
            bit_rate,
            sample_rate,
            channels,
        })
    }
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error("ffprobe", output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::Probe(format!("ffprobe output deserialization: {err}"))
        }
        #[allow(unreachable_patterns)]
        _ => CoreError::Probe(format!("Unknown ffprobe error: {err:?}")),
    }
}
