// ============================================================================
// levelcast-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg and ffprobe executables
//
// This module wraps the measurement/render engine (ffmpeg) and the audio
// prober (ffprobe) behind traits, so the orchestrator can be driven by the
// real tools in production and by mocks in tests.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: spawn and drive an ffmpeg process
// - run_engine: drain the event stream, collect diagnostics, check the exit
// - AudioProber: duration and bit rate of an audio track
// - check_dependency: verify an executable is installed
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for probing audio with ffprobe
pub mod ffprobe_executor;

/// Mock spawner and prober for tests
#[cfg(unix)]
pub mod mocks;

pub use ffmpeg_executor::{
    EngineRun, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_engine,
};
pub use ffprobe_executor::{AudioInfo, AudioProber, FfprobeAudioProber};

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded. Only a missing binary is
/// an error; a non-zero exit from the version query is tolerated.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
