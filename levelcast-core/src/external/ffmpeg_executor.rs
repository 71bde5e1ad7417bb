// ============================================================================
// levelcast-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// Traits for spawning and driving ffmpeg, a concrete implementation over
// ffmpeg-sidecar, and `run_engine`, which every pipeline stage uses to run a
// command to completion and turn failures into `CoreError::ExternalEngine`.
//
// AI-ASSISTANT-INFO: FFmpeg process management and execution abstraction

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error("ffmpeg (event iterator)", ExitStatus::default(), e.to_string())
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

/// Outcome of a successful engine run.
#[derive(Debug, Clone, Default)]
pub struct EngineRun {
    /// Error and fatal lines the engine printed even though it succeeded.
    pub diagnostics: Vec<String>,
    /// Number of events received from the engine.
    pub events: usize,
}

impl EngineRun {
    /// Diagnostics joined into one block of text.
    pub fn diagnostics_text(&self) -> String {
        self.diagnostics.join("\n")
    }
}

/// Runs `cmd` to completion.
///
/// Engine output is logged at debug; error and fatal lines are collected and
/// attached to the `ExternalEngine` error returned on a non-zero exit.
/// `label` names the stage in logs and errors (e.g. "ffmpeg (measure)").
pub fn run_engine<S: FfmpegSpawner>(spawner: &S, cmd: FfmpegCommand, label: &str) -> CoreResult<EngineRun> {
    let args: Vec<String> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    log::debug!("Running {}: ffmpeg {}", label, args.join(" "));

    let mut process = spawner.spawn(cmd)?;
    let mut run = EngineRun::default();

    process.handle_events(|event| {
        run.events += 1;
        match event {
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) | FfmpegEvent::Error(line) => {
                log::debug!("[{label}] {line}");
                run.diagnostics.push(line);
            }
            FfmpegEvent::Log(_, line) => log::trace!("[{label}] {line}"),
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        let diagnostics = if run.diagnostics.is_empty() {
            "no diagnostics captured".to_string()
        } else {
            run.diagnostics_text()
        };
        log::error!("{} failed with {}: {}", label, status, diagnostics);
        return Err(command_failed_error(label, status, diagnostics));
    }

    log::debug!("{} finished ({} events)", label, run.events);
    Ok(run)
}
