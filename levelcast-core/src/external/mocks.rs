// levelcast-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use super::*;
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Side effect a matched expectation performs on the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutput {
    /// Nothing is written.
    None,
    /// An empty file is created at the command's last argument.
    Dummy,
    /// `contents` is written to `path`, e.g. the levels log of a measurement run.
    File { path: PathBuf, contents: String },
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub output: MockOutput,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern is a substring of
/// any argument. An unmatched command panics.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, result: CoreResult<MockFfmpegProcess>, output: MockOutput) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            output,
        });
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        self.add_success_expectation_with_output(arg_pattern, events, MockOutput::None);
    }

    pub fn add_success_expectation_with_output(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        output: MockOutput,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), MockOutput::None);
    }

    /// Expects a command that exits with `exit_code`.
    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, exit_code: i32) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            // Wait statuses carry the exit code in the high byte.
            exit_status: ExitStatus::from_raw(exit_code << 8),
        };
        self.add_expectation(arg_pattern, Ok(process), MockOutput::None);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Number of expectations not yet consumed.
    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }

    fn apply_output(output: &MockOutput, args: &[String]) {
        let (path, contents) = match output {
            MockOutput::None => return,
            MockOutput::Dummy => match args.last() {
                Some(last) => (PathBuf::from(last), ""),
                None => {
                    log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
                    return;
                }
            },
            MockOutput::File { path, contents } => (path.clone(), contents.as_str()),
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("MockFfmpegSpawner failed to create parent dir {:?}: {}", parent, e);
            }
        }
        match std::fs::write(&path, contents) {
            Ok(()) => log::info!("MockFfmpegSpawner wrote output file: {:?}", path),
            Err(e) => log::error!("MockFfmpegSpawner failed to write output file {:?}: {}", path, e),
        }
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
            panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
        };

        let expectation = expectations.remove(index);
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );
        match expectation.result {
            Ok(process) => {
                Self::apply_output(&expectation.output, &args);
                Ok(process)
            }
            Err(err) => {
                log::warn!(
                    "MockFfmpegSpawner simulating spawn error for pattern '{}': {:?}",
                    expectation.arg_pattern,
                    err
                );
                Err(err)
            }
        }
    }
}

/// Mock implementation of AudioProber.
#[derive(Clone, Default)]
pub struct MockAudioProber {
    results: Rc<RefCell<HashMap<PathBuf, AudioInfo>>>,
}

impl MockAudioProber {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers the info returned for `path`.
    pub fn expect_audio(&self, path: &Path, info: AudioInfo) {
        self.results.borrow_mut().insert(path.to_path_buf(), info);
    }

    /// Registers a plain duration for `path`.
    pub fn expect_duration(&self, path: &Path, duration: f64) {
        self.expect_audio(
            path,
            AudioInfo {
                duration,
                bit_rate: None,
                sample_rate: Some(48_000),
                channels: Some(2),
            },
        );
    }
}

impl AudioProber for MockAudioProber {
    fn probe_audio(&self, path: &Path) -> CoreResult<AudioInfo> {
        log::info!("MockAudioProber::probe_audio called for: {}", path.display());
        self.results.borrow().get(path).cloned().ok_or_else(|| {
            log::error!("MockAudioProber: No expectation set for path: {}", path.display());
            CoreError::Probe(format!(
                "MockAudioProber: No expectation set for path {}",
                path.display()
            ))
        })
    }
}
