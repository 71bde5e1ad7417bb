//! Work directory management.
//!
//! A run either uses the configured work directory as-is or creates a
//! `tempfile` directory next to the output video. Temporary directories are
//! removed when the [`WorkDir`] is dropped unless the run asked to keep them.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

const WORK_DIR_PREFIX: &str = "levelcast_work_";

/// Directory holding the levels log, command streams and rendered frames.
#[derive(Debug)]
pub enum WorkDir {
    /// A caller-provided directory; never removed.
    Persistent(PathBuf),
    /// A temporary directory; removed on drop.
    Temporary(TempDir),
}

impl WorkDir {
    pub fn path(&self) -> &Path {
        match self {
            WorkDir::Persistent(path) => path,
            WorkDir::Temporary(dir) => dir.path(),
        }
    }

    /// Levels log written by the measurement run.
    pub fn levels_log(&self) -> PathBuf {
        self.path().join("levels.log")
    }

    /// Directory of the numbered frame sequence shared by all chunks.
    pub fn frames_dir(&self) -> PathBuf {
        self.path().join("frames")
    }

    /// Directory of one chunk's command streams.
    pub fn chunk_dir(&self, chunk_index: usize) -> PathBuf {
        self.path().join("chunks").join(format!("chunk_{chunk_index:04}"))
    }

    /// Stops a temporary directory from being removed and returns its path.
    pub fn persist(self) -> PathBuf {
        match self {
            WorkDir::Persistent(path) => path,
            WorkDir::Temporary(dir) => dir.keep(),
        }
    }
}

/// Creates the work directory for a run.
pub fn create_work_dir(config: &CoreConfig) -> CoreResult<WorkDir> {
    if let Some(dir) = &config.work_dir {
        std::fs::create_dir_all(dir)?;
        log::debug!("Using work directory {}", dir.display());
        return Ok(WorkDir::Persistent(dir.clone()));
    }

    let base = config
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&base)?;

    let dir = TempFileBuilder::new()
        .prefix(WORK_DIR_PREFIX)
        .tempdir_in(&base)?;
    log::debug!("Created temporary work directory {}", dir.path().display());
    Ok(WorkDir::Temporary(dir))
}
