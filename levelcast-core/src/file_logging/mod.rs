//! File logging for pipeline runs.
//!
//! Each run writes to its own timestamped log file through log4rs; the
//! console mirror is optional so the CLI can keep stdout clean for `--json`.

pub mod setup;

pub use setup::{log_file_name, setup_logging};
