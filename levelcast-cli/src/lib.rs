// levelcast-cli/src/lib.rs
//
// Library portion of the Levelcast CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{AnalyzeArgs, Cli, Commands, EmitArgs, MappingArgs, RenderArgs};
pub use commands::analyze::run_analyze;
pub use commands::emit::run_emit;
pub use commands::render::run_render;
