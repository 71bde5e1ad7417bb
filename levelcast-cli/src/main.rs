// levelcast-cli/src/main.rs
//
// Entry point of the `levelcast` binary: parses arguments, initialises
// logging and dispatches to the subcommand. Any error is printed with its
// context chain and turns into exit code 1.

use clap::Parser;
use levelcast_cli::logging::init_logging;
use levelcast_cli::{Cli, Commands, run_analyze, run_emit, run_render};
use std::process;

fn main() {
    let cli = Cli::parse();

    let action = match &cli.command {
        Commands::Render(_) => "render",
        Commands::Analyze(_) => "analyze",
        Commands::Emit(_) => "emit",
    };

    if let Err(e) = init_logging(cli.verbose, cli.log_dir.as_deref(), action) {
        eprintln!("Error: failed to initialise logging: {e:#}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Analyze(args) => run_analyze(args),
        Commands::Emit(args) => run_emit(args),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
