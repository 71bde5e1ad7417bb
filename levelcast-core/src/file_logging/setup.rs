use anyhow::Result;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::Path;

const FILE_PATTERN: &str = "[{d(%Y-%m-%d %H:%M:%S)}] [{l}] {m}{n}";
const CONSOLE_PATTERN: &str = "{h({l:<5})} {m}{n}";

/// Log file name for one run of `action`, e.g. `levelcast_render_20240601_123045.log`.
pub fn log_file_name(action: &str) -> String {
    format!(
        "levelcast_{}_{}.log",
        action,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Routes the `log` facade to `log_file` and, when `console` is set, to stderr.
pub fn setup_logging(log_file: &Path, log_level: LevelFilter, console: bool) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .append(false)
        .build(log_file)?;

    let mut config = Config::builder().appender(Appender::builder().build("file", Box::new(file_appender)));
    let mut root = Root::builder().appender("file");

    if console {
        let console_appender = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
            .build();
        config = config.appender(Appender::builder().build("console", Box::new(console_appender)));
        root = root.appender("console");
    }

    log4rs::init_config(config.build(root.build(log_level))?)?;
    Ok(())
}
