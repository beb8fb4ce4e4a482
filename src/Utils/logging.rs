use log::warn;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// "info", "debug", ... into a level filter; unknown names fall back to Info
pub fn level_from_name(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Terminal logger at `level`, plus a DEBUG file log when `log_file` is given.
/// Calling it twice is harmless: the second logger is simply not installed.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut file_error = None;
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file)),
            Err(e) => file_error = Some(format!("cannot create log file '{}': {}", path.display(), e)),
        }
    }
    if CombinedLogger::init(loggers).is_ok() {
        if let Some(message) = file_error {
            warn!("{}", message);
        }
    }
}
