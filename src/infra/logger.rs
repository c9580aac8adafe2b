use crate::core::file_selector::restore_terminal;
use anyhow::Context;
use env_logger::{Builder, Target, WriteStyle};
use log::error;
use std::backtrace::Backtrace;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "file_selector.log";
const LOG_LEVEL_ENV: &str = "FILE_SELECTOR_LOG_LEVEL";

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Installs the process-wide logger, appending timestamped lines to `log_path`.
pub fn setup_logger(verbosity: u8, log_path: &Path) -> anyhow::Result<()> {
    let file = open_log_file(log_path)?;
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level_for(verbosity));

    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("logger already installed")?;
    Ok(())
}

/// Message shown to the user whenever the program fails unexpectedly.
pub fn failure_message(log_path: &Path) -> String {
    format!(
        "An error occurred. Check '{}' for details.",
        log_path.display()
    )
}

/// Logs panics with a backtrace and restores the terminal before the process dies.
pub fn install_panic_hook(log_path: PathBuf) {
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        error!(
            "Uncaught panic: {}\n{}",
            info,
            Backtrace::force_capture()
        );
        log::logger().flush();
        println!("{}", failure_message(&log_path));
    }));
}
