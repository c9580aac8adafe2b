mod cli;
mod core;
mod domain;
mod infra;

use cli::commands::run;
use std::process::ExitCode;

fn main() -> ExitCode {
    run()
}
