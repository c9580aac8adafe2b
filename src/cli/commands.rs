use crate::core::exporter::{attach_contents, to_json};
use crate::core::file_selector::{SessionOutcome, select_files};
use crate::domain::models::{DEFAULT_EXCLUDED, Node, OutputTarget, SelectorConfig};
use crate::infra::file_system::scan_tree;
use crate::infra::logger::{DEFAULT_LOG_FILE, failure_message, install_panic_hook, setup_logger};
use crate::infra::output::create_writer;
use anyhow::Context;
use clap::Parser;
use log::{debug, error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "file-selector")]
#[command(about = "Pick files from a directory tree and export the tree as JSON", long_about = None)]
pub struct Cli {
    /// Directory to scan (defaults to the current working directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Comma-separated base names to leave out of the tree
    #[arg(long, default_value_t = DEFAULT_EXCLUDED.join(","))]
    pub exclude: String,

    /// Where to write the JSON document; `-` prints it to stdout
    #[arg(long, default_value = "output.json")]
    pub output: String,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What the pipeline did, for the caller to report.
#[derive(Debug, PartialEq, Eq)]
pub enum ExportReport {
    Written(OutputTarget),
    NothingSelected,
    NoStructure,
}

fn parse_excludes(exclude: &str) -> Vec<String> {
    exclude
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_output(output: &str) -> OutputTarget {
    if output == "-" {
        OutputTarget::Stdout
    } else {
        OutputTarget::File(PathBuf::from(output))
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<SelectorConfig> {
    let root_path = match &cli.path {
        Some(path) => std::path::absolute(path)
            .with_context(|| format!("cannot resolve {}", path.display()))?,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    Ok(SelectorConfig {
        root_path,
        excluded_names: parse_excludes(&cli.exclude),
        output: parse_output(&cli.output),
    })
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.verbose, &cli.log_file) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }
    install_panic_hook(cli.log_file.clone());

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Unhandled error: {:?}", e);
            log::logger().flush();
            println!("{}", failure_message(&cli.log_file));
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    info!("Application started");
    let config = build_config(cli)?;
    debug!("Configuration: {:?}", config);

    match generate_export(&config, select_files)? {
        ExportReport::Written(OutputTarget::File(path)) => {
            println!("Output written to '{}'.", path.display());
        }
        ExportReport::Written(OutputTarget::Stdout) => {}
        ExportReport::NothingSelected => println!("No files selected."),
        ExportReport::NoStructure => {}
    }
    Ok(())
}

/// Scans the configured root, lets `select` choose files, and writes the export.
///
/// Nothing is written when the session is cancelled or ends with no files picked.
pub fn generate_export(
    config: &SelectorConfig,
    select: impl FnOnce(&Node) -> anyhow::Result<SessionOutcome>,
) -> anyhow::Result<ExportReport> {
    info!("Current working directory: {}", config.root_path.display());
    let Some(mut tree) = scan_tree(&config.root_path, &config.excluded_names) else {
        error!("Could not retrieve folder structure for {}", config.root_path.display());
        return Ok(ExportReport::NoStructure);
    };

    let selection = match select(&tree)? {
        SessionOutcome::Submitted(selection) if !selection.is_empty() => selection,
        SessionOutcome::Submitted(_) | SessionOutcome::Cancelled => {
            info!("No files selected.");
            return Ok(ExportReport::NothingSelected);
        }
    };

    let attached = attach_contents(&mut tree, &selection);
    info!("Embedded contents for {} files", attached);

    let json = to_json(&tree)?;
    create_writer(&config.output).write(&json)?;
    Ok(ExportReport::Written(config.output.clone()))
}
