use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use cloverleaf::panic_handler::initialize_panic_handler;
use cloverleaf::settings;
use cloverleaf::sync::pdf_path_for;
use cloverleaf::synctex::SyncTex;

#[derive(Parser, Debug)]
#[command(
    name = "cloverleaf",
    about = "Map between LaTeX source positions and PDF page positions via SyncTeX",
    author,
    version
)]
struct Cli {
    /// Settings file to use instead of the user config directory
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Program to run instead of the configured synctex command
    #[arg(long, value_name = "PROGRAM", global = true)]
    synctex: Option<String>,

    #[arg(long = "log-file", value_name = "PATH", global = true, default_value = "cloverleaf.log")]
    log_file: PathBuf,

    #[arg(long = "log-level", value_enum, global = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Source position to PDF position
    Forward {
        #[arg(long)]
        source: PathBuf,
        /// 1-based line
        #[arg(long)]
        line: u32,
        /// 1-based column
        #[arg(long, default_value_t = 1)]
        column: u32,
        /// Defaults to the source path with a .pdf extension
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    /// PDF position to source position
    Reverse {
        #[arg(long)]
        pdf: PathBuf,
        /// 1-based page
        #[arg(long)]
        page: u32,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.config {
        Some(path) => settings::load_settings_from_path(path),
        None => settings::load_settings(),
    }
    let program = cli.synctex.unwrap_or_else(settings::get_synctex_command);
    let synctex = SyncTex::new(program);

    let json = match cli.command {
        Command::Forward {
            source,
            line,
            column,
            pdf,
        } => {
            let pdf = pdf.unwrap_or_else(|| pdf_path_for(&source));
            match synctex.forward_sync(&source, line, column, &pdf) {
                Ok(position) => serde_json::to_string_pretty(&position)?,
                Err(e) => {
                    error!("{e}");
                    eprintln!("SyncTeX error: {e}");
                    return Ok(ExitCode::from(2));
                }
            }
        }
        Command::Reverse { pdf, page, x, y } => match synctex.reverse_sync(&pdf, page, x, y) {
            Ok(position) => serde_json::to_string_pretty(&position)?,
            Err(e) => {
                error!("{e}");
                eprintln!("Reverse SyncTeX error: {e}");
                return Ok(ExitCode::from(2));
            }
        },
    };

    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    WriteLogger::init(
        cli.log_level.into(),
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("cannot create log file {}", cli.log_file.display()))?,
    )?;
    initialize_panic_handler();

    info!("Starting cloverleaf");
    let code = run(cli)?;
    info!("Shutting down cloverleaf");
    Ok(code)
}
