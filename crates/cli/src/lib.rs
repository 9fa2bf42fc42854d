use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use takeoff_core::{
    export_measurements_csv, export_measurements_json, CsvExportConfig, EngineConfig,
    ScaleCalibrator, TakeoffSession,
};
use tracing_subscriber::EnvFilter;

pub mod script;

#[derive(Debug, Parser)]
#[command(name = "takeoff-cli")]
#[command(about = "Takeoff measurement engine CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON script of host events and export the resulting measurements.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        output: Option<PathBuf>,
        /// TOML engine configuration; TAKEOFF_* environment variables override it.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the calibration state for a reference length and its pixel span.
    Calibrate {
        #[arg(long)]
        reference: f64,
        #[arg(long)]
        pixels: f64,
        #[arg(long, default_value = "ft")]
        unit: String,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Csv,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing();

    match cli.command {
        Commands::Replay { script, format, output, config } => {
            run_replay(&script, format, output.as_deref(), config.as_deref())
        }
        Commands::Calibrate { reference, pixels, unit } => run_calibrate(reference, pixels, &unit),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TAKEOFF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // Ignore the error when a subscriber is already installed (repeated `run` calls).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .and_then(EngineConfig::merge_env)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => EngineConfig::from_env().context("invalid TAKEOFF_* environment"),
    }
}

fn run_replay(script: &Path, format: Format, output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    ensure_file_exists(script)?;
    let config = load_config(config)?;
    let steps = script::load(script)?;

    let mut session = TakeoffSession::new(&config);
    script::replay(&mut session, &steps)?;
    tracing::info!(measurements = session.store().len(), "replay finished");

    let mut buffer = Vec::new();
    match format {
        Format::Json => export_measurements_json(&mut buffer, session.store())?,
        Format::Csv => export_measurements_csv(&mut buffer, session.store(), &CsvExportConfig::default())?,
    }

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &buffer)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            println!("{}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&buffer)?;
            if format == Format::Json {
                writeln!(stdout)?;
            }
        }
    }

    Ok(())
}

fn run_calibrate(reference: f64, pixels: f64, unit: &str) -> Result<()> {
    let mut calibrator = ScaleCalibrator::new();
    let state = calibrator.calibrate(reference, pixels, unit)?;
    let json = serde_json::to_string_pretty(&state)?;
    println!("{json}");
    Ok(())
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
