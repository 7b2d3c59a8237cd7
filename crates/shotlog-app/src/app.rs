//! Command-line host: argument parsing, config resolution and script replay.

use crate::script::{Script, ScriptRunner};
use shotlog_core::{
    ConfigError, ExportSink, JsonFileExporter, LogExporter, Session, ShotLogConfig,
    TableLayout, TableSnapshot,
};
use std::fs;
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Host errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Script error: {0}")]
    Script(String),
}

/// Replay a recorded input script against a fresh table.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "shotlog", about = "Replay Shot Logger input scripts")]
pub struct Args {
    /// Config file. Defaults to `<config dir>/shotlog/config.json` when present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write saved tables to this JSON file instead of the log.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Script to replay.
    pub script: PathBuf,
}

/// Default config location: `<config dir>/shotlog/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shotlog").join("config.json"))
}

/// Load the config named on the command line, else the default one if it
/// exists, else built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ShotLogConfig, AppError> {
    if let Some(path) = explicit {
        return Ok(ShotLogConfig::load(path)?);
    }
    match default_config_path().filter(|path| path.exists()) {
        Some(path) => Ok(ShotLogConfig::load(&path)?),
        None => {
            log::debug!("No config file, using defaults");
            Ok(ShotLogConfig::default())
        }
    }
}

/// Replay a script and return the final table.
pub fn run(args: &Args) -> Result<TableSnapshot, AppError> {
    let config = resolve_config(args.config.as_deref())?;
    let json = fs::read_to_string(&args.script).map_err(|e| {
        AppError::Script(format!("Failed to read {}: {}", args.script.display(), e))
    })?;
    let script = Script::from_json(&json).map_err(|e| AppError::Script(e.to_string()))?;

    let exporter: Box<dyn ExportSink> = match &args.out {
        Some(path) => Box::new(JsonFileExporter::new(path)),
        None => Box::new(LogExporter),
    };
    let session = Session::with_exporter(config, TableLayout::default(), exporter);
    let mut runner = ScriptRunner::new(session);

    let gestures = runner.run(&script);
    log::info!(
        "Replayed {} step(s), {} gesture(s)",
        script.steps.len(),
        gestures.len()
    );
    Ok(runner.session().snapshot())
}
