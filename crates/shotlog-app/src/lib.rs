//! Shot Logger host
//!
//! Headless shell around the core session: loads configuration, replays
//! recorded input scripts and exports the resulting table.

mod app;
mod script;

pub use app::{AppError, Args, default_config_path, resolve_config, run};
pub use script::{PickerStep, PointerStep, Script, ScriptRunner, Step};
