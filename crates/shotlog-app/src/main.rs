//! Main application entry point.

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let args = shotlog_app::Args::parse();
    log::info!("Starting Shot Logger");

    let snapshot = match shotlog_app::run(&args) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match snapshot.to_json() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize table: {}", e);
            ExitCode::FAILURE
        }
    }
}
