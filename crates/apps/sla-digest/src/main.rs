//! sla-digest - Batch driver for the thread-digest engine
//!
//! Reads a JSON array of raw email records and writes one digest per
//! conversation: summary texts, billing response window and the canonical
//! decomposed messages.

use clap::Parser;
use log::error;

mod cli;

use cli::Cli;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = cli::run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
