//! Command-line interface

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::Read;
use std::path::PathBuf;
use thread_digest::{
    DigestOutput, EngineConfig, SortOrder, SummaryOptions, process_records, records_from_json,
};

#[derive(Parser, Debug)]
#[command(name = "sla-digest")]
#[command(version)]
#[command(about = "Summarize email-thread dumps and measure billing response times", long_about = None)]
pub struct Cli {
    /// JSON array of raw email records ("-" or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Write the digest here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Engine config file (defaults to ~/.config/thread-digest/engine.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sort conversations oldest first instead of newest first
    #[arg(long)]
    pub oldest_first: bool,

    /// Include batch statistics in the output
    #[arg(long)]
    pub stats: bool,

    /// Keep at most this many conversations
    #[arg(long)]
    pub max: Option<usize>,

    /// Write the default engine config to the config directory and exit
    #[arg(long)]
    pub write_default_config: bool,
}

impl Cli {
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            max_summaries: self.max,
            sort_order: if self.oldest_first {
                SortOrder::OldestFirst
            } else {
                SortOrder::NewestFirst
            },
            include_stats: self.stats,
        }
    }
}

/// Execute one invocation
pub fn run(cli: &Cli) -> Result<()> {
    if cli.write_default_config {
        let path = config::save_json(thread_digest::config::CONFIG_FILE, &EngineConfig::default())?;
        info!("Wrote default engine config to {}", path.display());
        return Ok(());
    }

    let engine_config = EngineConfig::load(cli.config.as_deref())?;
    let input = read_input(cli.input.as_ref())?;
    let output = digest(&input, &engine_config, &cli.summary_options())?;

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize digest")?;
    match &cli.out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(
                "Wrote {} conversation digests to {}",
                output.summaries.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Parse raw records and run the batch
pub fn digest(input: &str, config: &EngineConfig, options: &SummaryOptions) -> Result<DigestOutput> {
    let records = records_from_json(input)?;
    Ok(process_records(records, config, options))
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path.filter(|p| p.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            Ok(buf)
        }
    }
}
