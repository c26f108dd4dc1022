//! sleuthctl - investigate the public footprint of an email address.
//!
//! Thin front-end over `sleuth_engine`: parse arguments, load config,
//! pick the probe set, run one investigation, render the report.

mod cli;
mod logging;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;

use sleuth_common::EngineConfig;
use sleuth_engine::{probes, Engine};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose);

    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str::<EngineConfig>(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    let probe_set = if args.offline {
        Vec::new()
    } else {
        probes::default_probe_set().context("building the HTTP probe client")?
    };
    let engine = Engine::new(config)?.with_probes(probe_set);
    tracing::debug!(probes = engine.probe_count(), offline = args.offline, "engine ready");

    let spinner = if args.json || !console::Term::stderr().is_term() {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(format!(
            "investigating {} across {} sources...",
            args.email,
            engine.probe_count()
        ));
        Some(bar)
    };

    let result = engine.investigate(&args.email).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::render(&report);
    }
    Ok(())
}
