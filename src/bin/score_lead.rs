//! Score one lead from the command line and print the outcome as JSON.
//!
//! Usage: score-lead <config> <lead.json> [--now RFC3339]

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use std::fs;

use lead_intent_scorer::{LeadRecord, LeadScorer, LeadSignals, ScoringConfig};

const USAGE: &str = "usage: score-lead <config> <lead.json> [--now RFC3339]";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, lead_path, now) = parse_args(&args)?;

    let config = ScoringConfig::load(&config_path)
        .with_context(|| format!("Failed to load scoring config from {config_path}"))?;
    let raw = fs::read_to_string(&lead_path).with_context(|| format!("Failed to read {lead_path}"))?;
    let lead: LeadRecord =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse lead JSON in {lead_path}"))?;

    let outcome = LeadScorer::default().evaluate(&LeadSignals::from(&lead), &config, now)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<(String, String, DateTime<Utc>)> {
    let mut positional = Vec::new();
    let mut now = None;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        if arg == "--now" {
            let Some(v) = it.next() else {
                bail!("--now needs a value\n{USAGE}");
            };
            let ts = DateTime::parse_from_rfc3339(v)
                .with_context(|| format!("--now `{v}` is not RFC3339"))?;
            now = Some(ts.with_timezone(&Utc));
        } else {
            positional.push(arg.clone());
        }
    }

    match positional.as_slice() {
        [config, lead] => Ok((config.clone(), lead.clone(), now.unwrap_or_else(Utc::now))),
        _ => bail!("{USAGE}"),
    }
}
