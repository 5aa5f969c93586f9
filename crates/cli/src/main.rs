mod cli;
mod terminal;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use postpulse_compute::{brand_benchmarks, DetectionEngine};
use postpulse_core::{Config, ContentItem, DetectionStrategy};
use postpulse_rules::{load_scoring_config, CompiledScoringConfig};

use crate::cli::{CliArgs, Command, OutputFormat};
use crate::terminal::Terminal;

fn main() -> Result<()> {
    postpulse_core::config::load_dotenv();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    config.log_summary();

    let scoring_path = args
        .scoring_config
        .as_deref()
        .or(config.detection.scoring_config.as_deref());
    let scoring = match scoring_path {
        Some(path) => load_scoring_config(path)
            .with_context(|| format!("failed to load scoring config from {}", path.display()))?,
        None => CompiledScoringConfig::default(),
    };
    let engine = DetectionEngine::from_config(&config.detection, scoring);
    let terminal = Terminal::new();

    match args.command {
        Command::Detect {
            input,
            strategy,
            format,
        } => {
            let strategy = match strategy {
                Some(raw) => raw.parse::<DetectionStrategy>()?,
                None => config.detection.strategy,
            };
            let batch = read_batch(&input)?;
            let report = engine.detect(&batch, strategy);
            match format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Table => terminal.print_batch_report(&report, &batch)?,
            }
        }
        Command::Compare { input, format } => {
            let batch = read_batch(&input)?;
            let comparisons = engine.compare(&batch);
            match format {
                OutputFormat::Json => print_json(&comparisons)?,
                OutputFormat::Table => terminal.print_comparisons(&comparisons)?,
            }
        }
        Command::Benchmarks {
            input,
            limit,
            format,
        } => {
            let batch = read_batch(&input)?;
            let report = engine.detect(&batch, config.detection.strategy);
            let benchmarks = brand_benchmarks(&batch, &report.items, limit);
            match format {
                OutputFormat::Json => print_json(&benchmarks)?,
                OutputFormat::Table => terminal.print_benchmarks(&benchmarks)?,
            }
        }
        Command::ShowConfig => {
            terminal.print_info(&format!(
                "profile: {}\nstrategy: {}\nparallel_threshold: {}\nscoring_config: {}",
                config.profile_label(),
                config.detection.strategy,
                config.detection.parallel_threshold,
                scoring_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(built-in defaults)".to_string()),
            ))?;
            let yaml = serde_yaml::to_string(engine.config())
                .context("failed to render scoring config")?;
            println!("{}", yaml);
        }
    }

    Ok(())
}

fn read_batch(path: &Path) -> Result<Vec<ContentItem>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let batch = ContentItem::read_batch(file)
        .with_context(|| format!("failed to parse batch {}", path.display()))?;
    info!(path = %path.display(), items = batch.len(), "batch loaded");
    Ok(batch)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
