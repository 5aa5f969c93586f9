use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Engagement anomaly detection for social-content posts.
///
/// Reads a JSON array of posts and classifies each one as NORMAL,
/// GOOD_ANOMALY or BAD_ANOMALY relative to the rest of the batch.
#[derive(Parser, Debug)]
#[command(name = "postpulse", about = "Engagement anomaly detection for social-content posts")]
pub struct CliArgs {
    /// Scoring config YAML file or rules directory (overrides SCORING_CONFIG)
    #[arg(long, global = true)]
    pub scoring_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify every post in a batch
    Detect {
        /// JSON array of posts
        #[arg(long)]
        input: PathBuf,

        /// optimized or legacy (overrides DETECTION_STRATEGY)
        #[arg(long)]
        strategy: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Run both strategies and list where they disagree
    Compare {
        #[arg(long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Per-brand averages and top GOOD_ANOMALY posts
    Benchmarks {
        #[arg(long)]
        input: PathBuf,

        /// Top posts listed per brand
        #[arg(long, default_value = "5")]
        limit: usize,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the effective configuration and scoring constants
    ShowConfig,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_defaults_to_table() {
        let args = CliArgs::parse_from(["postpulse", "detect", "--input", "batch.json"]);
        match args.command {
            Command::Detect {
                input,
                strategy,
                format,
            } => {
                assert_eq!(input, PathBuf::from("batch.json"));
                assert!(strategy.is_none());
                assert_eq!(format, OutputFormat::Table);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_scoring_config_after_subcommand() {
        let args = CliArgs::parse_from([
            "postpulse",
            "benchmarks",
            "--input",
            "b.json",
            "--limit",
            "3",
            "--scoring-config",
            "rules/",
        ]);
        assert_eq!(args.scoring_config, Some(PathBuf::from("rules/")));
        assert!(matches!(args.command, Command::Benchmarks { limit: 3, .. }));
    }

    #[test]
    fn show_config_takes_no_input() {
        let args = CliArgs::parse_from(["postpulse", "show-config"]);
        assert!(matches!(args.command, Command::ShowConfig));
    }

    #[test]
    fn json_format_parses() {
        let args = CliArgs::parse_from(["postpulse", "compare", "--input", "b.json", "--format", "json"]);
        assert!(matches!(
            args.command,
            Command::Compare {
                format: OutputFormat::Json,
                ..
            }
        ));
    }
}
