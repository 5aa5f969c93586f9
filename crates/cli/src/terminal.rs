use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use postpulse_compute::{
    AnomalyStatus, BatchReport, BrandBenchmark, StrategyComparison,
};
use postpulse_core::ContentItem;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const GOOD: Color = Color::Green;
    const BAD: Color = Color::Red;
    const NORMAL: Color = Color::Reset;
    const WARN: Color = Color::Yellow;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

fn status_color(status: AnomalyStatus) -> Color {
    match status {
        AnomalyStatus::GoodAnomaly => Colors::GOOD,
        AnomalyStatus::BadAnomaly => Colors::BAD,
        AnomalyStatus::Normal => Colors::NORMAL,
    }
}

/// Cut `s` to at most `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

/// Table output for the `postpulse` subcommands.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    fn header(&self, title: &str, columns: String) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", title)),
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", columns)),
            Print(format!("{}\n", "-".repeat(columns.chars().count()))),
            ResetColor,
        )?;
        Ok(())
    }

    /// One row per item with its score and colored status, then totals.
    pub fn print_batch_report(&self, report: &BatchReport, batch: &[ContentItem]) -> Result<()> {
        self.header(
            &format!("Detection run {} ({})", report.run_id, report.strategy),
            format!(
                "{:<14} {:<36} {:>9} {:>6}  {:<13} {}",
                "ID", "TITLE", "READS", "SCORE", "STATUS", "HIGHLIGHT"
            ),
        )?;

        let mut stdout = io::stdout();
        for (item, entry) in batch.iter().zip(&report.items) {
            let r = &entry.report;
            // Most severe metric, as a hint for why the item stands out.
            let highlight = r
                .results
                .iter()
                .filter(|m| m.is_anomalous())
                .max_by_key(|m| m.level)
                .map(|m| format!("{}: {}", m.metric.label(), m.deviation_text))
                .unwrap_or_default();
            execute!(
                stdout,
                Print(format!(
                    "{:<14} {:<36} {:>9} {:>6.1}  ",
                    truncate(&entry.item_id, 14),
                    truncate(item.title.as_deref().unwrap_or(""), 36),
                    item.read_count.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
                    r.overall_score,
                )),
                SetForegroundColor(status_color(r.overall_status)),
                Print(format!("{:<13}", r.overall_status.to_string())),
                ResetColor,
                SetForegroundColor(Colors::DIM),
                Print(format!(" {}\n", highlight)),
                ResetColor,
            )?;
        }

        let s = &report.summary;
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "\n{} items: {} normal, {} good, {} bad",
                s.total, s.normal, s.good_anomaly, s.bad_anomaly
            )),
            Print(if s.fallback_used > 0 {
                format!(" ({} by absolute read thresholds)", s.fallback_used)
            } else {
                String::new()
            }),
            Print(format!(
                " | stats {}us, classify {}us\n",
                report.timing.stats_micros, report.timing.classify_micros
            )),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Disagreements highlighted; agreeing rows dimmed.
    pub fn print_comparisons(&self, comparisons: &[StrategyComparison]) -> Result<()> {
        self.header(
            "Legacy vs optimized",
            format!(
                "{:<14} {:<13} {:>6}  {:<13} {:>6}",
                "ID", "LEGACY", "SCORE", "OPTIMIZED", "SCORE"
            ),
        )?;

        let mut stdout = io::stdout();
        let mut disagreements = 0usize;
        for c in comparisons {
            let color = if c.agrees() {
                Colors::DIM
            } else {
                disagreements += 1;
                Colors::WARN
            };
            execute!(
                stdout,
                SetForegroundColor(color),
                Print(format!(
                    "{:<14} {:<13} {:>6.1}  {:<13} {:>6.1}\n",
                    truncate(&c.item_id, 14),
                    c.legacy_status.to_string(),
                    c.legacy_score,
                    c.optimized_status.to_string(),
                    c.optimized_score,
                )),
                ResetColor,
            )?;
        }
        execute!(
            stdout,
            Print(format!(
                "\n{} of {} items disagree\n",
                disagreements,
                comparisons.len()
            )),
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_benchmarks(&self, benchmarks: &[BrandBenchmark]) -> Result<()> {
        let mut stdout = io::stdout();
        if benchmarks.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No branded posts in batch.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        self.header(
            "Brand benchmarks",
            format!(
                "{:<20} {:>5} {:>10} {:>10} {:>8}  {}",
                "BRAND", "POSTS", "AVG READS", "AVG INTER", "AVG SHR", "TOP GOOD"
            ),
        )?;
        for b in benchmarks {
            execute!(
                stdout,
                Print(format!(
                    "{:<20} {:>5} {:>10} {:>10} {:>8}  ",
                    truncate(&b.brand, 20),
                    b.item_count,
                    fmt_opt(b.avg_reads),
                    fmt_opt(b.avg_interactions),
                    fmt_opt(b.avg_shares),
                )),
                SetForegroundColor(Colors::GOOD),
                Print(format!("{}\n", b.top_good.join(", "))),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}
