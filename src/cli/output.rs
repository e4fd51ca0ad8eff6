//! CLI Output Formatting.
//!
//! Renders health reports as styled text or JSON.

use console::{style, StyledObject};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::monitoring::{
    GrowthAnalysis, HealthRating, HistoryPoint, NetworkHealthScore, NodeScoreReport, Severity,
    Trend, TrendAnalysis,
};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
    /// Pretty JSON format
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMATTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Output formatter for CLI
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create new formatter
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Get format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render `data` as JSON, or with `text` in text mode
    pub fn render<T, F>(&self, data: &T, text: F) -> Result<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            OutputFormat::Text => Ok(text(data)),
            OutputFormat::Json => {
                serde_json::to_string(data).map_err(|e| Error::Serialization(e.to_string()))
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(data).map_err(|e| Error::Serialization(e.to_string()))
            }
        }
    }

    /// Network health report
    pub fn health(&self, score: &NetworkHealthScore) -> Result<String> {
        self.render(score, health_text)
    }

    /// History points
    pub fn history(&self, points: &[HistoryPoint]) -> Result<String> {
        self.render(points, history_text)
    }

    /// Trend analysis
    pub fn trend(&self, analysis: &TrendAnalysis) -> Result<String> {
        self.render(analysis, trend_text)
    }

    /// Per-node score reports
    pub fn nodes(&self, reports: &[NodeScoreReport]) -> Result<String> {
        self.render(reports, nodes_text)
    }

    /// Growth analysis
    pub fn growth(&self, growth: &GrowthAnalysis) -> Result<String> {
        self.render(growth, growth_text)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEXT RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

fn styled_rating(rating: HealthRating) -> StyledObject<&'static str> {
    let s = style(rating.as_str()).bold();
    match rating {
        HealthRating::Excellent | HealthRating::Good => s.green(),
        HealthRating::Fair => s.yellow(),
        HealthRating::Poor | HealthRating::Critical => s.red(),
    }
}

fn styled_trend(trend: Trend) -> StyledObject<&'static str> {
    let s = style(trend.as_str()).bold();
    match trend {
        Trend::Improving => s.green(),
        Trend::Stable => s.cyan(),
        Trend::Declining => s.red(),
        Trend::Unknown => s.dim(),
    }
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n", style(format!("=== {} ===", title)).cyan().bold()));
}

fn delta(value: Option<i16>) -> String {
    match value {
        Some(d) if d > 0 => style(format!("+{}", d)).green().to_string(),
        Some(d) if d < 0 => style(d.to_string()).red().to_string(),
        Some(_) => "0".to_string(),
        None => "-".to_string(),
    }
}

fn optional_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:+.1}%", v))
}

/// Text form of a network health report
pub fn health_text(score: &NetworkHealthScore) -> String {
    let mut out = format!(
        "{} {}/100 ({})\n{} {} online of {}\n",
        style("Overall:").bold(),
        score.overall,
        styled_rating(score.rating),
        style("Nodes:").bold(),
        score.online_count,
        score.node_count,
    );

    section(&mut out, "Components");
    for component in score.components.iter() {
        let value = if component.is_insufficient() {
            style("no data".to_string()).dim().to_string()
        } else {
            format!("{:5.1}", component.score)
        };
        out.push_str(&format!(
            "  {:<20} {}  [{}] x{}%\n    {}\n",
            component.label,
            value,
            component.status.as_str(),
            component.key.weight_pct(),
            style(component.key.description()).dim(),
        ));
    }

    if !score.recommendations.is_empty() {
        section(&mut out, "Recommendations");
        for rec in &score.recommendations {
            let marker = match rec.severity {
                Severity::Critical => style("✗").red(),
                Severity::Warning => style("⚠").yellow(),
                Severity::Info => style("ℹ").blue(),
            };
            out.push_str(&format!(
                "  {} {} ({} nodes)\n    {}\n",
                marker, rec.title, rec.affected_node_count, rec.suggested_action
            ));
        }
    }

    out
}

/// Text form of a history series
pub fn history_text(points: &[HistoryPoint]) -> String {
    let mut out = String::new();
    for point in points {
        let when = chrono::DateTime::from_timestamp(point.timestamp, 0)
            .map_or_else(|| point.timestamp.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string());
        out.push_str(&format!("{}  {:>3}  {}\n", when, point.overall, styled_rating(point.rating)));
    }
    out
}

/// Text form of a trend analysis
pub fn trend_text(analysis: &TrendAnalysis) -> String {
    let summary = &analysis.summary;
    let mut out = format!(
        "{} {}\n{} {}\n{} {} (min {}, max {})\n",
        style("Trend:").bold(),
        styled_trend(analysis.trend),
        style("Points:").bold(),
        summary.point_count,
        style("Latest:").bold(),
        summary.latest,
        summary.min,
        summary.max,
    );

    if let (Some(first), Some(last), Some(d)) =
        (summary.first_window_mean, summary.last_window_mean, summary.delta)
    {
        out.push_str(&format!(
            "{} {:.1} -> {:.1} ({:+.1})\n",
            style("Window means:").bold(),
            first,
            last,
            d
        ));
    }

    out
}

/// Text form of per-node reports
pub fn nodes_text(reports: &[NodeScoreReport]) -> String {
    let mut out = format!(
        "{}\n",
        style(format!(
            "{:<44} {:<16} {:>5} {:>6} {:>6}",
            "NODE", "MANAGER", "SCORE", "24H", "7D"
        ))
        .bold()
    );

    for report in reports {
        out.push_str(&format!(
            "{:<44} {:<16} {:>5} {:>6} {:>6}\n",
            report.id,
            report.manager.as_deref().unwrap_or("-"),
            report.current,
            delta(report.day_delta),
            delta(report.week_delta),
        ));
    }
    out
}

/// Text form of a growth analysis
pub fn growth_text(growth: &GrowthAnalysis) -> String {
    format!(
        "{} {} to {} ({} days)\n{} {}\n{} {:+.2}/day\n{} {}\n{} {}\n",
        style("Window:").bold(),
        growth.first_date,
        growth.last_date,
        growth.days,
        style("Node growth:").bold(),
        optional_percent(growth.node_growth_percent),
        style("Daily change:").bold(),
        growth.avg_daily_node_change,
        style("Page growth:").bold(),
        optional_percent(growth.page_growth_percent),
        style("Health trend:").bold(),
        styled_trend(growth.health_trend),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
