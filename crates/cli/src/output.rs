//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use herd_lib::{ModelState, RiskLevel};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a table with the rounded style
pub fn print_table<T: tabled::Tabled>(rows: Vec<T>) {
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a probability as a percentage
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Color a risk level
pub fn color_risk(level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => level.as_str().green().to_string(),
        RiskLevel::Medium => level.as_str().yellow().to_string(),
        RiskLevel::High => level.as_str().red().bold().to_string(),
    }
}

/// Color a model state
pub fn color_state(state: ModelState) -> String {
    match state {
        ModelState::Loaded => "loaded".green().to_string(),
        ModelState::FallbackOnly => "fallback_only".yellow().to_string(),
        ModelState::Unloaded => "unloaded".red().to_string(),
    }
}

/// Color an evaluation score (R² or accuracy)
pub fn color_score(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    if value >= 0.9 {
        formatted.green().to_string()
    } else if value >= 0.7 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(0.95), "95.0%");
        assert_eq!(format_probability(0.053), "5.3%");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.00Ki");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00Mi");
    }
}
