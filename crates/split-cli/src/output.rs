//! Output formatting utilities

use crate::error::{CliError, CliResult};
use colored::*;
use royalty_split_core::{Fallback, SavedSplit, SplitReport};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table with totals
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Comma-separated values
    Csv,
    /// Tab-delimited text for pasting
    Text,
}

#[derive(Debug, Serialize, Tabled)]
struct AllocationRow {
    #[tabled(rename = "Collaborator")]
    collaborator: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Serialize, Tabled)]
struct SavedSplitRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Payees")]
    payees: usize,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> CliResult<String> {
    serde_json::to_string_pretty(data).map_err(|e| CliError::Output(e.to_string()))
}

fn to_yaml<T: Serialize + ?Sized>(data: &T) -> CliResult<String> {
    serde_yaml::to_string(data).map_err(|e| CliError::Output(e.to_string()))
}

/// Render a computed split in the requested format.
pub fn render_report(report: &SplitReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<AllocationRow> = report
                .rows()
                .into_iter()
                .map(|row| AllocationRow {
                    collaborator: row.collaborator,
                    share: row.share,
                    amount: row.amount,
                })
                .collect();

            let mut out = Vec::new();
            out.push(report.summary().bold().to_string());
            if rows.is_empty() {
                out.push("No payees".dimmed().to_string());
            } else {
                out.push(Table::new(rows).to_string());
            }
            out.push(format!("Total:     {}", report.total_display()));
            out.push(format!("Allocated: {}", report.allocated_display()));
            out.push(format!("Shares:    {}", report.shares_display()));
            out.push(format!("Remaining: {}", report.remaining_display()));
            Ok(out.join("\n"))
        }
        OutputFormat::Json => to_json(report),
        OutputFormat::Yaml => to_yaml(report),
        OutputFormat::Csv => Ok(report.to_csv()),
        OutputFormat::Text => Ok(report.to_clipboard_text()),
    }
}

/// Render the saved-split listing.
pub fn render_saved(splits: &[SavedSplit], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(splits),
        OutputFormat::Yaml => to_yaml(splits),
        OutputFormat::Table | OutputFormat::Csv | OutputFormat::Text => {
            if splits.is_empty() {
                return Ok("No saved splits".dimmed().to_string());
            }
            let rows: Vec<SavedSplitRow> = splits
                .iter()
                .map(|s| SavedSplitRow {
                    key: s.key.clone(),
                    title: s.settings.project_title.clone().unwrap_or_default(),
                    mode: s.settings.mode.to_string(),
                    payees: s.settings.entries.len(),
                    total: format!("{} {}", s.settings.total, s.settings.currency),
                    updated: s.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            Ok(Table::new(rows).to_string())
        }
    }
}

/// Notes about fallbacks that shaped the allocation, for stderr.
pub fn report_warnings(report: &SplitReport) -> Vec<String> {
    let allocation = &report.allocation;
    let mut warnings = Vec::new();
    match allocation.fallback {
        Some(Fallback::EqualSplit) => {
            warnings.push("No usable weights given; split equally".to_string())
        }
        Some(Fallback::Renormalized) => warnings.push(format!(
            "Percentages sum to {:.2}%, not 100%; renormalized by their sum",
            allocation.declared_share_total
        )),
        None => {}
    }
    warnings
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use royalty_split_core::{allocate, CurrencyCode, Entry, SplitMode};

    fn report(weights: &[Option<f64>], mode: SplitMode) -> SplitReport {
        let entries: Vec<Entry> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| Entry::with_id(format!("{}", i), format!("P{}", i), *w))
            .collect();
        let allocation = allocate(100.0, &entries, mode, 2).unwrap();
        SplitReport::new(Some("Demo".into()), CurrencyCode::default(), allocation)
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn table_lists_rows_and_totals() {
        colored::control::set_override(false);
        let r = report(&[Some(60.0), Some(40.0)], SplitMode::Percentage);
        let out = render_report(&r, OutputFormat::Table).unwrap();
        assert!(out.contains("Demo: 2 collaborators splitting 100.00 USD."));
        assert!(out.contains("Collaborator"));
        assert!(out.contains("60.00"));
        assert!(out.contains("Remaining: 0.00 USD"));
        assert!(out.contains("Shares:    100.00%"));
    }

    #[test]
    fn json_contains_allocation() {
        let r = report(&[Some(1.0), Some(1.0)], SplitMode::Shares);
        let out = render_report(&r, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["allocation"]["total_allocated_minor"], 10_000);
        assert_eq!(value["allocation"]["per_entry"][0]["amount"], 50.0);
    }

    #[test]
    fn csv_and_text_delegate_to_report() {
        let r = report(&[Some(1.0)], SplitMode::Shares);
        assert_eq!(render_report(&r, OutputFormat::Csv).unwrap(), r.to_csv());
        assert_eq!(
            render_report(&r, OutputFormat::Text).unwrap(),
            r.to_clipboard_text()
        );
    }

    #[test]
    fn warnings_for_fallbacks() {
        let renorm = report(&[Some(40.0), Some(40.0)], SplitMode::Percentage);
        assert_eq!(
            report_warnings(&renorm),
            vec!["Percentages sum to 80.00%, not 100%; renormalized by their sum".to_string()]
        );

        let close = report(&[Some(33.3), Some(33.3), Some(33.3)], SplitMode::Percentage);
        assert!(report_warnings(&close)[0].contains("sum to 99.90%"));

        let equal = report(&[None, None], SplitMode::Percentage);
        assert!(report_warnings(&equal)[0].contains("split equally"));

        let fine = report(&[Some(50.0), Some(50.0)], SplitMode::Percentage);
        assert!(report_warnings(&fine).is_empty());
    }
}
