//! Human-facing rendering of an [`Allocation`]: formatted amounts, summary
//! text, CSV and tab-delimited exports.

use serde::Serialize;

use crate::types::{Allocation, CurrencyCode, SplitMode};

/// Suggested file name for CSV exports.
pub const CSV_FILE_NAME: &str = "royalty_split.csv";

const UNNAMED_COLLABORATOR: &str = "Unnamed collaborator";
const UNNAMED_PROJECT: &str = "Unnamed project";
const EXPORT_HEADER: [&str; 3] = ["Collaborator", "Share", "Amount"];

/// Fixed-point rendering of a minor-unit amount with exactly `precision` decimals.
pub fn format_amount(amount_minor: i64, precision: u32) -> String {
    if precision == 0 {
        return amount_minor.to_string();
    }
    let factor = 10u64.pow(precision);
    let abs = amount_minor.unsigned_abs();
    let sign = if amount_minor < 0 { "-" } else { "" };
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / factor,
        abs % factor,
        width = precision as usize
    )
}

/// Amount followed by its currency code, e.g. `100.00 USD`.
pub fn format_money(amount_minor: i64, precision: u32, currency: &CurrencyCode) -> String {
    format!("{} {}", format_amount(amount_minor, precision), currency)
}

/// Shortest rendering of a share number: `3`, `2.5`.
pub fn format_share(share: f64) -> String {
    if share == 0.0 {
        "0".to_string()
    } else {
        format!("{}", share)
    }
}

/// One exported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub collaborator: String,
    pub share: String,
    pub amount: String,
}

/// An allocation together with the labels needed to present it.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub title: Option<String>,
    pub currency: CurrencyCode,
    pub allocation: Allocation,
}

impl SplitReport {
    pub fn new(title: Option<String>, currency: CurrencyCode, allocation: Allocation) -> Self {
        Self {
            title,
            currency,
            allocation,
        }
    }

    pub fn title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => UNNAMED_PROJECT,
        }
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        let precision = self.allocation.precision;
        self.allocation
            .per_entry
            .iter()
            .map(|e| ReportRow {
                collaborator: if e.name.trim().is_empty() {
                    UNNAMED_COLLABORATOR.to_string()
                } else {
                    e.name.clone()
                },
                share: e.display_share.clone(),
                amount: format_amount(e.amount_minor, precision),
            })
            .collect()
    }

    pub fn total_display(&self) -> String {
        let a = &self.allocation;
        let factor = 10f64.powi(a.precision as i32);
        format_money((a.total * factor).round() as i64, a.precision, &self.currency)
    }

    pub fn allocated_display(&self) -> String {
        let a = &self.allocation;
        format_money(a.total_allocated_minor, a.precision, &self.currency)
    }

    pub fn remaining_display(&self) -> String {
        let a = &self.allocation;
        let factor = 10f64.powi(a.precision as i32);
        format_money((a.residual * factor).round() as i64, a.precision, &self.currency)
    }

    pub fn shares_display(&self) -> String {
        let a = &self.allocation;
        match a.mode {
            SplitMode::Percentage => format!("{:.2}%", a.sum_of_shares),
            SplitMode::Shares | SplitMode::Equal => format_share(a.sum_of_shares),
        }
    }

    /// One-line description of the split.
    pub fn summary(&self) -> String {
        let n = self.allocation.per_entry.len();
        if n == 0 {
            return format!("Awaiting calculation for {}.", self.title());
        }
        format!(
            "{}: {} collaborator{} splitting {}.",
            self.title(),
            n,
            if n == 1 { "" } else { "s" },
            self.allocated_display()
        )
    }

    /// CSV with a `Collaborator,Share,Amount` header.
    pub fn to_csv(&self) -> String {
        let mut lines = vec![EXPORT_HEADER.join(",")];
        lines.extend(self.rows().into_iter().map(|row| {
            [row.collaborator, row.share, row.amount]
                .iter()
                .map(|field| csv_field(field))
                .collect::<Vec<_>>()
                .join(",")
        }));
        lines.join("\n")
    }

    /// Tab-delimited text for pasting into spreadsheets.
    pub fn to_clipboard_text(&self) -> String {
        let mut lines = vec![EXPORT_HEADER.join("\t")];
        lines.extend(self.rows().into_iter().map(|row| {
            [row.collaborator, row.share, row.amount]
                .iter()
                .map(|field| field.replace(['\t', '\r', '\n'], " "))
                .collect::<Vec<_>>()
                .join("\t")
        }));
        lines.join("\n")
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
