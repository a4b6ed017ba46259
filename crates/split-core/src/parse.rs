//! Text → number conversions for values that arrive as user-typed strings.

use crate::error::SplitError;

fn strip_grouping(text: &str) -> String {
    text.trim().chars().filter(|c| *c != ',' && *c != '_').collect()
}

/// Parse a total amount. Blank input reads as zero.
pub fn parse_total(text: &str) -> Result<f64, SplitError> {
    let cleaned = strip_grouping(text);
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| SplitError::invalid("total", format!("'{}' is not a number", text.trim())))?;
    if !value.is_finite() {
        return Err(SplitError::invalid("total", "must be finite"));
    }
    Ok(value)
}

/// Parse a weight. Blank or unparsable input is undefined, not an error.
pub fn parse_weight(text: &str) -> Option<f64> {
    let cleaned = strip_grouping(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|w| w.is_finite())
}

/// Parse a precision (decimal digits).
pub fn parse_precision(text: &str) -> Result<u32, SplitError> {
    text.trim().parse::<u32>().map_err(|_| {
        SplitError::invalid(
            "precision",
            format!("'{}' is not a non-negative integer", text.trim()),
        )
    })
}
