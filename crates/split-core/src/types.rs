use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SplitError;

/// Opaque entry identifier, stable across recomputation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency label carried alongside amounts. No conversion is ever applied.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self("USD".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payee taking part in a split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// Display name, passed through untouched. May be empty.
    #[serde(default)]
    pub name: String,
    /// Weight as entered. `None`, NaN and infinities all mean "undefined".
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Entry {
    /// New entry with a generated id and a trimmed name.
    pub fn new(name: impl AsRef<str>, weight: Option<f64>) -> Self {
        Self {
            id: EntryId::generate(),
            name: name.as_ref().trim().to_string(),
            weight,
        }
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, weight: Option<f64>) -> Self {
        Self {
            id: EntryId::new(id),
            name: name.into(),
            weight,
        }
    }

    /// The weight if it is a usable number.
    pub fn defined_weight(&self) -> Option<f64> {
        self.weight.filter(|w| w.is_finite())
    }
}

/// Weighting policy for a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Weights are parts of 100.
    #[default]
    #[serde(alias = "percent")]
    Percentage,
    /// Weights are relative proportions normalized by their sum.
    Shares,
    /// Weights are ignored; every entry counts once.
    Equal,
}

impl SplitMode {
    pub const ALL: [SplitMode; 3] = [SplitMode::Percentage, SplitMode::Shares, SplitMode::Equal];

    /// Raw share weight for one entry under this mode.
    pub fn derive_weight(self, entry: &Entry) -> f64 {
        match self {
            SplitMode::Percentage | SplitMode::Shares => entry.defined_weight().unwrap_or(0.0),
            SplitMode::Equal => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplitMode::Percentage => "percentage",
            SplitMode::Shares => "shares",
            SplitMode::Equal => "equal",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMode {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(SplitMode::Percentage),
            "shares" | "share" => Ok(SplitMode::Shares),
            "equal" => Ok(SplitMode::Equal),
            other => Err(SplitError::invalid(
                "mode",
                format!("unknown split mode '{}'", other),
            )),
        }
    }
}

/// Which fallback, if any, shaped the derived weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// No usable weight anywhere; every entry counted once.
    EqualSplit,
    /// Percentages did not sum to 100 and were divided by their actual sum.
    Renormalized,
}

/// One entry's share of the total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocatedEntry {
    pub id: EntryId,
    pub name: String,
    /// Derived weight after fallbacks.
    pub raw_share: f64,
    /// Share as shown to users, e.g. `25.00%` or `3`.
    pub display_share: String,
    /// Amount in minor units (`10^-precision`).
    pub amount_minor: i64,
    pub amount: f64,
}

/// Result of an allocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub mode: SplitMode,
    pub precision: u32,
    /// The total as supplied, before rounding.
    pub total: f64,
    pub per_entry: Vec<AllocatedEntry>,
    pub total_allocated_minor: i64,
    pub total_allocated: f64,
    /// `total - total_allocated`; non-zero only for sub-precision totals.
    pub residual: f64,
    /// Sum of display shares: 100 in percentage mode, the share sum otherwise.
    pub sum_of_shares: f64,
    /// Sum of the usable weights as declared, before any fallback.
    pub declared_share_total: f64,
    /// Declared percentages are within 0.01 of 100. Always true outside percentage mode.
    pub percentage_complete: bool,
    pub fallback: Option<Fallback>,
}

impl Allocation {
    pub fn amounts_minor(&self) -> Vec<i64> {
        self.per_entry.iter().map(|e| e.amount_minor).collect()
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.per_entry.iter().map(|e| e.amount).collect()
    }

    pub fn get(&self, id: &EntryId) -> Option<&AllocatedEntry> {
        self.per_entry.iter().find(|e| &e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.per_entry.is_empty()
    }
}
