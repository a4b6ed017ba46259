use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::allocator::Allocator;
use crate::error::SplitError;
use crate::parse::parse_total;
use crate::report::SplitReport;
use crate::types::{Allocation, CurrencyCode, Entry, SplitMode};

/// Key used when the caller does not name a saved split.
pub const DEFAULT_SPLIT_KEY: &str = "royalty-split";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("split store IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("split store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no saved split named '{0}'")]
    NotFound(String),
    #[error("saved split '{key}' does not match its fingerprint")]
    FingerprintMismatch { key: String },
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// The inputs of a split, as entered. Outputs are never stored: they are
/// recomputed from these on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    #[serde(default)]
    pub project_title: Option<String>,
    /// Total as typed; parsed on every allocation.
    pub total: String,
    #[serde(default)]
    pub mode: SplitMode,
    pub precision: u32,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl SplitSettings {
    pub fn new(total: impl Into<String>, mode: SplitMode, precision: u32) -> Self {
        Self {
            project_title: None,
            total: total.into(),
            mode,
            precision,
            currency: CurrencyCode::default(),
            entries: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.project_title = Some(title.into());
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn allocate(&self) -> Result<Allocation, SplitError> {
        self.allocate_with(&Allocator::default())
    }

    pub fn allocate_with(&self, allocator: &Allocator) -> Result<Allocation, SplitError> {
        let total = parse_total(&self.total)?;
        allocator.allocate(total, &self.entries, self.mode, self.precision)
    }

    pub fn report(&self) -> Result<SplitReport, SplitError> {
        self.report_with(&Allocator::default())
    }

    pub fn report_with(&self, allocator: &Allocator) -> Result<SplitReport, SplitError> {
        Ok(SplitReport::new(
            self.project_title.clone(),
            self.currency.clone(),
            self.allocate_with(allocator)?,
        ))
    }

    /// Copy with undefined weights stored as blanks, so the settings survive
    /// a JSON round trip unchanged.
    pub fn normalized(&self) -> Self {
        let mut settings = self.clone();
        for entry in &mut settings.entries {
            entry.weight = entry.defined_weight();
        }
        settings
    }

    /// BLAKE3 digest of the canonical JSON encoding.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSplit {
    pub key: String,
    pub settings: SplitSettings,
    pub fingerprint: String,
    pub saved_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreData {
    splits: BTreeMap<String, SavedSplit>,
}

/// File-backed key-value store of split inputs.
///
/// The file is rewritten after every mutation so saved splits survive restarts.
#[derive(Debug)]
pub struct SplitStore {
    path: PathBuf,
    data: StoreData,
}

impl SplitStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let bytes = fs::read(&path)?;
            if bytes.is_empty() {
                StoreData::default()
            } else {
                serde_json::from_slice(&bytes)?
            }
        } else {
            StoreData::default()
        };

        debug!(path = %path.display(), splits = data.splits.len(), "split store loaded");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&mut self, key: &str, settings: &SplitSettings) -> Result<&SavedSplit, StoreError> {
        let settings = settings.normalized();
        let fingerprint = settings.fingerprint()?;
        let now = Utc::now();
        let saved_at = self
            .data
            .splits
            .get(key)
            .map(|existing| existing.saved_at)
            .unwrap_or(now);

        self.data.splits.insert(
            key.to_string(),
            SavedSplit {
                key: key.to_string(),
                settings,
                fingerprint,
                saved_at,
                updated_at: now,
            },
        );
        self.persist()?;
        info!(key, path = %self.path.display(), "split saved");

        self.data
            .splits
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Fetch a saved split, verifying it against its fingerprint.
    pub fn get(&self, key: &str) -> Result<&SavedSplit, StoreError> {
        let saved = self
            .data
            .splits
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if saved.settings.fingerprint()? != saved.fingerprint {
            return Err(StoreError::FingerprintMismatch {
                key: key.to_string(),
            });
        }
        Ok(saved)
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<SavedSplit>, StoreError> {
        let removed = self.data.splits.remove(key);
        self.persist()?;
        if removed.is_some() {
            info!(key, "split removed");
        }
        Ok(removed)
    }

    pub fn keys(&self) -> Vec<String> {
        self.data.splits.keys().cloned().collect()
    }

    /// All saved splits, oldest first.
    pub fn list(&self) -> Vec<SavedSplit> {
        let mut values: Vec<SavedSplit> = self.data.splits.values().cloned().collect();
        values.sort_by_key(|item| item.saved_at);
        values
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(&self.data)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}
