//! # royalty-split-core
//!
//! Exact-sum royalty allocation. A total is divided between payees by
//! percentage, relative shares, or equally, and every payee's amount is
//! rounded to the currency precision such that the rounded amounts add up
//! to the rounded total with no drift.
//!
//! ## Method
//!
//! Largest-remainder (Hamilton) apportionment in integer minor units:
//! each ideal share is truncated, then the leftover units go one at a time
//! to the payees with the largest discarded fractions, lowest index first
//! on ties.
//!
//! ## Fallbacks
//!
//! - No usable weight anywhere → equal split, whatever the mode.
//! - Percentages that do not sum to 100 → renormalized by their actual sum.
//!
//! Both are reported on the [`Allocation`] rather than raised as errors.
//!
//! ## Around the engine
//!
//! - [`report`] renders amounts, summary text, CSV and tab-delimited exports.
//! - [`store`] persists split *inputs* to a local JSON file; outputs are
//!   always recomputed.

#![deny(unsafe_code)]

pub mod allocator;
pub mod error;
pub mod parse;
pub mod remainder;
pub mod report;
pub mod store;
pub mod types;

pub use allocator::{allocate, Allocator, AllocatorConfig, MAX_PRECISION};
pub use error::SplitError;
pub use parse::{parse_precision, parse_total, parse_weight};
pub use remainder::{rank_by_remainder, remainder_bumps};
pub use report::{format_amount, format_money, format_share, ReportRow, SplitReport, CSV_FILE_NAME};
pub use store::{SavedSplit, SplitSettings, SplitStore, StoreError, DEFAULT_SPLIT_KEY};
pub use types::{
    AllocatedEntry, Allocation, CurrencyCode, Entry, EntryId, Fallback, SplitMode,
};
