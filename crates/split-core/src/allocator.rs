use tracing::{debug, warn};

use crate::error::SplitError;
use crate::remainder::remainder_bumps;
use crate::report::format_share;
use crate::types::{AllocatedEntry, Allocation, Entry, Fallback, SplitMode};

/// Largest supported number of decimal digits.
pub const MAX_PRECISION: u32 = 8;

/// 2^53: beyond this, minor-unit counts stop being exact in `f64`.
const MAX_EXACT_UNITS: f64 = 9_007_199_254_740_992.0;

/// Scaled amounts this close to an integer are treated as that integer.
const SNAP_EPSILON: f64 = 1e-7;

/// Allocation policy knobs.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Precision values above this are rejected.
    pub max_precision: u32,
    /// Declared percentages within this distance of 100 count as complete.
    pub percent_tolerance: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_precision: MAX_PRECISION,
            percent_tolerance: 0.01,
        }
    }
}

/// Exact-sum allocation engine.
///
/// Stateless apart from its configuration: the same input always yields the
/// same [`Allocation`], and nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    config: AllocatorConfig,
}

/// Derived weights plus the bookkeeping needed for display.
struct Weights {
    values: Vec<f64>,
    declared_total: f64,
    divisor: f64,
    fallback: Option<Fallback>,
}

impl Allocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Split `total` across `entries` so the rounded amounts sum exactly to
    /// `total` rounded to `precision` digits.
    pub fn allocate(
        &self,
        total: f64,
        entries: &[Entry],
        mode: SplitMode,
        precision: u32,
    ) -> Result<Allocation, SplitError> {
        let factor = self.validate(total, entries, mode, precision)?;
        let rounded_total_minor = (total * factor).round() as i64;

        if entries.is_empty() {
            return Ok(Allocation {
                mode,
                precision,
                total,
                per_entry: Vec::new(),
                total_allocated_minor: 0,
                total_allocated: 0.0,
                residual: total,
                sum_of_shares: 0.0,
                declared_share_total: 0.0,
                percentage_complete: mode != SplitMode::Percentage,
                fallback: None,
            });
        }

        let weights = derive_weights(entries, mode, self.config.percent_tolerance);
        if let Some(fallback) = weights.fallback {
            warn!(?fallback, %mode, entries = entries.len(), "share weights adjusted");
        }

        let total_scaled = total * factor;
        let mut floors = Vec::with_capacity(entries.len());
        let mut remainders = Vec::with_capacity(entries.len());
        for w in &weights.values {
            let scaled = snap(total_scaled * w / weights.divisor);
            let floor = scaled.floor();
            floors.push(floor as i64);
            remainders.push(scaled - floor);
        }

        let correction = rounded_total_minor - floors.iter().sum::<i64>();
        let bumps = remainder_bumps(&remainders, correction.unsigned_abs())?;
        let step = correction.signum();
        let mut amounts = floors;
        for idx in bumps {
            amounts[idx] += step;
        }
        debug_assert_eq!(amounts.iter().sum::<i64>(), rounded_total_minor);

        debug!(
            entries = entries.len(),
            %mode,
            precision,
            rounded_total_minor,
            correction,
            "allocation computed"
        );

        let percentage = mode == SplitMode::Percentage;
        let per_entry = entries
            .iter()
            .zip(weights.values.iter())
            .zip(amounts)
            .map(|((entry, &w), amount_minor)| AllocatedEntry {
                id: entry.id.clone(),
                name: entry.name.clone(),
                raw_share: w,
                display_share: if percentage {
                    format!("{:.2}%", w * 100.0 / weights.divisor)
                } else {
                    format_share(w)
                },
                amount_minor,
                amount: amount_minor as f64 / factor,
            })
            .collect();

        let total_allocated = rounded_total_minor as f64 / factor;
        Ok(Allocation {
            mode,
            precision,
            total,
            per_entry,
            total_allocated_minor: rounded_total_minor,
            total_allocated,
            residual: total - total_allocated,
            sum_of_shares: if percentage {
                100.0
            } else {
                weights.values.iter().sum()
            },
            declared_share_total: weights.declared_total,
            percentage_complete: !percentage
                || within_tolerance(weights.declared_total, self.config.percent_tolerance),
            fallback: weights.fallback,
        })
    }

    /// Checks every input and returns `10^precision`.
    fn validate(
        &self,
        total: f64,
        entries: &[Entry],
        mode: SplitMode,
        precision: u32,
    ) -> Result<f64, SplitError> {
        if !total.is_finite() {
            return Err(SplitError::invalid("total", "must be finite"));
        }
        if total < 0.0 {
            return Err(SplitError::invalid(
                "total",
                format!("must be non-negative, got {}", total),
            ));
        }
        if precision > self.config.max_precision {
            return Err(SplitError::invalid(
                "precision",
                format!(
                    "{} exceeds the maximum of {}",
                    precision, self.config.max_precision
                ),
            ));
        }

        let factor = 10f64.powi(precision as i32);
        if total * factor > MAX_EXACT_UNITS {
            return Err(SplitError::invalid(
                "total",
                format!("{} is too large for {} decimal digits", total, precision),
            ));
        }

        if mode != SplitMode::Equal {
            if let Some(entry) = entries
                .iter()
                .find(|e| e.defined_weight().is_some_and(|w| w < 0.0))
            {
                return Err(SplitError::invalid(
                    "weight",
                    format!("entry {} has a negative weight", entry.id),
                ));
            }
        }

        Ok(factor)
    }
}

/// Allocate with the default configuration.
pub fn allocate(
    total: f64,
    entries: &[Entry],
    mode: SplitMode,
    precision: u32,
) -> Result<Allocation, SplitError> {
    Allocator::default().allocate(total, entries, mode, precision)
}

fn derive_weights(entries: &[Entry], mode: SplitMode, tolerance: f64) -> Weights {
    let mut values: Vec<f64> = entries.iter().map(|e| mode.derive_weight(e)).collect();
    let declared_total: f64 = values.iter().sum();
    let mut fallback = None;

    if values.iter().all(|w| *w == 0.0) || declared_total <= 0.0 {
        values.iter_mut().for_each(|w| *w = 1.0);
        fallback = Some(Fallback::EqualSplit);
    }

    // Percentages are always divided by their actual sum. Only a sum outside
    // the tolerance is reported as renormalized.
    let divisor: f64 = values.iter().sum();
    if mode == SplitMode::Percentage
        && fallback.is_none()
        && !within_tolerance(declared_total, tolerance)
    {
        fallback = Some(Fallback::Renormalized);
    }

    Weights {
        values,
        declared_total,
        divisor,
        fallback,
    }
}

fn within_tolerance(declared_total: f64, tolerance: f64) -> bool {
    (declared_total - 100.0).abs() < tolerance
}

fn snap(scaled: f64) -> f64 {
    let nearest = scaled.round();
    if (scaled - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        scaled
    }
}
