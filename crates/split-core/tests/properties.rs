//! Property tests: allocation sums exactly, never goes negative, is
//! monotone in each payee's own weight, and is a pure function of its input.

use proptest::prelude::*;
use royalty_split_core::*;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_mode() -> impl Strategy<Value = SplitMode> {
    prop_oneof![
        Just(SplitMode::Percentage),
        Just(SplitMode::Shares),
        Just(SplitMode::Equal),
    ]
}

/// Blank, whole-number, fractional, and heavily skewed weights.
fn arb_weight() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        2 => Just(None),
        2 => Just(Some(0.0)),
        4 => (0u32..=100).prop_map(|w| Some(w as f64)),
        3 => (0.0f64..100.0).prop_map(Some),
        1 => (1_000_000u32..=5_000_000).prop_map(|w| Some(w as f64)),
    ]
}

fn arb_entries(min: usize, max: usize) -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(arb_weight(), min..max).prop_map(|weights| {
        weights
            .into_iter()
            .enumerate()
            .map(|(i, w)| Entry::with_id(format!("payee-{}", i), format!("Payee {}", i), w))
            .collect()
    })
}

fn arb_total() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        (0u64..=100_000_000).prop_map(|cents| cents as f64 / 100.0),
        0.0f64..1_000_000.0,
    ]
}

fn rounded_minor(total: f64, precision: u32) -> i64 {
    (total * 10f64.powi(precision as i32)).round() as i64
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Rounded amounts always add up to the rounded total.
    #[test]
    fn amounts_sum_to_rounded_total(
        total in arb_total(),
        entries in arb_entries(1, 16),
        mode in arb_mode(),
        precision in 0u32..=MAX_PRECISION,
    ) {
        let alloc = allocate(total, &entries, mode, precision).unwrap();
        let expected = rounded_minor(total, precision);
        prop_assert_eq!(alloc.amounts_minor().iter().sum::<i64>(), expected);
        prop_assert_eq!(alloc.total_allocated_minor, expected);
        prop_assert_eq!(alloc.per_entry.len(), entries.len());
    }

    /// Non-negative totals and weights never produce a negative amount.
    #[test]
    fn amounts_are_non_negative(
        total in arb_total(),
        entries in arb_entries(1, 16),
        mode in arb_mode(),
        precision in 0u32..=MAX_PRECISION,
    ) {
        let alloc = allocate(total, &entries, mode, precision).unwrap();
        for entry in &alloc.per_entry {
            prop_assert!(entry.amount_minor >= 0, "negative amount for {}", entry.id);
        }
    }

    /// Raising one payee's weight never lowers that payee's amount.
    #[test]
    fn amount_is_monotone_in_own_weight(
        total in arb_total(),
        others in prop::collection::vec(prop::option::of(0u32..=100), 0..8),
        own in 0u32..=100,
        bump in 1u32..=50,
        position in 0usize..8,
        mode in prop_oneof![Just(SplitMode::Percentage), Just(SplitMode::Shares)],
        precision in 0u32..=3,
    ) {
        let position = position.min(others.len());
        let build = |own_weight: u32| -> Vec<Entry> {
            let mut weights: Vec<Option<f64>> =
                others.iter().map(|w| w.map(|w| w as f64)).collect();
            weights.insert(position, Some(own_weight as f64));
            weights
                .into_iter()
                .enumerate()
                .map(|(i, w)| Entry::with_id(format!("p{}", i), "", w))
                .collect()
        };

        let before = allocate(total, &build(own), mode, precision).unwrap();
        let after = allocate(total, &build(own + bump), mode, precision).unwrap();
        prop_assert!(
            after.per_entry[position].amount_minor >= before.per_entry[position].amount_minor,
            "weight {} -> {} lowered amount {} -> {}",
            own,
            own + bump,
            before.per_entry[position].amount_minor,
            after.per_entry[position].amount_minor,
        );
    }

    /// Identical input, identical output.
    #[test]
    fn allocation_is_idempotent(
        total in arb_total(),
        entries in arb_entries(0, 12),
        mode in arb_mode(),
        precision in 0u32..=MAX_PRECISION,
    ) {
        let first = allocate(total, &entries, mode, precision).unwrap();
        let second = allocate(total, &entries, mode, precision).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Equal splits differ by at most one minor unit, extra units going to the front.
    #[test]
    fn equal_split_is_balanced(
        total in arb_total(),
        entries in arb_entries(1, 16),
        precision in 0u32..=4,
    ) {
        let alloc = allocate(total, &entries, SplitMode::Equal, precision).unwrap();
        let amounts = alloc.amounts_minor();
        let max = *amounts.iter().max().unwrap();
        let min = *amounts.iter().min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(amounts.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Without any usable weight every mode degrades to an equal split.
    #[test]
    fn unusable_weights_fall_back_to_equal(
        total in arb_total(),
        blanks in prop::collection::vec(prop_oneof![Just(None), Just(Some(0.0)), Just(Some(f64::NAN))], 1..10),
        mode in arb_mode(),
        precision in 0u32..=3,
    ) {
        let entries: Vec<Entry> = blanks
            .into_iter()
            .enumerate()
            .map(|(i, w)| Entry::with_id(format!("b{}", i), "", w))
            .collect();
        let alloc = allocate(total, &entries, mode, precision).unwrap();
        let equal = allocate(total, &entries, SplitMode::Equal, precision).unwrap();
        prop_assert_eq!(alloc.amounts_minor(), equal.amounts_minor());
        if mode != SplitMode::Equal {
            prop_assert_eq!(alloc.fallback, Some(Fallback::EqualSplit));
        }
    }

    /// Bumps stay in range and favour larger remainders.
    #[test]
    fn remainder_bumps_respect_ranking(
        remainders in prop::collection::vec(0.0f64..1.0, 1..20),
        units_seed in 0usize..20,
    ) {
        let units = units_seed % (remainders.len() + 1);
        let bumps = remainder_bumps(&remainders, units as u64).unwrap();
        prop_assert_eq!(bumps.len(), units);
        for pair in bumps.windows(2) {
            prop_assert!(remainders[pair[0]] >= remainders[pair[1]]);
        }
        let mut seen = bumps.clone();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), units);
    }

    /// A saved split reloaded from disk passes its fingerprint check and
    /// reproduces the allocation, whatever the weights' mantissas.
    #[test]
    fn stored_split_survives_reload(
        weights in prop::collection::vec(prop::option::of(0.0f64..100.0), 1..8),
        mode in arb_mode(),
        precision in 0u32..=MAX_PRECISION,
    ) {
        let entries: Vec<Entry> = weights
            .into_iter()
            .enumerate()
            .map(|(i, w)| Entry::with_id(format!("s{}", i), format!("Saved {}", i), w))
            .collect();
        let settings = SplitSettings {
            project_title: None,
            total: "12345.67".into(),
            mode,
            precision,
            currency: CurrencyCode::default(),
            entries,
        };
        let path = std::env::temp_dir()
            .join(format!("royalty-split-prop-{}", Uuid::new_v4()))
            .join("splits.json");

        let mut store = SplitStore::load(&path).unwrap();
        store.save("prop", &settings).unwrap();
        let reloaded = SplitStore::load(&path).unwrap();
        let saved = reloaded.get("prop");
        prop_assert!(saved.is_ok(), "reload failed: {:?}", saved.as_ref().err());
        let saved = saved.unwrap();
        prop_assert_eq!(&saved.settings, &settings);
        prop_assert_eq!(saved.settings.allocate().unwrap(), settings.allocate().unwrap());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    /// Saved inputs reproduce the same allocation once reloaded.
    #[test]
    fn settings_round_trip_reproduces_allocation(
        total_cents in 0u64..=10_000_000,
        entries in arb_entries(1, 10),
        mode in arb_mode(),
        precision in 0u32..=3,
    ) {
        let settings = SplitSettings {
            project_title: Some("Round trip".into()),
            total: format!("{}.{:02}", total_cents / 100, total_cents % 100),
            mode,
            precision,
            currency: CurrencyCode::default(),
            entries,
        };
        let json = serde_json::to_string(&settings.normalized()).unwrap();
        let restored: SplitSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored.allocate().unwrap(), settings.allocate().unwrap());
    }
}

#[test]
fn unstable_is_unreachable_for_valid_input_but_guarded() {
    // A correction of more than n full passes cannot come out of the
    // allocator; only a direct call with a bogus count reaches the guard.
    let err = remainder_bumps(&[0.5, 0.25, 0.25], 10).unwrap_err();
    assert!(err.is_unstable());
}
