use aisle_core::models::CatalogVocabulary;
use aisle_extraction::{extract_price, keep_most_specific, RuleBasedExtractor};
use proptest::prelude::*;

fn vocab() -> CatalogVocabulary {
    CatalogVocabulary {
        categories: vec!["Red Wine".into(), "Wine".into(), "Beer".into()],
        types: vec!["Dry".into()],
        soft_categories: vec!["Italy".into(), "Pasta".into()],
        colors: vec!["red".into()],
    }
}

proptest! {
    #[test]
    fn range_bounds_are_ordered(a in 1u32..10_000, b in 1u32..10_000) {
        let m = extract_price(&format!("wine {a}-{b}")).unwrap();
        let (lo, hi) = (m.min_price.unwrap(), m.max_price.unwrap());
        prop_assert!(lo <= hi);
        prop_assert_eq!(lo, a.min(b) as f64);
        prop_assert_eq!(hi, a.max(b) as f64);
    }

    #[test]
    fn upper_bound_round_trips(n in 1u32..100_000) {
        let m = extract_price(&format!("up to {n}")).unwrap();
        prop_assert_eq!(m.max_price, Some(n as f64));
        prop_assert_eq!(m.min_price, None);
    }

    #[test]
    fn coverage_is_a_ratio(q in "[a-z ]{0,40}") {
        let r = RuleBasedExtractor::new().analyze(&q, &vocab());
        prop_assert!(r.covered_tokens <= r.meaningful_tokens);
        let c = r.coverage();
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn most_specific_is_idempotent(
        values in proptest::collection::vec(
            prop_oneof![
                Just("Wine".to_string()),
                Just("Red Wine".to_string()),
                Just("red wine".to_string()),
                Just("Beer".to_string()),
                Just("Dry Red Wine".to_string()),
            ],
            0..6,
        )
    ) {
        let once = keep_most_specific(values);
        let twice = keep_most_specific(once.clone());
        prop_assert_eq!(once, twice);
    }
}
