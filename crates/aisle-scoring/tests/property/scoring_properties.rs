use aisle_core::models::{Candidate, Product, StockStatus, TierTag};
use aisle_scoring::colors::expand_similar_colors;
use aisle_scoring::fusion::ScoreFusion;
use aisle_scoring::hebrew::stem_hebrew;
use aisle_scoring::levenshtein::{levenshtein, similarity};
use proptest::prelude::*;

fn candidate(id: &str) -> Candidate {
    Candidate::new(
        Product {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            price: 1.0,
            category: vec![],
            product_type: vec![],
            soft_category: vec![],
            colors: vec![],
            stock_status: StockStatus::InStock,
            embedding: vec![],
            image_url: None,
            on_sale: false,
        },
        TierTag::TextMatch,
    )
}

proptest! {
    #[test]
    fn stem_hebrew_is_idempotent(w in "[א-ת]{0,12}") {
        let once = stem_hebrew(&w);
        prop_assert_eq!(stem_hebrew(&once), once);
    }

    #[test]
    fn levenshtein_is_symmetric(a in "\\PC{0,30}", b in "\\PC{0,30}") {
        prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
    }

    #[test]
    fn levenshtein_identity(a in "\\PC{0,30}") {
        prop_assert_eq!(levenshtein(&a, &a), 0);
        prop_assert_eq!(similarity(&a, &a), 1.0);
    }

    #[test]
    fn similarity_in_unit_interval(a in "\\PC{0,30}", b in "\\PC{0,30}") {
        let s = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn color_expansion_is_idempotent(colors in prop::collection::vec("red|white|navy|olive|בורדו|[a-z]{3,6}", 0..4)) {
        let once = expand_similar_colors(&colors);
        let again: Vec<String> = once.iter().cloned().collect();
        prop_assert_eq!(expand_similar_colors(&again), once);
    }

    #[test]
    fn higher_exact_bonus_ranks_strictly_higher(
        rrf in 0.0f64..0.1,
        soft in 0u32..3,
        low in 0u32..200_000,
        delta in 1u32..50_000,
    ) {
        let fusion = ScoreFusion::default();
        let mut a = candidate("a");
        let mut b = candidate("b");
        for c in [&mut a, &mut b] {
            c.rrf_score = rrf;
            c.soft_category_match_count = soft;
        }
        a.exact_match_bonus = low + delta;
        b.exact_match_bonus = low;
        fusion.recompute_final(&mut a);
        fusion.recompute_final(&mut b);
        // "b" sorts before "a" on the id tie-break, so only the bonus can win.
        prop_assert_eq!(fusion.compare(&a, &b, true), std::cmp::Ordering::Less);
    }

    #[test]
    fn dual_source_beats_single_source(k_rank in 0usize..100) {
        let fusion = ScoreFusion::default();
        prop_assert!(fusion.rrf(Some(k_rank), Some(0)) >= fusion.rrf(None, Some(0)));
    }
}
