//! Final hard-filter gate.
//!
//! Every returned candidate satisfies all present hard filters. The single
//! exception: a product whose full name equals the query may bypass the
//! category constraint (type and price still apply).

use std::collections::HashSet;

use aisle_core::models::{Candidate, HardFilters, Product, ProductId};
use aisle_core::text::normalize_text;

pub fn is_literal_name_match(product: &Product, query: &str) -> bool {
    let query = normalize_text(query);
    !query.is_empty() && normalize_text(&product.name) == query
}

pub fn passes(product: &Product, hard: &HardFilters, query: &str) -> bool {
    hard.matches_type(product)
        && hard.matches_price(product)
        && (hard.matches_category(product) || is_literal_name_match(product, query))
}

/// Keep gate-conformant candidates that were not excluded, first occurrence
/// of each id only, order preserved.
pub fn apply(
    candidates: Vec<Candidate>,
    hard: &HardFilters,
    query: &str,
    exclude: &HashSet<ProductId>,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !exclude.contains(c.id()))
        .filter(|c| passes(&c.product, hard, query))
        .filter(|c| seen.insert(c.id().clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_core::models::{StockStatus, TierTag};

    fn product(id: &str, name: &str, category: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: vec![category.to_string()],
            product_type: vec![],
            soft_category: vec![],
            colors: vec![],
            stock_status: StockStatus::InStock,
            embedding: vec![],
            image_url: None,
            on_sale: false,
        }
    }

    fn red_wine_under(max: f64) -> HardFilters {
        HardFilters {
            category: vec!["Red Wine".into()],
            max_price: Some(max),
            ..Default::default()
        }
    }

    #[test]
    fn literal_name_bypasses_category_only() {
        let hard = red_wine_under(100.0);
        let whisky = product("k1", "Glenfiddich 12", "Whisky", 90.0);
        assert!(passes(&whisky, &hard, "glenfiddich 12"));
        assert!(!passes(&whisky, &hard, "glenfiddich"));

        let pricey = product("k2", "Glenfiddich 12", "Whisky", 220.0);
        assert!(!passes(&pricey, &hard, "Glenfiddich 12"));
    }

    #[test]
    fn apply_filters_excludes_and_dedupes() {
        let hard = red_wine_under(100.0);
        let a = Candidate::new(product("a", "A", "Red Wine", 50.0), TierTag::TextMatch);
        let b = Candidate::new(product("b", "B", "White Wine", 50.0), TierTag::TextMatch);
        let c = Candidate::new(product("c", "C", "Red Wine", 60.0), TierTag::TextMatch);
        let exclude: HashSet<ProductId> = ["c".to_string()].into_iter().collect();

        let out = apply(vec![a.clone(), b, c, a], &hard, "wine", &exclude);
        let ids: Vec<&str> = out.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }
}
