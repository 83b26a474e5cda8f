//! Shopper-profile affinity. Pure, and only ever used as a secondary sort key.

use aisle_core::models::{Candidate, Product, UserProfile};
use aisle_core::text::intersects_normalized;

use crate::colors::same_color_family;

/// Affinity of `product` for `profile`: one point per preferred category and
/// soft-category overlap, half a point for a color in a preferred family, and
/// one point when the price sits inside the preferred band.
pub fn boost(product: &Product, profile: &UserProfile) -> f64 {
    let mut score = 0.0;
    if intersects_normalized(&product.category, &profile.preferred_categories) {
        score += 1.0;
    }
    if intersects_normalized(&product.soft_category, &profile.preferred_soft_categories) {
        score += 1.0;
    }
    let color_hit = product
        .colors
        .iter()
        .any(|c| profile.preferred_colors.iter().any(|p| same_color_family(p, c)));
    if color_hit {
        score += 0.5;
    }
    let has_band = profile.price_min.is_some() || profile.price_max.is_some();
    let in_band = profile.price_min.map_or(true, |m| product.price >= m)
        && profile.price_max.map_or(true, |m| product.price <= m);
    if has_band && in_band {
        score += 1.0;
    }
    score
}

/// Set `profile_boost` on every candidate.
pub fn apply(candidates: &mut [Candidate], profile: &UserProfile, weight: f64) {
    for c in candidates.iter_mut() {
        c.profile_boost = boost(&c.product, profile) * weight;
    }
}
