use serde::{Deserialize, Serialize};

use crate::constants::TARGET_PRICE_TOLERANCE;
use crate::models::Product;

/// Deal-breaker constraints. A returned candidate must satisfy every present
/// field; the only exception is a literal full-name match, which may bypass
/// the category constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardFilters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub product_type: Vec<String>,
    /// Target price; expands to a ±`TARGET_PRICE_TOLERANCE` band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl HardFilters {
    pub fn is_empty(&self) -> bool {
        self.category.is_empty()
            && self.product_type.is_empty()
            && !self.has_price()
    }

    pub fn has_category(&self) -> bool {
        !self.category.is_empty()
    }

    pub fn has_price(&self) -> bool {
        self.price.is_some() || self.min_price.is_some() || self.max_price.is_some()
    }

    /// Effective inclusive price bounds. An explicit min/max wins over the
    /// band derived from a target price.
    pub fn price_bounds(&self) -> (Option<f64>, Option<f64>) {
        let band = self.price.map(|p| {
            (
                p * (1.0 - TARGET_PRICE_TOLERANCE),
                p * (1.0 + TARGET_PRICE_TOLERANCE),
            )
        });
        let min = self.min_price.or(band.map(|b| b.0));
        let max = self.max_price.or(band.map(|b| b.1));
        (min, max)
    }

    pub fn matches_category(&self, product: &Product) -> bool {
        self.category.is_empty() || product.in_any_category(&self.category)
    }

    pub fn matches_type(&self, product: &Product) -> bool {
        self.product_type.is_empty() || product.has_any_type(&self.product_type)
    }

    pub fn matches_price(&self, product: &Product) -> bool {
        let (min, max) = self.price_bounds();
        min.map_or(true, |m| product.price >= m) && max.map_or(true, |m| product.price <= m)
    }

    /// All present constraints hold.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_category(product) && self.matches_type(product) && self.matches_price(product)
    }

    /// Copy with the category constraint removed (type and price kept).
    pub fn without_category(&self) -> Self {
        Self {
            category: Vec::new(),
            ..self.clone()
        }
    }

    /// Copy restricted to the given categories.
    pub fn with_category(&self, category: Vec<String>) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }
}

/// Boost-only signals. Never exclude a candidate unless a retrieval call
/// explicitly enforces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftFilters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub soft_category: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<String>,
}

impl SoftFilters {
    pub fn is_empty(&self) -> bool {
        self.soft_category.is_empty() && self.color.is_empty()
    }
}

/// Hard and soft filters extracted from one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFilters {
    pub hard: HardFilters,
    pub soft: SoftFilters,
}

impl ExtractedFilters {
    pub fn is_empty(&self) -> bool {
        self.hard.is_empty() && self.soft.is_empty()
    }

    /// Every extracted value (categories, types, soft categories, colors),
    /// used for query-coverage checks.
    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.hard
            .category
            .iter()
            .chain(self.hard.product_type.iter())
            .chain(self.soft.soft_category.iter())
            .chain(self.soft.color.iter())
    }
}
