use serde::{Deserialize, Serialize};

use crate::text::intersects_normalized;

pub type ProductId = String;

/// Availability as reported by the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
    Unknown,
}

/// A catalog product. Owned by the product repository; the engine never
/// mutates it within a request.
///
/// `category` and `product_type` are hard attributes (filters exclude on them).
/// `soft_category` and `colors` are soft attributes (they only boost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default, rename = "type")]
    pub product_type: Vec<String>,
    #[serde(default)]
    pub soft_category: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub on_sale: bool,
}

impl Product {
    pub fn in_any_category(&self, categories: &[String]) -> bool {
        intersects_normalized(&self.category, categories)
    }

    pub fn has_any_type(&self, types: &[String]) -> bool {
        intersects_normalized(&self.product_type, types)
    }

    pub fn is_available(&self) -> bool {
        self.stock_status != StockStatus::OutOfStock
    }
}
