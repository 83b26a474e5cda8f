use serde::{Deserialize, Serialize};

/// Shopper preferences used for secondary ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub session_id: String,
    pub preferred_categories: Vec<String>,
    pub preferred_soft_categories: Vec<String>,
    pub preferred_colors: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}
