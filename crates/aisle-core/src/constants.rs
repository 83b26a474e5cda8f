/// aisle engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version stamped into every continuation token. Bump on incompatible changes.
pub const CONTINUATION_TOKEN_VERSION: u8 = 1;

/// Relative tolerance applied when a hard filter carries a single target price
/// ("around 100" matches 85..=115).
pub const TARGET_PRICE_TOLERANCE: f64 = 0.15;

/// Maximum characters of a description forwarded to AI services per product.
pub const MAX_AI_DESCRIPTION_CHARS: usize = 240;

/// Default number of results returned by `classifySpecificity` fallbacks.
pub const DEFAULT_SPECIFICITY_MAX_RESULTS: usize = 10;

/// Maximum number of ids accepted from a single weak-match validation call.
pub const MAX_WEAK_MATCH_VALIDATION: usize = 10;
