// Single source of truth for all default values.

// --- Scoring: fusion ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_SOFT_MATCH_BOOST: f64 = 10_000.0;
pub const DEFAULT_COLOR_BOOST: f64 = 5_000.0;
pub const DEFAULT_MULTI_CATEGORY_LINEAR_THRESHOLD: f64 = 10.0;
pub const DEFAULT_MULTI_CATEGORY_LINEAR_FACTOR: f64 = 50_000.0;
pub const DEFAULT_MULTI_CATEGORY_EXP_BASE: f64 = 5.0;
pub const DEFAULT_MULTI_CATEGORY_EXP_FACTOR: f64 = 20_000.0;
pub const DEFAULT_QUERY_CATEGORY_WEIGHT: f64 = 100.0;
pub const DEFAULT_DERIVED_CATEGORY_WEIGHT: f64 = 10.0;
pub const DEFAULT_UNWEIGHTED_CATEGORY_WEIGHT: f64 = 1.0;
pub const DEFAULT_VERY_STRONG_MATCH: u32 = 20_000;
pub const DEFAULT_PROFILE_BOOST_WEIGHT: f64 = 1.0;

// --- Scoring: exact-match tiers ---
pub const DEFAULT_EXACT_EQUALITY_BONUS: u32 = 100_000;
pub const DEFAULT_PHRASE_START_BONUS: u32 = 150_000;
pub const DEFAULT_STEMMED_EQUALITY_BONUS: u32 = 95_000;
pub const DEFAULT_PHRASE_ANYWHERE_BONUS: u32 = 120_000;
pub const DEFAULT_SUBSTRING_START_BONUS: u32 = 65_000;
pub const DEFAULT_SUBSTRING_ANYWHERE_BONUS: u32 = 60_000;
pub const DEFAULT_STEMMED_TOKEN_ALL_BONUS: u32 = 62_000;
pub const DEFAULT_STEMMED_TOKEN_FIRST_BONUS: u32 = 60_000;
pub const DEFAULT_STEMMED_TOKEN_BONUS: u32 = 58_000;
pub const DEFAULT_PREFIX_FIRST_BONUS: u32 = 30_000;
pub const DEFAULT_PREFIX_EARLY_BONUS: u32 = 20_000;
pub const DEFAULT_WORD_COVERAGE_BONUS: u32 = 15_000;
pub const DEFAULT_WORD_COVERAGE_RATIO: f64 = 0.85;
pub const DEFAULT_FUZZY_BONUS_MIN: u32 = 10_000;
pub const DEFAULT_FUZZY_BONUS_MAX: u32 = 12_000;
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_LEVENSHTEIN_CAP: usize = 100;
pub const DEFAULT_EARLY_POSITION_WINDOW: usize = 2;

// --- Pipeline ---
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_HIGH_QUALITY_THRESHOLD: u32 = 1_000;
pub const DEFAULT_EXCELLENT_THRESHOLD: u32 = 5_000;
pub const DEFAULT_NEAR_PERFECT_THRESHOLD: u32 = 90_000;
pub const DEFAULT_TIER1_LIMIT: usize = 60;
pub const DEFAULT_TIER2_LIMIT: usize = 60;
pub const DEFAULT_VECTOR_POOL_CAP: usize = 150;
pub const DEFAULT_MAX_FUZZY_TOKENS: usize = 8;
pub const DEFAULT_RERANK_INPUT_CAP: usize = 25;
pub const DEFAULT_RERANK_MAX_RESULTS: usize = 10;
pub const DEFAULT_WEAK_MATCH_CAP: usize = 10;
pub const DEFAULT_SELECT_RELEVANT_CAP: usize = 30;
pub const DEFAULT_EMERGENCY_MIN_RESULTS: usize = 5;
pub const DEFAULT_EMERGENCY_VECTOR_CAP: usize = 20;
pub const DEFAULT_EMERGENCY_RERANK_CAP: usize = 15;
pub const DEFAULT_FILTER_ONLY_COVERAGE: f64 = 0.85;
pub const DEFAULT_FILTER_ONLY_LIMIT: usize = 100;
pub const DEFAULT_COMPLEX_FUSION_LIMIT: usize = 60;
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 5;
pub const DEFAULT_RECOMMENDATION_PRICE_BAND: f64 = 0.40;
pub const DEFAULT_MAX_EXTRACTED_CATEGORIES: usize = 3;
pub const DEFAULT_SWEEP_CAP: usize = 60;

// --- Resilience ---
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;
pub const DEFAULT_AI_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
pub const DEFAULT_EMBEDDING_TTL_SECS: u64 = 604_800; // 1 week
pub const DEFAULT_EXTRACTION_TTL_SECS: u64 = 3_600;
pub const DEFAULT_CLASSIFICATION_TTL_SECS: u64 = 3_600;

// --- Session ---
pub const DEFAULT_MAX_DEPTH: u32 = 50;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_SESSION_KEY_PREFIX: &str = "aisle:session:";
pub const DEFAULT_CAS_RETRIES: u32 = 5;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
