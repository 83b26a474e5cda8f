//! # aisle-extraction
//!
//! Free text to intent: complexity classification and hard/soft filter
//! extraction. Each capability has an AI-backed path routed through the
//! resilient gateway and a deterministic rule-based path used when the
//! circuit is open or the AI call fails. Every extracted value is validated
//! against the store vocabulary.

pub mod classifier;
pub mod extractor;
pub mod price;
pub mod rules;
pub mod specificity;
pub mod validation;

pub use classifier::{Classification, QueryClassifier};
pub use extractor::{Extraction, FilterExtractor};
pub use price::{extract_price, PriceMatch};
pub use rules::{RuleBasedClassifier, RuleBasedExtractor, RuleExtraction};
pub use specificity::keep_most_specific;
pub use validation::VocabularyValidator;
