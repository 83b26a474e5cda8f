//! Test fixture loader for the aisle golden catalog, plus in-memory fakes of
//! every external service the engine consumes.
//!
//! Fakes count their calls and can be switched between succeeding, failing,
//! and hanging (to trip timeouts) at any point during a test.

pub mod fakes;

use std::path::PathBuf;

use aisle_core::models::{CatalogVocabulary, Product};
use serde::de::DeserializeOwned;

pub use fakes::{
    FakeMode, HashEmbedder, InMemoryOverrideStore, InMemoryProductRepository,
    InMemoryProfileStore, ScriptedClassifier, ScriptedExtractor, ScriptedReranker,
    ScriptedValidator,
};

/// Root directory of the fixture data (`<workspace>/test-fixtures`).
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up until the catalog is found.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").join("catalog").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures/catalog from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// The golden wine-store catalog with deterministic embeddings filled in.
pub fn wine_store() -> Vec<Product> {
    let embedder = HashEmbedder::default();
    let mut products: Vec<Product> = load_fixture("catalog/wine_store.json");
    for p in &mut products {
        p.embedding = embedder.embed_sync(&HashEmbedder::product_text(p));
    }
    products
}

/// Vocabulary of the golden catalog.
pub fn wine_store_vocabulary() -> CatalogVocabulary {
    load_fixture("catalog/vocabulary.json")
}

/// Look up a catalog product by id.
///
/// # Panics
/// Panics if the id is not in the catalog.
pub fn product(id: &str) -> Product {
    wine_store()
        .into_iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| panic!("no product {id} in the golden catalog"))
}
