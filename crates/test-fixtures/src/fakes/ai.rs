use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use aisle_core::constants::DEFAULT_SPECIFICITY_MAX_RESULTS;
use aisle_core::errors::AiError;
use aisle_core::models::{
    CatalogVocabulary, Complexity, ProductId, QueryContext, RawExtraction, RerankCandidate,
    RerankRequest, RerankedItem, SpecificityVerdict,
};
use aisle_core::text::{normalize_text, tokenize};
use aisle_core::traits::{ClassifierService, FilterExtractionService, Reranker, ValidationService};
use async_trait::async_trait;

use super::{lock, FakeMode, ModeCell};

/// Classifier answering from per-query scripts. Unscripted queries are
/// simple when they have at most two tokens.
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    complexity: Mutex<HashMap<String, Complexity>>,
    specificity: Mutex<HashMap<String, SpecificityVerdict>>,
    mode: ModeCell,
    complexity_calls: AtomicUsize,
    specificity_calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_complexity(self, query: &str, complexity: Complexity) -> Self {
        lock(&self.complexity).insert(normalize_text(query), complexity);
        self
    }

    pub fn with_specificity(self, query: &str, verdict: SpecificityVerdict) -> Self {
        lock(&self.specificity).insert(normalize_text(query), verdict);
        self
    }

    pub fn set_mode(&self, mode: FakeMode) {
        self.mode.set(mode);
    }

    pub fn complexity_calls(&self) -> usize {
        self.complexity_calls.load(Ordering::SeqCst)
    }

    pub fn specificity_calls(&self) -> usize {
        self.specificity_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.complexity_calls() + self.specificity_calls()
    }
}

#[async_trait]
impl ClassifierService for ScriptedClassifier {
    async fn classify_complexity(
        &self,
        query: &str,
        _context: &QueryContext,
    ) -> Result<Complexity, AiError> {
        self.complexity_calls.fetch_add(1, Ordering::SeqCst);
        self.mode.run("classify_complexity").await?;
        let scripted = lock(&self.complexity).get(&normalize_text(query)).copied();
        Ok(scripted.unwrap_or_else(|| {
            if tokenize(query).len() <= 2 {
                Complexity::Simple
            } else {
                Complexity::Complex
            }
        }))
    }

    async fn classify_specificity(
        &self,
        query: &str,
        _context: &QueryContext,
    ) -> Result<SpecificityVerdict, AiError> {
        self.specificity_calls.fetch_add(1, Ordering::SeqCst);
        self.mode.run("classify_specificity").await?;
        let scripted = lock(&self.specificity).get(&normalize_text(query)).copied();
        Ok(scripted.unwrap_or(SpecificityVerdict {
            specific: false,
            max_results: DEFAULT_SPECIFICITY_MAX_RESULTS,
        }))
    }
}

/// Extractor answering from per-query scripts; unscripted queries extract
/// nothing. Output is returned as-is, unvalidated.
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    scripts: Mutex<HashMap<String, RawExtraction>>,
    mode: ModeCell,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extraction(self, query: &str, extraction: RawExtraction) -> Self {
        lock(&self.scripts).insert(normalize_text(query), extraction);
        self
    }

    pub fn set_mode(&self, mode: FakeMode) {
        self.mode.set(mode);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilterExtractionService for ScriptedExtractor {
    async fn extract(
        &self,
        query: &str,
        _vocabulary: &CatalogVocabulary,
        _context: &QueryContext,
    ) -> Result<RawExtraction, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.mode.run("extract").await?;
        Ok(lock(&self.scripts)
            .get(&normalize_text(query))
            .cloned()
            .unwrap_or_default())
    }
}

/// Reranker that keeps the input order (or reverses it), truncated to
/// `max_results`. Can be told to slip in an id it was never given.
#[derive(Debug, Default)]
pub struct ScriptedReranker {
    mode: ModeCell,
    calls: AtomicUsize,
    reverse: AtomicBool,
    invent_id: AtomicBool,
    requests: Mutex<Vec<RerankRequest>>,
}

impl ScriptedReranker {
    pub const INVENTED_ID: &'static str = "not-in-catalog";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&self, mode: FakeMode) {
        self.mode.set(mode);
    }

    pub fn set_reverse(&self, reverse: bool) {
        self.reverse.store(reverse, Ordering::SeqCst);
    }

    pub fn set_invent_id(&self, invent: bool) {
        self.invent_id.store(invent, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RerankRequest> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait]
impl Reranker for ScriptedReranker {
    async fn rerank(&self, request: &RerankRequest) -> Result<Vec<RerankedItem>, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(request.clone());
        self.mode.run("rerank").await?;

        let mut ids: Vec<ProductId> = request.candidates.iter().map(|c| c.id.clone()).collect();
        if self.reverse.load(Ordering::SeqCst) {
            ids.reverse();
        }
        if self.invent_id.load(Ordering::SeqCst) {
            ids.insert(0, Self::INVENTED_ID.to_string());
        }
        Ok(ids
            .into_iter()
            .take(request.max_results)
            .map(|id| RerankedItem {
                explanation: request
                    .explain
                    .then(|| format!("{} fits \"{}\"", id, request.query)),
                id,
            })
            .collect())
    }
}

/// Validator that accepts every candidate unless an allow-list is set.
/// `select_relevant` keeps input order.
#[derive(Debug, Default)]
pub struct ScriptedValidator {
    allowed: Mutex<Option<HashSet<ProductId>>>,
    mode: ModeCell,
    validate_calls: AtomicUsize,
    select_calls: AtomicUsize,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_only<I: IntoIterator<Item = &'static str>>(self, ids: I) -> Self {
        *lock(&self.allowed) = Some(ids.into_iter().map(str::to_string).collect());
        self
    }

    pub fn set_mode(&self, mode: FakeMode) {
        self.mode.set(mode);
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    fn is_allowed(&self, id: &str) -> bool {
        lock(&self.allowed).as_ref().map_or(true, |a| a.contains(id))
    }
}

#[async_trait]
impl ValidationService for ScriptedValidator {
    async fn validate_weak_matches(
        &self,
        candidates: &[RerankCandidate],
        _query: &str,
    ) -> Result<Vec<ProductId>, AiError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.mode.run("validate_weak_matches").await?;
        Ok(candidates
            .iter()
            .filter(|c| self.is_allowed(&c.id))
            .map(|c| c.id.clone())
            .collect())
    }

    async fn select_relevant(
        &self,
        candidates: &[RerankCandidate],
        _query: &str,
        max: usize,
    ) -> Result<Vec<ProductId>, AiError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.mode.run("select_relevant").await?;
        Ok(candidates
            .iter()
            .filter(|c| self.is_allowed(&c.id))
            .take(max)
            .map(|c| c.id.clone())
            .collect())
    }
}
