mod ai;
mod candidate;
mod degradation;
mod filters;
mod product;
mod profile;
mod request;
mod session;

pub use ai::{
    Complexity, DecisionSource, QueryContext, RawExtraction, RejectedTerm, RerankCandidate,
    RerankRequest, RerankedItem, SpecificityVerdict, VocabularyKind,
};
pub use candidate::{Candidate, TierTag};
pub use degradation::DegradationEvent;
pub use filters::{ExtractedFilters, HardFilters, SoftFilters};
pub use product::{Product, ProductId, StockStatus};
pub use profile::UserProfile;
pub use request::{CatalogVocabulary, PipelinePath, StoreContext};
pub use session::{SessionExtra, SessionState};
