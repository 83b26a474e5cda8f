pub mod defaults;
mod observability_config;
mod pipeline_config;
mod resilience_config;
mod scoring_config;
mod session_config;

pub use observability_config::ObservabilityConfig;
pub use pipeline_config::PipelineConfig;
pub use resilience_config::ResilienceConfig;
pub use scoring_config::ScoringConfig;
pub use session_config::SessionConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{AisleError, AisleResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AisleConfig {
    pub scoring: ScoringConfig,
    pub pipeline: PipelineConfig,
    pub resilience: ResilienceConfig,
    pub session: SessionConfig,
    pub observability: ObservabilityConfig,
}

impl AisleConfig {
    /// Parse from a TOML string. Missing sections and fields fall back to defaults.
    pub fn from_toml(s: &str) -> AisleResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| AisleError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline misbehave.
    pub fn validate(&self) -> AisleResult<()> {
        let fail = |msg: &str| Err(AisleError::ConfigError(msg.to_string()));

        if self.pipeline.default_page_size == 0 {
            return fail("pipeline.default_page_size must be > 0");
        }
        if self.pipeline.rerank_input_cap == 0 {
            return fail("pipeline.rerank_input_cap must be > 0");
        }
        if !(0.0..=1.0).contains(&self.pipeline.filter_only_coverage) {
            return fail("pipeline.filter_only_coverage must be within 0..=1");
        }
        if self.resilience.failure_threshold == 0 {
            return fail("resilience.failure_threshold must be > 0");
        }
        if self.resilience.ai_timeout_ms == 0 {
            return fail("resilience.ai_timeout_ms must be > 0");
        }
        if self.session.max_depth == 0 {
            return fail("session.max_depth must be > 0");
        }
        if self.scoring.query_category_weight <= self.scoring.derived_category_weight {
            return fail("scoring.query_category_weight must exceed derived_category_weight");
        }
        if !(0.0..=1.0).contains(&self.scoring.fuzzy_threshold) {
            return fail("scoring.fuzzy_threshold must be within 0..=1");
        }
        Ok(())
    }
}
