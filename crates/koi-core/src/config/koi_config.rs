//! Top-level KOI configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    BackendConfig, CacheConfig, ObservabilityConfig, ResilienceConfig, RetrievalConfig,
    TablesConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`KOI_*`)
/// 2. TOML file passed to [`KoiConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KoiConfig {
    pub backends: BackendConfig,
    pub resilience: ResilienceConfig,
    pub cache: CacheConfig,
    pub retrieval: RetrievalConfig,
    pub tables: TablesConfig,
    pub observability: ObservabilityConfig,
}

impl KoiConfig {
    /// Load configuration: defaults, then the optional TOML file, then `KOI_*`
    /// environment overrides. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing and embedding).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `KOI_*` overrides from an arbitrary lookup (the process
    /// environment in [`KoiConfig::load`]).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KOI_GRAPH_URL") {
            self.backends.graph_url = url;
        }
        if let Some(name) = lookup("KOI_GRAPH_NAME") {
            self.backends.graph_name = name;
        }
        if let Some(url) = lookup("KOI_VECTOR_URL") {
            self.backends.vector_url = url;
        }
        if let Some(url) = lookup("KOI_SIMILARITY_URL") {
            self.backends.similarity_url = if url.is_empty() { None } else { Some(url) };
        }
        if let Some(level) = lookup("KOI_LOG") {
            self.observability.log_level = level;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let retrieval = &self.retrieval;
        if !(0.0..=1.0).contains(&retrieval.coverage_target) {
            return Err(invalid("retrieval.coverage_target", "must be between 0.0 and 1.0"));
        }
        if retrieval.base_k == 0 {
            return Err(invalid("retrieval.base_k", "must be greater than 0"));
        }
        if retrieval.base_k > retrieval.max_k {
            return Err(invalid("retrieval.base_k", "must not exceed retrieval.max_k"));
        }
        if retrieval.k_step == 0 {
            return Err(invalid("retrieval.k_step", "must be greater than 0"));
        }
        if retrieval.default_limit == 0 || retrieval.default_limit > crate::constants::MAX_QUERY_LIMIT
        {
            return Err(invalid(
                "retrieval.default_limit",
                "must be between 1 and the maximum query limit",
            ));
        }
        if self.resilience.retry.multiplier < 1.0 {
            return Err(invalid("resilience.retry.multiplier", "must be at least 1.0"));
        }
        let breakers = [
            ("resilience.default_breaker", &self.resilience.default_breaker),
            ("resilience.graph_breaker", &self.resilience.graph_breaker),
            ("resilience.vector_breaker", &self.resilience.vector_breaker),
            ("resilience.similarity_breaker", &self.resilience.similarity_breaker),
            ("resilience.database_breaker", &self.resilience.database_breaker),
        ];
        for (field, breaker) in breakers {
            if breaker.failure_threshold == 0 {
                return Err(invalid(
                    &format!("{field}.failure_threshold"),
                    "must be greater than 0",
                ));
            }
            if breaker.half_open_max_calls == 0 {
                return Err(invalid(
                    &format!("{field}.half_open_max_calls"),
                    "must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
