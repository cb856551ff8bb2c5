//! Run configuration for the analysis pipeline
//!
//! Every knob has a default matching a stock local Ollama install and can be
//! overridden through `REVERIE_*` environment variables or CLI flags.

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{AnalysisError, Result};
use crate::task::RetryPolicy;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_GENERATION_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_LANGUAGE: &str = "Persian";

/// Configuration shared by the model backend and the analysis pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
  /// Base URL of the model server (e.g., "http://localhost:11434")
  pub service_endpoint: String,
  /// Model used to embed entries and topic labels
  pub embedding_model: String,
  /// Model used for topic extraction and report synthesis
  pub generation_model: String,
  /// Per-call timeout in seconds
  pub timeout_secs: u64,
  /// Natural language the reports are written in
  pub language: String,
  /// Entries must score strictly above this to count as context
  pub similarity_threshold: f32,
  /// Maximum number of context entries per topic
  pub max_context_entries: usize,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      service_endpoint: DEFAULT_ENDPOINT.to_string(),
      embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
      generation_model: DEFAULT_GENERATION_MODEL.to_string(),
      timeout_secs: 120,
      language: DEFAULT_LANGUAGE.to_string(),
      similarity_threshold: 0.6,
      max_context_entries: 5,
    }
  }
}

impl AnalysisConfig {
  /// Defaults overridden by any `REVERIE_*` variables that are set
  pub fn from_env() -> Self {
    let defaults = Self::default();

    Self {
      service_endpoint: env_or("REVERIE_ENDPOINT", defaults.service_endpoint),
      embedding_model: env_or("REVERIE_EMBEDDING_MODEL", defaults.embedding_model),
      generation_model: env_or("REVERIE_GENERATION_MODEL", defaults.generation_model),
      timeout_secs: env_parse("REVERIE_TIMEOUT_SECS", defaults.timeout_secs),
      language: env_or("REVERIE_LANGUAGE", defaults.language),
      similarity_threshold: env_parse("REVERIE_SIMILARITY_THRESHOLD", defaults.similarity_threshold),
      max_context_entries: env_parse("REVERIE_MAX_CONTEXT", defaults.max_context_entries),
    }
  }

  pub fn validate(&self) -> Result<()> {
    let url = Url::parse(&self.service_endpoint).map_err(|e| {
      AnalysisError::invalid_config(format!("endpoint '{}': {e}", self.service_endpoint))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(AnalysisError::invalid_config(format!(
        "endpoint must use http or https, got '{}'",
        url.scheme()
      )));
    }

    if self.timeout_secs == 0 {
      return Err(AnalysisError::invalid_config("timeout must be at least one second"));
    }

    if !(-1.0..=1.0).contains(&self.similarity_threshold) {
      return Err(AnalysisError::invalid_config(format!(
        "similarity threshold {} is outside [-1, 1]",
        self.similarity_threshold
      )));
    }

    if self.max_context_entries == 0 {
      return Err(AnalysisError::invalid_config("max context entries must be positive"));
    }

    for (name, value) in [
      ("embedding model", &self.embedding_model),
      ("generation model", &self.generation_model),
      ("language", &self.language),
    ] {
      if value.trim().is_empty() {
        return Err(AnalysisError::invalid_config(format!("{name} must not be empty")));
      }
    }

    Ok(())
  }

  /// Endpoint without a trailing slash, ready for path joining
  pub fn base_url(&self) -> &str {
    self.service_endpoint.trim_end_matches('/')
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy::single_retry(self.timeout())
  }
}

fn env_or(key: &str, default: String) -> String {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
  std::env::var(key).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
