//! Command-line surface: argument types, command handlers and console display.

pub mod commands;
pub mod display;

use clap::Args;

use crate::config::AnalysisConfig;

/// Flags that override the environment-derived configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
  /// Base URL of the model server
  #[arg(long)]
  pub endpoint: Option<String>,
  /// Model used for embeddings
  #[arg(long)]
  pub embedding_model: Option<String>,
  /// Model used for topic extraction and reports
  #[arg(long)]
  pub generation_model: Option<String>,
  /// Per-request timeout in seconds
  #[arg(long)]
  pub timeout_secs: Option<u64>,
  /// Language the reports are written in
  #[arg(short, long)]
  pub language: Option<String>,
  /// Minimum similarity (exclusive) for an entry to count as context
  #[arg(long)]
  pub threshold: Option<f32>,
  /// Maximum number of context entries per topic
  #[arg(long)]
  pub max_context: Option<usize>,
}

impl ConfigArgs {
  /// Environment configuration with any flags layered on top
  pub fn resolve(&self) -> AnalysisConfig {
    self.apply(AnalysisConfig::from_env())
  }

  pub fn apply(&self, base: AnalysisConfig) -> AnalysisConfig {
    AnalysisConfig {
      service_endpoint: self.endpoint.clone().unwrap_or(base.service_endpoint),
      embedding_model: self.embedding_model.clone().unwrap_or(base.embedding_model),
      generation_model: self.generation_model.clone().unwrap_or(base.generation_model),
      timeout_secs: self.timeout_secs.unwrap_or(base.timeout_secs),
      language: self.language.clone().unwrap_or(base.language),
      similarity_threshold: self.threshold.unwrap_or(base.similarity_threshold),
      max_context_entries: self.max_context.unwrap_or(base.max_context_entries),
    }
  }
}
