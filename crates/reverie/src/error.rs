use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
  #[error("Vectors must have the same dimension: {left} vs {right}")]
  DimensionMismatch { left: usize, right: usize },

  #[error("{operation} failed: {message}")]
  ServiceFailure { operation: String, message: String },

  #[error("{operation} timed out after {secs}s")]
  Timeout { operation: String, secs: u64 },

  #[error("Failed to read journal at {}: {message}", path.display())]
  Journal { path: PathBuf, message: String },

  #[error("Invalid configuration: {message}")]
  InvalidConfig { message: String },
}

impl AnalysisError {
  pub fn dimension_mismatch(left: usize, right: usize) -> Self {
    Self::DimensionMismatch { left, right }
  }

  pub fn service_failure(operation: impl Into<String>, message: impl Into<String>) -> Self {
    Self::ServiceFailure { operation: operation.into(), message: message.into() }
  }

  pub fn timeout(operation: impl Into<String>, secs: u64) -> Self {
    Self::Timeout { operation: operation.into(), secs }
  }

  pub fn journal(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
    Self::Journal { path: path.into(), message: message.into() }
  }

  pub fn invalid_config(message: impl Into<String>) -> Self {
    Self::InvalidConfig { message: message.into() }
  }

  /// Whether a service task may be attempted again after this error
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::ServiceFailure { .. } | Self::Timeout { .. })
  }
}
