//! Model backend interfaces
//!
//! The pipeline only ever talks to these traits so the HTTP backend can be
//! swapped for a fake in tests or for a different server later.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to a fixed-dimension vector
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingService: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Maps a prompt to generated text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String>;
}
