//! Reverie - topic-scoped analysis of journal entries
//!
//! Extracts the themes running through a batch of journal entries, retrieves the
//! entries closest to each theme by embedding similarity, and asks a local model
//! for a category-specific report per theme.

pub mod analysis;
pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod journal;
pub mod ollama;
pub mod report;
pub mod services;
pub mod similarity;
pub mod task;
pub mod topics;

pub use analysis::{AnalysisResult, Analyzer, RunState, TopicReport};
pub use category::Category;
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use journal::JournalEntry;
pub use ollama::OllamaClient;
pub use services::{EmbeddingService, GenerationService};
pub use similarity::{cosine_similarity, ScoredEntry, SimilarityIndex};
