//! Journal entries and the markdown loader that produces them.
//!
//! Entries live as `*.md` files with YAML front matter carrying a `date`:
//!
//! ```text
//! ---
//! date: 2024-03-18
//! ---
//! Spent $50 on groceries.
//! ```

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AnalysisError, Result};
use crate::services::EmbeddingService;
use crate::task::{RetryPolicy, ServiceTask};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
  pub date: NaiveDate,
  pub text: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub embedding: Option<Vec<f32>>,
}

impl JournalEntry {
  pub fn new(date: NaiveDate, text: impl Into<String>) -> Self {
    Self { date, text: text.into(), embedding: None }
  }

  pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
    self.embedding = Some(embedding);
    self
  }
}

/// Why a journal file did not produce an entry
#[derive(Error, Debug, PartialEq)]
pub enum SkipReason {
  #[error("missing front matter")]
  MissingFrontMatter,
  #[error("invalid front matter: {0}")]
  InvalidFrontMatter(String),
  #[error("missing date")]
  MissingDate,
  #[error("unrecognized date '{0}'")]
  InvalidDate(String),
  #[error("empty body")]
  EmptyBody,
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
  #[serde(default)]
  date: Option<serde_yaml::Value>,
}

/// Parse one markdown file into an entry
pub fn parse_entry(content: &str) -> std::result::Result<JournalEntry, SkipReason> {
  let (yaml, body) = split_front_matter(content).ok_or(SkipReason::MissingFrontMatter)?;

  if yaml.trim().is_empty() {
    return Err(SkipReason::MissingDate);
  }

  let front_matter: FrontMatter =
    serde_yaml::from_str(yaml).map_err(|e| SkipReason::InvalidFrontMatter(e.to_string()))?;
  let date = parse_date(front_matter.date.ok_or(SkipReason::MissingDate)?)?;

  let text = body.trim();
  if text.is_empty() {
    return Err(SkipReason::EmptyBody);
  }

  Ok(JournalEntry::new(date, text))
}

fn split_front_matter(content: &str) -> Option<(&str, &str)> {
  let content = content.strip_prefix('\u{feff}').unwrap_or(content);
  let rest = content.strip_prefix("---")?;
  let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

  let mut offset = 0;
  for line in rest.split_inclusive('\n') {
    if line.trim_end() == "---" {
      return Some((&rest[..offset], &rest[offset + line.len()..]));
    }
    offset += line.len();
  }

  None
}

fn parse_date(value: serde_yaml::Value) -> std::result::Result<NaiveDate, SkipReason> {
  let raw = match value {
    serde_yaml::Value::Null => return Err(SkipReason::MissingDate),
    serde_yaml::Value::String(s) => s,
    other => return Err(SkipReason::InvalidDate(format!("{other:?}"))),
  };
  let raw = raw.trim();

  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date);
  }
  if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
    return Ok(timestamp.date_naive());
  }

  Err(SkipReason::InvalidDate(raw.to_string()))
}

/// Load every dated, non-empty entry from a directory of markdown files.
///
/// Files are visited in file-name order. Files that cannot be read or parsed are
/// skipped with a warning; only an unreadable directory is an error.
pub fn load_dir(dir: &Path) -> Result<Vec<JournalEntry>> {
  let listing = fs::read_dir(dir).map_err(|e| AnalysisError::journal(dir, e.to_string()))?;

  let mut paths: Vec<_> = listing
    .filter_map(|entry| entry.ok())
    .map(|entry| entry.path())
    .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
    .collect();
  paths.sort();

  let mut entries = Vec::with_capacity(paths.len());
  for path in paths {
    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable journal file");
        continue;
      }
    };

    match parse_entry(&content) {
      Ok(entry) => entries.push(entry),
      Err(reason) => {
        tracing::warn!(path = %path.display(), %reason, "skipping journal file");
      }
    }
  }

  tracing::debug!(count = entries.len(), dir = %dir.display(), "loaded journal entries");
  Ok(entries)
}

/// Compute embeddings for entries that do not have one yet.
///
/// Returns how many entries were embedded. Entries that already carry an
/// embedding are left untouched.
pub async fn populate_embeddings(
  entries: &mut [JournalEntry],
  embedder: &dyn EmbeddingService,
  policy: RetryPolicy,
) -> Result<usize> {
  let task = ServiceTask::new("entry embedding", policy);
  let mut computed = 0;

  for entry in entries.iter_mut().filter(|entry| entry.embedding.is_none()) {
    let text = entry.text.as_str();
    let embedding = task.run(move || embedder.embed(text)).await?;
    entry.embedding = Some(embedding);
    computed += 1;
  }

  Ok(computed)
}
