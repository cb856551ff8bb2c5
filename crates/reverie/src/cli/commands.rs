use std::path::Path;

use anyhow::{Context, Result};
use colored::*;

use crate::analysis::Analyzer;
use crate::category::Category;
use crate::cli::display::{display_reports, display_topics};
use crate::config::AnalysisConfig;
use crate::journal::{self, JournalEntry};
use crate::ollama::OllamaClient;

fn load_entries(journal_dir: &Path) -> Result<Vec<JournalEntry>> {
  let entries = journal::load_dir(journal_dir)
    .with_context(|| format!("Failed to load journal entries from {}", journal_dir.display()))?;
  lumen::info!("Loaded {} journal entries from {}", entries.len(), journal_dir.display());
  Ok(entries)
}

/// Run the full pipeline and print one report per topic
pub async fn analyze(journal_dir: &Path, config: AnalysisConfig, json: bool) -> Result<()> {
  config.validate()?;

  let mut entries = load_entries(journal_dir)?;
  if entries.is_empty() {
    lumen::warn!("No journal entries to analyze.");
    if json {
      println!("{{}}");
    }
    return Ok(());
  }

  let client = OllamaClient::new(&config)?;

  lumen::announce!("Starting journal analysis");
  lumen::info!("Pre-calculating embeddings with {}...", config.embedding_model);
  let computed = journal::populate_embeddings(&mut entries, &client, config.retry_policy())
    .await
    .context("Failed to embed journal entries")?;
  lumen::debug!("Embedded {computed} entries");

  let analyzer = Analyzer::new(&client, &client, &config);
  let result = analyzer.analyze(&entries).await.context("Analysis failed")?;

  if result.is_empty() {
    lumen::warn!("No topics were identified in the journal.");
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&result)?);
  } else {
    display_reports(&result);
  }

  lumen::success!("Generated {} reports", result.len());
  lumen::flourish!("Analysis completed");
  Ok(())
}

/// Run topic extraction only
pub async fn topics(journal_dir: &Path, config: AnalysisConfig) -> Result<()> {
  config.validate()?;

  let entries = load_entries(journal_dir)?;
  if entries.is_empty() {
    lumen::warn!("No journal entries to analyze.");
    return Ok(());
  }

  let client = OllamaClient::new(&config)?;
  let analyzer = Analyzer::new(&client, &client, &config);
  let topics = analyzer.extract_topics(&entries).await.context("Topic extraction failed")?;

  if topics.is_empty() {
    lumen::warn!("No topics were identified in the journal.");
    return Ok(());
  }

  display_topics(&topics);
  lumen::success!("Identified {} topics", topics.len());
  Ok(())
}

/// Show which category each label falls into; no model calls
pub fn classify(labels: &[String]) -> Result<()> {
  for label in labels {
    let category = Category::classify(label);
    println!("{} {} {}", label.bold(), "→".dimmed(), category.as_str().yellow());
  }
  Ok(())
}
