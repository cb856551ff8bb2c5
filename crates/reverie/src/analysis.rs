//! The analysis run: extract topics, then retrieve, classify and synthesize per topic.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::category::Category;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::journal::JournalEntry;
use crate::report::ReportSynthesizer;
use crate::services::{EmbeddingService, GenerationService};
use crate::similarity::SimilarityIndex;
use crate::task::{RetryPolicy, ServiceTask};
use crate::topics::TopicExtractor;

/// Report generated for a single topic
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TopicReport {
  pub topic: String,
  pub category: Category,
  /// Number of journal entries handed to the model as context
  pub context_entries: usize,
  pub text: String,
}

/// Topic → report text, in extraction order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
  reports: Vec<TopicReport>,
}

impl AnalysisResult {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a report. A topic seen before keeps its position and gets the new report.
  pub fn insert(&mut self, report: TopicReport) {
    match self.reports.iter_mut().find(|existing| existing.topic == report.topic) {
      Some(existing) => *existing = report,
      None => self.reports.push(report),
    }
  }

  pub fn get(&self, topic: &str) -> Option<&str> {
    self.report(topic).map(|report| report.text.as_str())
  }

  pub fn report(&self, topic: &str) -> Option<&TopicReport> {
    self.reports.iter().find(|report| report.topic == topic)
  }

  pub fn topics(&self) -> impl Iterator<Item = &str> {
    self.reports.iter().map(|report| report.topic.as_str())
  }

  pub fn iter(&self) -> std::slice::Iter<'_, TopicReport> {
    self.reports.iter()
  }

  pub fn len(&self) -> usize {
    self.reports.len()
  }

  pub fn is_empty(&self) -> bool {
    self.reports.is_empty()
  }
}

impl<'a> IntoIterator for &'a AnalysisResult {
  type Item = &'a TopicReport;
  type IntoIter = std::slice::Iter<'a, TopicReport>;

  fn into_iter(self) -> Self::IntoIter {
    self.reports.iter()
  }
}

/// Serializes as a JSON object whose keys follow extraction order
impl Serialize for AnalysisResult {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.reports.len()))?;
    for report in &self.reports {
      map.serialize_entry(&report.topic, &report.text)?;
    }
    map.end()
  }
}

/// Phases of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  Idle,
  Extracting,
  Embedding,
  Retrieving,
  Classifying,
  Synthesizing,
  Done,
}

/// Current phase of a run
#[derive(Debug)]
struct Run {
  state: RunState,
  #[cfg(test)]
  history: Vec<RunState>,
}

impl Run {
  fn new() -> Self {
    Self {
      state: RunState::Idle,
      #[cfg(test)]
      history: vec![RunState::Idle],
    }
  }

  fn advance(&mut self, next: RunState) {
    tracing::trace!(from = ?self.state, to = ?next, "run state");
    self.state = next;
    #[cfg(test)]
    self.history.push(next);
  }
}

/// Sequences extraction, retrieval, classification and synthesis for one batch of entries
pub struct Analyzer<'s> {
  embedder: &'s dyn EmbeddingService,
  generator: &'s dyn GenerationService,
  index: SimilarityIndex,
  policy: RetryPolicy,
  language: String,
}

impl<'s> Analyzer<'s> {
  pub fn new(
    embedder: &'s dyn EmbeddingService,
    generator: &'s dyn GenerationService,
    config: &AnalysisConfig,
  ) -> Self {
    Self {
      embedder,
      generator,
      index: SimilarityIndex::new(config.similarity_threshold, config.max_context_entries),
      policy: config.retry_policy(),
      language: config.language.clone(),
    }
  }

  /// Run topic extraction only
  pub async fn extract_topics(&self, entries: &[JournalEntry]) -> Result<Vec<String>> {
    if entries.is_empty() {
      return Ok(Vec::new());
    }
    TopicExtractor::new(self.generator, self.policy).extract(entries).await
  }

  /// Produce one report per extracted topic.
  ///
  /// No entries, or no topics, yields an empty result. Any failure aborts the
  /// whole run; there is no partial result.
  pub async fn analyze(&self, entries: &[JournalEntry]) -> Result<AnalysisResult> {
    let mut run = Run::new();
    let outcome = self.drive(entries, &mut run).await;
    if outcome.is_err() {
      tracing::debug!(state = ?run.state, "run aborted");
    }
    outcome
  }

  async fn drive(&self, entries: &[JournalEntry], run: &mut Run) -> Result<AnalysisResult> {
    let mut result = AnalysisResult::new();

    if entries.is_empty() {
      tracing::info!("no journal entries to analyze");
      run.advance(RunState::Done);
      return Ok(result);
    }

    run.advance(RunState::Extracting);
    tracing::info!(entries = entries.len(), "detecting topics from journal entries");
    let topics = TopicExtractor::new(self.generator, self.policy).extract(entries).await?;

    if topics.is_empty() {
      tracing::info!("model returned no topics");
      run.advance(RunState::Done);
      return Ok(result);
    }
    tracing::info!(topics = ?topics, "identified topics");

    let synthesizer = ReportSynthesizer::new(self.generator, self.policy, self.language.as_str());

    for topic in &topics {
      tracing::info!(topic = %topic, "generating report");

      run.advance(RunState::Embedding);
      let embedder = self.embedder;
      let label = topic.as_str();
      let query = ServiceTask::new(format!("topic embedding for \"{topic}\""), self.policy)
        .run(move || embedder.embed(label))
        .await?;

      run.advance(RunState::Retrieving);
      let relevant = self.index.relevant_entries(&query, entries)?;
      let context: Vec<&str> = relevant.iter().map(|scored| scored.entry.text.as_str()).collect();

      run.advance(RunState::Classifying);
      let category = Category::classify(topic);
      tracing::debug!(topic = %topic, %category, context = context.len(), "classified topic");

      run.advance(RunState::Synthesizing);
      let text = synthesizer.synthesize(topic, category, &context).await?;

      result.insert(TopicReport {
        topic: topic.clone(),
        category,
        context_entries: context.len(),
        text,
      });
    }

    run.advance(RunState::Done);
    tracing::info!(reports = result.len(), "analysis completed");
    Ok(result)
  }
}
