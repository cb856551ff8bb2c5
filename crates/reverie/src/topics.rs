//! Topic extraction: ask the generation model which themes run through the entries.

use crate::error::Result;
use crate::journal::JournalEntry;
use crate::services::GenerationService;
use crate::task::{RetryPolicy, ServiceTask};

/// Marker the model is expected to put in front of every topic
pub const BULLET: char = '•';

pub struct TopicExtractor<'s> {
  generator: &'s dyn GenerationService,
  policy: RetryPolicy,
}

impl<'s> TopicExtractor<'s> {
  pub fn new(generator: &'s dyn GenerationService, policy: RetryPolicy) -> Self {
    Self { generator, policy }
  }

  /// Topic labels in the order the model listed them. An empty list means
  /// the model produced nothing usable, which is not an error.
  pub async fn extract(&self, entries: &[JournalEntry]) -> Result<Vec<String>> {
    let prompt = build_prompt(entries);
    let generator = self.generator;
    let prompt = prompt.as_str();

    let response = ServiceTask::new("topic extraction", self.policy)
      .run(move || generator.generate(prompt))
      .await?;

    let topics = parse_topics(&response);
    tracing::debug!(count = topics.len(), "parsed topics from model response");
    Ok(topics)
  }
}

pub fn build_prompt(entries: &[JournalEntry]) -> String {
  let listing = entries.iter().map(|entry| format!("- {}", entry.text)).collect::<Vec<_>>().join("\n");

  format!(
    "Analyze the following journal entries and identify the most important topics or concerns \
the user has addressed during this period.
Return only the main topics in a bulleted list using \"{BULLET}\" as the bullet. Express each topic in a short word or phrase.
Example: \"Mental Health\", \"Work\", \"Finances\", \"Shopping and Consumption\".
---
{listing}
---
Identified topics:
"
  )
}

/// Keep only bulleted lines, stripped of the marker and surrounding whitespace
pub fn parse_topics(response: &str) -> Vec<String> {
  response
    .lines()
    .filter_map(|line| line.strip_prefix(BULLET))
    .map(str::trim)
    .filter(|topic| !topic.is_empty())
    .map(str::to_string)
    .collect()
}
