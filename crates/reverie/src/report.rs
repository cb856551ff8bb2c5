//! Report synthesis: compose a category-specific prompt and hand it to the model.

use crate::category::Category;
use crate::error::Result;
use crate::services::GenerationService;
use crate::task::{RetryPolicy, ServiceTask};

const CONTEXT_SEPARATOR: &str = "\n- ";

pub struct ReportSynthesizer<'s> {
  generator: &'s dyn GenerationService,
  policy: RetryPolicy,
  language: String,
}

impl<'s> ReportSynthesizer<'s> {
  pub fn new(generator: &'s dyn GenerationService, policy: RetryPolicy, language: impl Into<String>) -> Self {
    Self { generator, policy, language: language.into() }
  }

  pub fn compose_prompt(&self, topic: &str, category: Category, context: &[&str]) -> String {
    let mut prompt = context_block(topic, context);
    prompt.push('\n');
    prompt.push_str(&category.instructions(topic));
    prompt.push('\n');
    prompt.push_str(&closing_instruction(&self.language));
    prompt
  }

  /// The model's text, returned as-is
  pub async fn synthesize(&self, topic: &str, category: Category, context: &[&str]) -> Result<String> {
    let prompt = self.compose_prompt(topic, category, context);
    let generator = self.generator;
    let prompt = prompt.as_str();

    ServiceTask::new(format!("report synthesis for \"{topic}\""), self.policy)
      .run(move || generator.generate(prompt))
      .await
  }
}

fn context_block(topic: &str, context: &[&str]) -> String {
  if context.is_empty() {
    return format!(
      "Topic \"{topic}\" was identified, but not enough matching journal history was found \
to go into detail.\n"
    );
  }

  format!(
    "Here is relevant information regarding the topic \"{topic}\" from the user's past journal entries:\n- {}\n",
    context.join(CONTEXT_SEPARATOR)
  )
}

fn closing_instruction(language: &str) -> String {
  format!(
    "Please provide it in {language}, in a concise and clear manner, focusing on actionable \
insights and observations.\n"
  )
}
