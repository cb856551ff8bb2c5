//! Analysis categories and the lookup from free-form topic labels to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Analytical lens a topic is reported through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  MentalHealth,
  Work,
  Finances,
  ShoppingConsumption,
  HealthWellbeing,
  General,
}

/// Lower-cased labels recognised for each specific category.
/// Anything not listed here falls into [`Category::General`].
const SYNONYMS: &[(Category, &[&str])] = &[
  (Category::MentalHealth, &["mental health", "anxiety", "stress"]),
  (Category::Work, &["work", "projects"]),
  (Category::Finances, &["finances", "financial management", "money"]),
  (Category::ShoppingConsumption, &["shopping and consumption", "shopping", "consumption", "purchases"]),
  (Category::HealthWellbeing, &["health", "exercise", "well-being"]),
];

impl Category {
  pub const ALL: [Category; 6] = [
    Category::MentalHealth,
    Category::Work,
    Category::Finances,
    Category::ShoppingConsumption,
    Category::HealthWellbeing,
    Category::General,
  ];

  /// Exact match on the lower-cased label; no fuzzy matching
  pub fn classify(topic: &str) -> Self {
    let label = topic.to_lowercase();
    SYNONYMS
      .iter()
      .find(|(_, synonyms)| synonyms.contains(&label.as_str()))
      .map(|(category, _)| *category)
      .unwrap_or(Category::General)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MentalHealth => "mental-health",
      Self::Work => "work",
      Self::Finances => "finances",
      Self::ShoppingConsumption => "shopping-consumption",
      Self::HealthWellbeing => "health-wellbeing",
      Self::General => "general",
    }
  }

  /// Analytical questions put to the model for a topic in this category
  pub fn instructions(&self, topic: &str) -> String {
    let (domain, questions) = match self {
      Self::MentalHealth => (
        "mental health",
        [
          "Analyze the user's overall emotional trend during this period.",
          "Are there any specific events or factors mentioned that impacted the user's mental state?",
          "Do you have any suggestions for improving the user's mental health based on their writings?",
        ],
      ),
      Self::Work => (
        "work",
        [
          "List important work tasks and projects the user has mentioned.",
          "Is there any progress observed in these projects?",
          "Are there any challenges or strengths evident in the user's work environment?",
        ],
      ),
      Self::Finances => (
        "finances",
        [
          "Summarize any expenses or incomes the user has mentioned.",
          "Is there a specific pattern in the user's spending or financial management?",
          "Do you have any financial advice based on the user's writings?",
        ],
      ),
      Self::ShoppingConsumption => (
        "shopping and consumption",
        [
          "List important items the user intended to buy or has already bought.",
          "Is there a specific consumption pattern for recurring items (like milk or peanut butter)?",
          "Are there any reminders for purchasing items that might be running out?",
        ],
      ),
      Self::HealthWellbeing => (
        "health and well-being",
        [
          "Summarize the user's physical activity levels.",
          "Are there any indications of physical discomfort or recovery?",
          "Do you have any general health-related observations or suggestions?",
        ],
      ),
      Self::General => {
        return format!(
          "Based on the journal entries related to the topic \"{topic}\", please provide a general \
summary and any interesting insights that can be inferred from the user's writings.\n"
        );
      }
    };

    let numbered = questions
      .iter()
      .enumerate()
      .map(|(i, question)| format!("{}. {question}", i + 1))
      .collect::<Vec<_>>()
      .join("\n");

    format!("Based on the journal entries related to {domain}, please:\n{numbered}\n")
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
