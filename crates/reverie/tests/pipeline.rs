use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reverie::journal::populate_embeddings;
use reverie::{
  AnalysisConfig, AnalysisError, Analyzer, Category, EmbeddingService, GenerationService,
  JournalEntry,
};

/// Embeds by keyword so retrieval is predictable
#[derive(Default)]
struct KeywordEmbedder {
  calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingService for KeywordEmbedder {
  async fn embed(&self, text: &str) -> reverie::Result<Vec<f32>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let lower = text.to_lowercase();
    let vector = if lower.contains('$') || lower.contains("finance") {
      vec![1.0, 0.0, 0.0]
    } else if lower.contains("anxious") || lower.contains("mental") {
      vec![0.0, 1.0, 0.0]
    } else {
      vec![0.0, 0.0, 1.0]
    };
    Ok(vector)
  }
}

/// Answers topic prompts with a fixed list and report prompts with a canned report
struct ScriptedGenerator {
  topics: String,
  prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
  fn new(topics: &str) -> Self {
    Self { topics: topics.to_string(), prompts: Mutex::new(Vec::new()) }
  }

  fn prompts(&self) -> Vec<String> {
    self.prompts.lock().unwrap().clone()
  }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
  async fn generate(&self, prompt: &str) -> reverie::Result<String> {
    self.prompts.lock().unwrap().push(prompt.to_string());
    if prompt.contains("Identified topics:") {
      Ok(self.topics.clone())
    } else {
      Ok(format!("Report based on {} characters of prompt", prompt.len()))
    }
  }
}

/// Answers topic prompts with a fixed list and numbers every report it writes
struct NumberedGenerator {
  topics: String,
  reports: AtomicUsize,
}

#[async_trait]
impl GenerationService for NumberedGenerator {
  async fn generate(&self, prompt: &str) -> reverie::Result<String> {
    if prompt.contains("Identified topics:") {
      return Ok(self.topics.clone());
    }
    let n = self.reports.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(format!("report {n}"))
  }
}

struct FailingGenerator;

#[async_trait]
impl GenerationService for FailingGenerator {
  async fn generate(&self, _prompt: &str) -> reverie::Result<String> {
    Err(AnalysisError::service_failure("generation request", "connection refused"))
  }
}

fn config() -> AnalysisConfig {
  AnalysisConfig { timeout_secs: 5, language: "English".to_string(), ..AnalysisConfig::default() }
}

fn raw_entries() -> Vec<JournalEntry> {
  let date = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
  vec![
    JournalEntry::new(date, "Spent $50 on groceries"),
    JournalEntry::new(date, "Felt anxious about deadline"),
  ]
}

#[tokio::test]
async fn test_end_to_end_two_topics() {
  let embedder = KeywordEmbedder::default();
  let generator = ScriptedGenerator::new("Here you go:\n• Finances\n• Mental Health\nThat's all.");

  let mut entries = raw_entries();
  let policy = config().retry_policy();
  let embedded = populate_embeddings(&mut entries, &embedder, policy).await.unwrap();
  assert_eq!(embedded, 2);

  let analyzer = Analyzer::new(&embedder, &generator, &config());
  let result = analyzer.analyze(&entries).await.unwrap();

  assert_eq!(result.topics().collect::<Vec<_>>(), vec!["Finances", "Mental Health"]);
  assert!(!result.get("Finances").unwrap().is_empty());
  assert!(!result.get("Mental Health").unwrap().is_empty());
  assert_eq!(result.report("Finances").unwrap().category, Category::Finances);
  assert_eq!(result.report("Mental Health").unwrap().category, Category::MentalHealth);

  let prompts = generator.prompts();
  assert_eq!(prompts.len(), 3);
  assert!(prompts[1].contains("- Spent $50 on groceries"));
  assert!(!prompts[1].contains("Felt anxious"));
  assert!(prompts[2].contains("- Felt anxious about deadline"));
  assert!(prompts[2].contains("Please provide it in English"));
}

#[tokio::test]
async fn test_empty_entries_make_zero_service_calls() {
  let embedder = KeywordEmbedder::default();
  let generator = ScriptedGenerator::new("• Work");

  let analyzer = Analyzer::new(&embedder, &generator, &config());
  let result = analyzer.analyze(&[]).await.unwrap();

  assert!(result.is_empty());
  assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
  assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_distinct_labels_in_same_category_get_separate_reports() {
  let embedder = KeywordEmbedder::default();
  let generator = ScriptedGenerator::new("• Money\n• Finances");

  let mut entries = raw_entries();
  populate_embeddings(&mut entries, &embedder, config().retry_policy()).await.unwrap();

  let result = Analyzer::new(&embedder, &generator, &config()).analyze(&entries).await.unwrap();
  assert_eq!(result.len(), 2);
  assert_eq!(result.report("Money").unwrap().category, Category::Finances);
  assert_eq!(result.report("Finances").unwrap().category, Category::Finances);
}

#[tokio::test]
async fn test_repeated_label_keeps_first_position_and_latest_report() {
  let embedder = KeywordEmbedder::default();
  let generator =
    NumberedGenerator { topics: "• Work\n• Money\n• Work".to_string(), reports: AtomicUsize::new(0) };

  let mut entries = raw_entries();
  populate_embeddings(&mut entries, &embedder, config().retry_policy()).await.unwrap();

  let result = Analyzer::new(&embedder, &generator, &config()).analyze(&entries).await.unwrap();

  assert_eq!(generator.reports.load(Ordering::SeqCst), 3);
  assert_eq!(result.topics().collect::<Vec<_>>(), vec!["Work", "Money"]);
  assert_eq!(result.get("Work"), Some("report 3"));
  assert_eq!(result.get("Money"), Some("report 2"));
  assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"Work":"report 3","Money":"report 2"}"#);
}

#[tokio::test]
async fn test_generation_failure_aborts_without_partial_result() {
  let embedder = KeywordEmbedder::default();
  let mut entries = raw_entries();
  populate_embeddings(&mut entries, &embedder, config().retry_policy()).await.unwrap();

  let config = AnalysisConfig { timeout_secs: 1, ..config() };
  let result = Analyzer::new(&embedder, &FailingGenerator, &config).analyze(&entries).await;

  match result {
    Err(AnalysisError::ServiceFailure { operation, .. }) => {
      assert_eq!(operation, "generation request")
    }
    other => panic!("expected service failure, got {other:?}"),
  }
}

#[tokio::test]
async fn test_entries_without_embeddings_are_ignored_by_retrieval() {
  let embedder = KeywordEmbedder::default();
  let generator = ScriptedGenerator::new("• Finances");

  let entries = raw_entries();
  let result = Analyzer::new(&embedder, &generator, &config()).analyze(&entries).await.unwrap();

  assert_eq!(result.report("Finances").unwrap().context_entries, 0);
  assert!(generator.prompts()[1].contains("not enough matching journal history"));
  assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_generator_times_out() {
  struct SlowGenerator;

  #[async_trait]
  impl GenerationService for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> reverie::Result<String> {
      tokio::time::sleep(Duration::from_secs(10)).await;
      Ok("too late".to_string())
    }
  }

  let embedder = KeywordEmbedder::default();
  let config = AnalysisConfig { timeout_secs: 1, ..config() };
  let result = Analyzer::new(&embedder, &SlowGenerator, &config).analyze(&raw_entries()).await;

  assert!(matches!(result, Err(AnalysisError::Timeout { .. })));
}
