use crate::error::{AnalysisError, Result};
use crate::journal::JournalEntry;

/// Calculate cosine similarity between two embeddings.
///
/// Vectors of different length are an error; a zero-magnitude vector scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
  if a.len() != b.len() {
    return Err(AnalysisError::dimension_mismatch(a.len(), b.len()));
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    Ok(0.0)
  } else {
    Ok((dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0))
  }
}

/// A journal entry paired with its similarity to the current query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEntry<'a> {
  pub entry: &'a JournalEntry,
  pub similarity: f32,
}

/// Scores candidates against a query and keeps the closest ones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityIndex {
  /// Candidates must score strictly above this
  threshold: f32,
  /// Maximum number of candidates kept
  limit: usize,
}

impl Default for SimilarityIndex {
  fn default() -> Self {
    Self::new(0.6, 5)
  }
}

impl SimilarityIndex {
  pub fn new(threshold: f32, limit: usize) -> Self {
    Self { threshold, limit }
  }

  /// Score every candidate against `query`, ranked by descending similarity.
  ///
  /// Ties keep their input order.
  pub fn score<'v, T>(
    &self,
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, &'v [f32])>,
  ) -> Result<Vec<(T, f32)>> {
    let mut scored = candidates
      .into_iter()
      .map(|(id, vector)| cosine_similarity(query, vector).map(|similarity| (id, similarity)))
      .collect::<Result<Vec<_>>>()?;

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored)
  }

  /// Apply the threshold and limit to an already ranked list
  pub fn select<T>(&self, ranked: Vec<(T, f32)>) -> Vec<(T, f32)> {
    ranked
      .into_iter()
      .filter(|(_, similarity)| *similarity > self.threshold)
      .take(self.limit)
      .collect()
  }

  /// Entries most relevant to `query`. Entries without an embedding are not candidates.
  pub fn relevant_entries<'a>(
    &self,
    query: &[f32],
    entries: &'a [JournalEntry],
  ) -> Result<Vec<ScoredEntry<'a>>> {
    let candidates = entries
      .iter()
      .filter_map(|entry| entry.embedding.as_deref().map(|embedding| (entry, embedding)));

    let ranked = self.score(query, candidates)?;
    for (entry, similarity) in &ranked {
      tracing::debug!(date = %entry.date, similarity, "scored entry");
    }

    Ok(
      self
        .select(ranked)
        .into_iter()
        .map(|(entry, similarity)| ScoredEntry { entry, similarity })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn entry(text: &str, embedding: Option<Vec<f32>>) -> JournalEntry {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let entry = JournalEntry::new(date, text);
    match embedding {
      Some(vector) => entry.with_embedding(vector),
      None => entry,
    }
  }

  /// Unit vector in the plane whose cosine with [1, 0] is `similarity`
  fn at_similarity(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).sqrt()]
  }

  #[test]
  fn test_identical_vectors_score_one() {
    let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
    assert!((sim - 1.0).abs() < 1e-6);
  }

  #[test]
  fn test_opposite_and_orthogonal_vectors() {
    let opposite = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
    assert!((opposite + 1.0).abs() < 1e-6);

    let orthogonal = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
    assert!(orthogonal.abs() < 1e-6);
  }

  #[test]
  fn test_similarity_is_symmetric() {
    let pairs = [
      (vec![0.3, -1.2, 4.0], vec![2.0, 0.5, -0.7]),
      (vec![1.0, 1.0], vec![1.0, 0.0]),
      (vec![-5.0, 2.5, 0.1, 9.0], vec![0.0, 3.3, -2.2, 1.0]),
    ];
    for (a, b) in pairs {
      assert_eq!(cosine_similarity(&a, &b).unwrap(), cosine_similarity(&b, &a).unwrap());
    }
  }

  #[test]
  fn test_similarity_is_bounded() {
    let vectors = [vec![1e-3, 7.0, -2.0], vec![1e6, 1e6, 1e6], vec![-0.5, -0.5, 0.25]];
    for a in &vectors {
      for b in &vectors {
        let sim = cosine_similarity(a, b).unwrap();
        assert!((-1.0..=1.0).contains(&sim), "{sim} out of range");
      }
    }
  }

  #[test]
  fn test_zero_vector_scores_zero() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
    assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]).unwrap(), 0.0);
    assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
  }

  #[test]
  fn test_dimension_mismatch_fails() {
    let result = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
    assert!(matches!(result, Err(AnalysisError::DimensionMismatch { left: 2, right: 3 })));
  }

  #[test]
  fn test_score_ranks_descending_with_stable_ties() {
    let index = SimilarityIndex::default();
    let a = [1.0, 0.0];
    let b = [0.0, 1.0];
    let c = [2.0, 0.0];
    let ranked = index.score(&[1.0, 0.0], [("a", &a[..]), ("b", &b[..]), ("c", &c[..])]).unwrap();

    let ids: Vec<_> = ranked.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
  }

  #[test]
  fn test_select_keeps_top_five_above_threshold() {
    let similarities = [0.9, 0.8, 0.7, 0.65, 0.61, 0.59, 0.3];
    let entries: Vec<_> = similarities
      .iter()
      .enumerate()
      .map(|(i, s)| entry(&format!("entry {i}"), Some(at_similarity(*s))))
      .collect();

    let selected = SimilarityIndex::default().relevant_entries(&[1.0, 0.0], &entries).unwrap();

    let texts: Vec<_> = selected.iter().map(|s| s.entry.text.as_str()).collect();
    assert_eq!(texts, vec!["entry 0", "entry 1", "entry 2", "entry 3", "entry 4"]);
    assert!(selected.iter().all(|s| s.similarity > 0.6));
  }

  #[test]
  fn test_threshold_is_strict() {
    let index = SimilarityIndex::new(0.5, 5);
    let selected = index.select(vec![("at", 0.5), ("above", 0.500_1)]);
    assert_eq!(selected, vec![("above", 0.500_1)]);
  }

  #[test]
  fn test_limit_truncates_after_ranking() {
    let index = SimilarityIndex::new(0.6, 5);
    let entries: Vec<_> = (0..8).map(|i| entry(&format!("same {i}"), Some(vec![1.0, 0.0]))).collect();

    let selected = index.relevant_entries(&[1.0, 0.0], &entries).unwrap();
    let texts: Vec<_> = selected.iter().map(|s| s.entry.text.as_str()).collect();
    assert_eq!(texts, vec!["same 0", "same 1", "same 2", "same 3", "same 4"]);
  }

  #[test]
  fn test_entries_without_embedding_are_not_candidates() {
    let entries = vec![entry("no vector", None), entry("vector", Some(vec![1.0, 0.0]))];
    let selected = SimilarityIndex::default().relevant_entries(&[1.0, 0.0], &entries).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].entry.text, "vector");
  }

  #[test]
  fn test_relevant_entries_rejects_mismatched_dimensions() {
    let entries = vec![entry("short", Some(vec![1.0, 0.0, 0.0]))];
    let result = SimilarityIndex::default().relevant_entries(&[1.0, 0.0], &entries);
    assert!(matches!(result, Err(AnalysisError::DimensionMismatch { .. })));
  }
}
