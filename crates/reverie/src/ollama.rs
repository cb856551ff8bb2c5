//! HTTP client for an Ollama-compatible model server
//!
//! Implements both [`EmbeddingService`] and [`GenerationService`] against
//! `/api/embeddings` and `/api/generate`. Every transport, status or decode
//! problem surfaces as [`AnalysisError::ServiceFailure`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::services::{EmbeddingService, GenerationService};

const EMBEDDING_OPERATION: &str = "embedding request";
const GENERATION_OPERATION: &str = "generation request";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  #[serde(default)]
  embedding: Option<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: &'a str,
  stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  response: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

pub struct OllamaClient {
  client: Client,
  base_url: String,
  embedding_model: String,
  generation_model: String,
}

impl OllamaClient {
  pub fn new(config: &AnalysisConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(|e| AnalysisError::invalid_config(format!("failed to create HTTP client: {e}")))?;

    Ok(Self {
      client,
      base_url: config.base_url().to_string(),
      embedding_model: config.embedding_model.clone(),
      generation_model: config.generation_model.clone(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  async fn post<B, R>(&self, operation: &str, path: &str, body: &B) -> Result<R>
  where
    B: Serialize + ?Sized + Sync,
    R: DeserializeOwned,
  {
    let url = format!("{}{}", self.base_url, path);
    let response = self
      .client
      .post(&url)
      .json(body)
      .send()
      .await
      .map_err(|e| AnalysisError::service_failure(operation, e.to_string()))?;

    let status = response.status();
    let text = response
      .text()
      .await
      .map_err(|e| AnalysisError::service_failure(operation, e.to_string()))?;

    if !status.is_success() {
      let detail = serde_json::from_str::<ErrorBody>(&text).map(|body| body.error).unwrap_or(text);
      return Err(AnalysisError::service_failure(operation, format!("HTTP {status}: {detail}")));
    }

    serde_json::from_str(&text)
      .map_err(|e| AnalysisError::service_failure(operation, format!("undecodable response: {e}")))
  }
}

#[async_trait]
impl EmbeddingService for OllamaClient {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let request = EmbeddingRequest { model: &self.embedding_model, prompt: text };
    let response: EmbeddingResponse =
      self.post(EMBEDDING_OPERATION, "/api/embeddings", &request).await?;

    match response.embedding {
      Some(embedding) if !embedding.is_empty() => Ok(embedding),
      _ => Err(AnalysisError::service_failure(EMBEDDING_OPERATION, "response contained no embedding")),
    }
  }
}

#[async_trait]
impl GenerationService for OllamaClient {
  async fn generate(&self, prompt: &str) -> Result<String> {
    let request = GenerateRequest { model: &self.generation_model, prompt, stream: false };
    let response: GenerateResponse =
      self.post(GENERATION_OPERATION, "/api/generate", &request).await?;

    response.response.ok_or_else(|| {
      AnalysisError::service_failure(GENERATION_OPERATION, "response contained no text")
    })
  }
}
