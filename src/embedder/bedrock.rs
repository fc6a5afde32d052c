//! Bedrock-runtime embedding client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::{EmbeddingError, EmbeddingRequest, EmbeddingService};

/// Blocking embeddings client that talks to the Amazon Bedrock runtime.
#[derive(Clone)]
pub struct BedrockEmbedder {
    client: Client,
    base_url: String,
}

impl BedrockEmbedder {
    /// Builds a new Bedrock runtime client for the given region, using
    /// bearer-token (API key) authentication.
    pub fn new(api_key: String, region: String, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Bedrock API key");
        anyhow::ensure!(!region.trim().is_empty(), "missing AWS region");
        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid Bedrock API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Bedrock HTTP client")?;
        let base_url = format!("https://bedrock-runtime.{}.amazonaws.com", region.trim());
        Ok(Self { client, base_url })
    }

    fn invoke_url(&self, model_id: &str) -> String {
        format!("{}/model/{}/invoke", self.base_url, model_id)
    }
}

impl EmbeddingService for BedrockEmbedder {
    fn embed(&self, request: &EmbeddingRequest<'_>) -> Result<Vec<f32>, EmbeddingError> {
        let payload = InvokeModelBody {
            input_text: request.body,
        };
        let response = self
            .client
            .post(self.invoke_url(request.model_id))
            .json(&payload)
            .send()
            .map_err(EmbeddingError::Http)?;
        let status = response.status();
        let body = response.text().map_err(EmbeddingError::Http)?;
        if !status.is_success() {
            return Err(EmbeddingError::Status { status, body });
        }
        let parsed: InvokeModelResponse =
            serde_json::from_str(&body).map_err(EmbeddingError::Malformed)?;
        parsed.embedding.ok_or(EmbeddingError::MissingEmbedding)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeModelBody<'a> {
    input_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvokeModelResponse {
    embedding: Option<Vec<f32>>,
}
