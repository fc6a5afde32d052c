//! Embedding service seam plus the Bedrock-backed implementation.

use std::fmt;

pub mod bedrock;

pub use bedrock::BedrockEmbedder;

/// Trait implemented by concrete embedding backends.
pub trait EmbeddingService {
    /// Produces the embedding vector for one request, or an error when no
    /// vector could be obtained.
    fn embed(&self, request: &EmbeddingRequest<'_>) -> Result<Vec<f32>, EmbeddingError>;
}

/// Request envelope for a single embedding call. Lives only for the duration
/// of that call.
pub struct EmbeddingRequest<'a> {
    /// Model identifier the backend should invoke.
    pub model_id: &'a str,
    /// Text to embed.
    pub body: &'a str,
}

/// Errors that can emerge from one embedding call. The pipeline recovers
/// every variant the same way: log and skip the row.
#[derive(Debug)]
pub enum EmbeddingError {
    /// Transport-level failure (connect, timeout, body read).
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status {
        /// HTTP status returned by the service.
        status: reqwest::StatusCode,
        /// Response body, for the diagnostic line.
        body: String,
    },
    /// The response body was not valid JSON.
    Malformed(serde_json::Error),
    /// The response parsed but carried no `embedding` field.
    MissingEmbedding,
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::Http(err) => write!(f, "request failed: {err}"),
            EmbeddingError::Status { status, body } => {
                write!(f, "service returned {status}: {body}")
            }
            EmbeddingError::Malformed(err) => write!(f, "malformed response: {err}"),
            EmbeddingError::MissingEmbedding => {
                f.write_str("response carried no embedding field")
            }
        }
    }
}

impl std::error::Error for EmbeddingError {}
