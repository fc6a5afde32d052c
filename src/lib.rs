#![warn(missing_docs)]
//! Core library entry points for the sheetvec embedding pipeline.

pub mod embedder;
pub mod loader;
pub mod pipeline;
pub mod writer;

pub use embedder::{BedrockEmbedder, EmbeddingError, EmbeddingRequest, EmbeddingService};
pub use loader::{load_rows, CellValue, LoadError, Row};
pub use pipeline::{run_pipeline, EmbeddingRecord, FixedDelay, Pacer};
pub use writer::{write_results, WriteError};
