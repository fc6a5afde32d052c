use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use sheetvec::embedder::BedrockEmbedder;
use sheetvec::pipeline::{run_pipeline, FixedDelay};
use sheetvec::{load_rows, write_results};

#[derive(Parser, Debug)]
#[command(
    name = "sheetvec",
    about = "Embed spreadsheet rows via the Amazon Bedrock runtime"
)]
struct Cli {
    /// Path to the input XLSX workbook (first row is the header)
    #[arg(long, env = "SHEETVEC_INPUT")]
    input: PathBuf,

    /// Worksheet to read (defaults to the first sheet in the workbook)
    #[arg(long, env = "SHEETVEC_SHEET")]
    sheet: Option<String>,

    /// Embedding model identifier (e.g. amazon.titan-embed-text-v2:0)
    #[arg(long, env = "SHEETVEC_MODEL_ID")]
    model_id: String,

    /// AWS region hosting the Bedrock runtime endpoint
    #[arg(long, env = "SHEETVEC_AWS_REGION", default_value = "us-west-2")]
    aws_region: String,

    /// Output JSON file for the embedding records
    #[arg(long, env = "SHEETVEC_OUTPUT", default_value = "embeddings_output.json")]
    output: PathBuf,

    /// Milliseconds to wait between successive embedding calls
    #[arg(long, env = "SHEETVEC_DELAY_MS", default_value_t = 500)]
    delay_ms: u64,

    /// Max seconds to wait for each embedding request
    #[arg(long, env = "SHEETVEC_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Bedrock API key used for bearer authentication
    #[arg(long, env = "AWS_BEARER_TOKEN_BEDROCK")]
    api_key: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rows = load_rows(&cli.input, cli.sheet.as_deref())
        .with_context(|| format!("failed to load {:?}", cli.input))?;
    eprintln!("loaded {} row(s) from {:?}.", rows.len(), cli.input);

    let embedder = BedrockEmbedder::new(
        cli.api_key,
        cli.aws_region,
        Duration::from_secs(cli.timeout_secs.max(1)),
    )?;
    let pacer = FixedDelay::new(Duration::from_millis(cli.delay_ms));

    let records = run_pipeline(&rows, &embedder, &cli.model_id, &pacer);

    write_results(&records, &cli.output)
        .with_context(|| format!("failed to write {:?}", cli.output))?;
    eprintln!(
        "embedding complete: {} of {} row(s) embedded ({} skipped); saved to {:?}.",
        records.len(),
        rows.len(),
        rows.len() - records.len(),
        cli.output
    );
    Ok(())
}
