use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use symtext::embedder::openai::{OpenAiConfig, OpenAiEmbedder};
use symtext::segmenter::BreakRuleSegmenter;
use symtext::{Codebook, PipelineConfig, Quantizer, SymbolizationPipeline};

#[derive(Parser, Debug)]
#[command(
    name = "symtext-symbolize",
    about = "Convert generated documents into codebook symbol sequences"
)]
struct SymbolizeCli {
    /// Path to the generation file (JSON array of objects with `pred_text`)
    input: PathBuf,

    /// Run the text cleaner before segmentation
    #[arg(long, default_value_t = false)]
    clean: bool,

    /// Process only the first N generations
    #[arg(long, alias = "max_samples")]
    max_samples: Option<usize>,

    /// Path to the codebook artifact (JSON array of centroid vectors)
    #[arg(long, env = "SYMTEXT_CODEBOOK", default_value = "codebook.json")]
    codebook: PathBuf,

    /// Output file for the annotated samples
    #[arg(long, env = "SYMTEXT_OUTPUT", default_value = "tmp-output.json")]
    output: PathBuf,

    /// API key for the embeddings endpoint
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_api_key: String,

    /// Embedding model identifier
    #[arg(
        long,
        env = "SYMTEXT_OPENAI_MODEL",
        default_value = "text-embedding-3-small"
    )]
    openai_model: String,

    /// Optional dimension override when supported by the model
    #[arg(long, env = "SYMTEXT_OPENAI_DIMENSIONS")]
    openai_dimensions: Option<usize>,

    /// Base URL for the OpenAI-compatible API
    #[arg(
        long,
        env = "SYMTEXT_OPENAI_BASE",
        default_value = "https://api.openai.com/v1"
    )]
    openai_base_url: String,

    /// Max sentences per embedding request
    #[arg(long, env = "SYMTEXT_OPENAI_BATCH", default_value_t = 32)]
    batch_size: usize,

    /// Max seconds to wait for each embedding request
    #[arg(long, env = "SYMTEXT_OPENAI_TIMEOUT_SECS", default_value_t = 30)]
    openai_timeout_secs: u64,

    /// Number of retries for rate limits or transient errors
    #[arg(long, env = "SYMTEXT_OPENAI_MAX_RETRIES", default_value_t = 5)]
    max_retries: usize,
}

/// One entry of the generation file; every field except `pred_text` is
/// ignored.
#[derive(Debug, Deserialize)]
struct Generation {
    pred_text: String,
}

fn main() -> Result<()> {
    let cli = SymbolizeCli::parse();

    let mut documents = load_generations(&cli.input)?;
    if let Some(max) = cli.max_samples {
        documents.truncate(max);
    }

    let embedder = OpenAiEmbedder::new(OpenAiConfig {
        api_key: cli.openai_api_key,
        base_url: cli.openai_base_url,
        model: cli.openai_model,
        dimensions: cli.openai_dimensions,
        timeout: Duration::from_secs(cli.openai_timeout_secs.max(1)),
        max_retries: cli.max_retries.max(1),
        batch_size: cli.batch_size.max(1),
    })?;
    let codebook = Codebook::load(&cli.codebook)
        .with_context(|| format!("failed to load codebook from {}", cli.codebook.display()))?;
    let config = PipelineConfig {
        codebook_path: cli.codebook,
        output_path: cli.output,
    };
    let pipeline = SymbolizationPipeline::new(
        BreakRuleSegmenter::new(),
        embedder,
        Quantizer::new(codebook),
        config,
    );

    let samples = pipeline.process_all(&documents, cli.clean)?;
    pipeline.write_output(&samples)?;
    println!(
        "Data successfully saved to {}",
        pipeline.config().output_path.display()
    );
    Ok(())
}

fn load_generations(path: &PathBuf) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let generations: Vec<Generation> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse generation file {}", path.display()))?;
    Ok(generations.into_iter().map(|g| g.pred_text).collect())
}
