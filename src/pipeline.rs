//! Orchestration of the symbolization stages over a batch of documents.
//!
//! The pipeline is constructed with already-initialized collaborators: a
//! segmenter, an embedder, and a quantizer holding the loaded codebook. It
//! never loads models itself, which keeps it runnable against stub
//! collaborators in tests.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cleaner::TextCleaner;
use crate::debug_log;
use crate::embedder::Embedder;
use crate::quantizer::Quantizer;
use crate::records::AnnotatedSample;
use crate::segmenter::SentenceSegmenter;

/// File locations the pipeline reads from and writes to.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the codebook artifact the quantizer was loaded from.
    pub codebook_path: PathBuf,
    /// Path the annotated output collection is written to.
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            codebook_path: PathBuf::from("codebook.json"),
            output_path: PathBuf::from("tmp-output.json"),
        }
    }
}

/// Clean → segment → embed → quantize orchestrator.
pub struct SymbolizationPipeline<S, E> {
    segmenter: S,
    embedder: E,
    quantizer: Quantizer,
    cleaner: TextCleaner,
    config: PipelineConfig,
}

impl<S, E> SymbolizationPipeline<S, E>
where
    S: SentenceSegmenter,
    E: Embedder,
{
    /// Builds a pipeline from its collaborators.
    pub fn new(segmenter: S, embedder: E, quantizer: Quantizer, config: PipelineConfig) -> Self {
        Self {
            segmenter,
            embedder,
            quantizer,
            cleaner: TextCleaner::new(),
            config,
        }
    }

    /// The configured file locations.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Converts one document into `(section_names, sections)`.
    ///
    /// Both sequences are index-aligned and always the same length; an empty
    /// document yields two empty sequences. With `clean` set, the cleaner
    /// runs before segmentation and its encoding failures propagate.
    pub fn process(&self, document: &str, clean: bool) -> Result<(Vec<String>, Vec<String>)> {
        let text = if clean {
            self.cleaner
                .clean(document)
                .context("text cleaning failed")?
        } else {
            document.to_string()
        };

        let sections = self.segmenter.segment(&text);
        if sections.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let embeddings = self
            .embedder
            .embed(&sections)
            .context("sentence embedding failed")?;
        anyhow::ensure!(
            embeddings.len() == sections.len(),
            "embedder returned {} vectors for {} sentences",
            embeddings.len(),
            sections.len()
        );

        let symbols = self
            .quantizer
            .assign_batch(&embeddings)
            .context("codebook assignment failed")?;
        let section_names = symbols.iter().map(|s| s.to_string()).collect();
        Ok((section_names, sections))
    }

    /// Processes every document in input order.
    ///
    /// Failure policy: the batch aborts on the first failing document and the
    /// error carries its position. Results for prior documents are discarded
    /// with it; nothing is observable until the whole batch succeeds, so a
    /// failed run can never leave partial output behind.
    pub fn process_all(&self, documents: &[String], clean: bool) -> Result<Vec<AnnotatedSample>> {
        let mut samples = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            let (section_names, sections) = self
                .process(document, clean)
                .with_context(|| format!("failed to process document {index}"))?;
            debug_log!(
                "document {index}: {} sentences -> {} symbols",
                sections.len(),
                section_names.len()
            );
            samples.push(AnnotatedSample::new(sections, section_names).with_prediction());
        }
        Ok(samples)
    }

    /// Writes the batch output to the configured path as one atomic JSON
    /// array.
    pub fn write_output(&self, samples: &[AnnotatedSample]) -> Result<()> {
        write_json_atomic(&self.config.output_path, samples)
    }
}

/// Serializes `value` as JSON to `path` via a temp file and rename, so
/// readers never observe a partially-written artifact.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let file = fs::File::create(&tmp)
        .with_context(|| format!("failed to create temporary file {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).context("failed to serialize output")?;
    writer.flush().context("failed to flush output")?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move output into place at {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantizer::Codebook;
    use crate::segmenter::BreakRuleSegmenter;
    use pretty_assertions::assert_eq;

    /// Embedder stub that maps each sentence to a 1-d vector of its word
    /// count.
    struct WordCountEmbedder;

    impl Embedder for WordCountEmbedder {
        fn embed(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(sentences
                .iter()
                .map(|s| vec![s.split_whitespace().count() as f32])
                .collect())
        }
    }

    /// Embedder stub that always errors.
    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _sentences: &[String]) -> Result<Vec<Vec<f32>>> {
            anyhow::bail!("model unavailable")
        }
    }

    fn word_count_pipeline() -> SymbolizationPipeline<BreakRuleSegmenter, WordCountEmbedder> {
        // Centroids at 1, 3, and 5 words.
        let codebook =
            Codebook::from_centroids(vec![vec![1.0], vec![3.0], vec![5.0]]).expect("codebook");
        SymbolizationPipeline::new(
            BreakRuleSegmenter::new(),
            WordCountEmbedder,
            Quantizer::new(codebook),
            PipelineConfig::default(),
        )
    }

    #[test]
    fn empty_document_yields_empty_sequences() {
        let pipeline = word_count_pipeline();
        let (names, sections) = pipeline.process("", false).expect("process");
        assert_eq!(names, Vec::<String>::new());
        assert_eq!(sections, Vec::<String>::new());
    }

    #[test]
    fn sections_and_names_stay_aligned() {
        let pipeline = word_count_pipeline();
        let (names, sections) = pipeline
            .process("One. Three word line. This one has five words in it.", false)
            .expect("process");
        assert_eq!(names.len(), sections.len());
        assert_eq!(names, vec!["0", "1", "2"]);
        assert_eq!(sections[0], "One.");
    }

    #[test]
    fn cleaning_is_applied_when_requested() {
        let pipeline = word_count_pipeline();
        let (_, sections) = pipeline.process("Before <7> after.", true).expect("process");
        assert_eq!(sections, vec!["Before   after."]);
    }

    #[test]
    fn batch_preserves_input_order_and_duplicates_predictions() {
        let pipeline = word_count_pipeline();
        let documents = vec!["One.".to_string(), "Two words. Another pair here.".to_string()];
        let samples = pipeline.process_all(&documents, false).expect("process all");

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].sections, vec!["One."]);
        assert_eq!(samples[1].section_names.len(), samples[1].sections.len());
        for sample in &samples {
            assert_eq!(
                sample.predicted_section_names.as_ref(),
                Some(&sample.section_names)
            );
        }
    }

    #[test]
    fn batch_aborts_on_first_failure() {
        let codebook = Codebook::from_centroids(vec![vec![1.0]]).expect("codebook");
        let pipeline = SymbolizationPipeline::new(
            BreakRuleSegmenter::new(),
            FailingEmbedder,
            Quantizer::new(codebook),
            PipelineConfig::default(),
        );
        let err = pipeline
            .process_all(&["Only document.".to_string()], false)
            .unwrap_err();
        assert!(err.to_string().contains("document 0"));
    }

    #[test]
    fn output_write_is_atomic_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("out.json");
        let samples = vec![
            AnnotatedSample::new(vec!["hi".into()], vec!["4".into()]).with_prediction(),
        ];

        write_json_atomic(&output, &samples).expect("write");
        assert!(output.exists());
        assert!(!dir.path().join("out.json.tmp").exists());

        let body = fs::read_to_string(&output).expect("read");
        let parsed: Vec<AnnotatedSample> = serde_json::from_str(&body).expect("parse");
        assert_eq!(parsed, samples);
    }
}
