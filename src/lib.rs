#![warn(missing_docs)]
//! Core library entry points for the symtext symbolization toolkit.
//!
//! The symbolization path turns a free-form document into an ordered sequence
//! of discrete symbols: clean the text, split it into sentences, embed each
//! sentence, and assign every embedding the index of its nearest codebook
//! centroid. A separate dataset path reshapes already-labeled records into the
//! canonical `{sections, section_names}` layout consumed downstream.

pub mod cleaner;
pub mod dataset;
pub mod embedder;
pub mod pipeline;
pub mod quantizer;
pub mod records;
pub mod segmenter;

pub use cleaner::{EncodingError, TextCleaner};
pub use dataset::{
    parse_raw_dataset, DatasetTransformer, RawDataset, RawRecord, SchemaError,
    UnsupportedFormatError,
};
pub use embedder::Embedder;
pub use pipeline::{write_json_atomic, PipelineConfig, SymbolizationPipeline};
pub use quantizer::{Codebook, CodebookError, Quantizer};
pub use records::AnnotatedSample;
pub use segmenter::{BreakRuleSegmenter, SentenceSegmenter};

#[cfg(feature = "debug_logs")]
#[macro_export]
// Routes diagnostics through `eprintln!` when the `debug_logs` feature is on.
macro_rules! debug_log {
        ($($arg:tt)*) => {
            eprintln!($($arg)*);
        };
    }
#[cfg(not(feature = "debug_logs"))]
#[macro_export]
// Compiles the diagnostics away when the feature is off.
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}
