//! Sentence-boundary detection contract and a rule-based default.
//!
//! The pipeline treats segmentation as a pluggable collaborator: anything that
//! can split a document into an ordered list of sentences satisfies the trait.
//! `BreakRuleSegmenter` is the shipped implementation; a linguistic model can
//! be swapped in without touching the pipeline.

/// Splits a document into an ordered sequence of sentences.
pub trait SentenceSegmenter {
    /// Returns the document's sentences in the order they appear.
    ///
    /// Empty input yields an empty sequence, never an error. Implementations
    /// must not reorder or merge the sentences they emit.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Rule-based segmenter: breaks after runs of terminal punctuation followed
/// by whitespace.
#[derive(Debug, Clone, Default)]
pub struct BreakRuleSegmenter;

impl BreakRuleSegmenter {
    /// Builds a new rule-based segmenter.
    pub fn new() -> Self {
        Self
    }
}

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

impl SentenceSegmenter for BreakRuleSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            current.push(ch);
            if !is_terminal(ch) {
                continue;
            }
            // Consume the full punctuation run ("?!", "...") as one boundary.
            while let Some(&next) = chars.peek() {
                if is_terminal(next) {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let at_break = match chars.peek() {
                Some(&next) => next.is_whitespace(),
                None => true,
            };
            if at_break {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }

        let tail = current.trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }
}
