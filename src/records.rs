//! Shared output record types emitted by both processing paths.

use serde::{Deserialize, Serialize};

/// Canonical labeled sample: section texts plus their symbol labels.
///
/// `sections` and `section_names` are index-aligned and always the same
/// length. The symbolization path additionally fills
/// `predicted_section_names` with a copy of `section_names`; the dataset
/// normalization path leaves it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSample {
    /// Ordered sentence texts.
    pub sections: Vec<String>,
    /// Symbol labels in decimal-string form, one per section.
    pub section_names: Vec<String>,
    /// Model-predicted labels, present only on symbolization output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_section_names: Option<Vec<String>>,
}

impl AnnotatedSample {
    /// Builds a sample from aligned sections and labels.
    pub fn new(sections: Vec<String>, section_names: Vec<String>) -> Self {
        debug_assert_eq!(sections.len(), section_names.len());
        Self {
            sections,
            section_names,
            predicted_section_names: None,
        }
    }

    /// Marks the labels as model predictions by duplicating them into
    /// `predicted_section_names`.
    pub fn with_prediction(mut self) -> Self {
        self.predicted_section_names = Some(self.section_names.clone());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_field_is_omitted_unless_set() {
        let sample = AnnotatedSample::new(vec!["hi".into()], vec!["3".into()]);
        let json = serde_json::to_string(&sample).expect("serialize");
        assert!(!json.contains("predicted_section_names"));

        let predicted = sample.with_prediction();
        let json = serde_json::to_string(&predicted).expect("serialize");
        assert!(json.contains(r#""predicted_section_names":["3"]"#));
    }
}
