//! Schema normalization for heterogeneous labeled-dataset files.
//!
//! Upstream datasets label sentence sequences under varying field names; the
//! canonical shape downstream is `{sections, section_names}`. The transformer
//! renames `sentences` to `sections`, stringifies `codes` into
//! `section_names`, discards everything else, and can subsample the record
//! set before transforming.

use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::records::AnnotatedSample;

/// A required field was absent from a dataset record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    field: &'static str,
}

impl SchemaError {
    /// The name of the missing field.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing '{}'", self.field)
    }
}

impl std::error::Error for SchemaError {}

/// The top-level JSON shape of a dataset file was not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedFormatError {
    detail: String,
}

impl fmt::Display for UnsupportedFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported JSON format: {}", self.detail)
    }
}

impl std::error::Error for UnsupportedFormatError {}

/// One record of a raw labeled dataset. Fields beyond `sentences` and
/// `codes` are dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Ordered sentence texts; required for transformation.
    #[serde(default)]
    pub sentences: Option<Vec<String>>,
    /// Ordered label values, stringified into `section_names`; required.
    #[serde(default)]
    pub codes: Option<Vec<Value>>,
}

/// Recognized top-level shapes of a raw dataset file.
#[derive(Debug, Clone)]
pub enum RawDataset {
    /// A single JSON object: its keys are reported, not transformed.
    Object {
        /// The object's keys in document order.
        keys: Vec<String>,
        /// The corresponding values, for inspection output.
        values: Vec<Value>,
    },
    /// A JSON array of record objects, ready for transformation.
    Records(Vec<RawRecord>),
}

/// Classifies a parsed dataset file into one of the supported shapes.
///
/// Anything other than an object or an array of objects fails with an
/// [`UnsupportedFormatError`] and yields no output.
pub fn parse_raw_dataset(value: Value) -> Result<RawDataset, UnsupportedFormatError> {
    match value {
        Value::Object(map) => {
            let (keys, values) = map.into_iter().unzip();
            Ok(RawDataset::Object { keys, values })
        }
        Value::Array(items) => {
            if !items.iter().all(Value::is_object) {
                return Err(UnsupportedFormatError {
                    detail: "array with non-object elements".to_string(),
                });
            }
            let records = items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    serde_json::from_value(item).map_err(|err| UnsupportedFormatError {
                        detail: format!("record {index} has unexpected field types: {err}"),
                    })
                })
                .collect::<Result<_, _>>()?;
            Ok(RawDataset::Records(records))
        }
        other => Err(UnsupportedFormatError {
            detail: json_shape(&other).to_string(),
        }),
    }
}

fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Stringifies one label value the way the canonical schema expects:
/// strings stay bare, everything else uses its JSON rendering.
fn code_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reshapes raw records into canonical annotated samples.
#[derive(Debug, Clone)]
pub struct DatasetTransformer {
    subsample: i64,
}

impl DatasetTransformer {
    /// Builds a transformer.
    ///
    /// `subsample >= 0` draws that many records (capped at the input size)
    /// uniformly without replacement before transforming; a negative value
    /// keeps every record in original order.
    pub fn new(subsample: i64) -> Self {
        Self { subsample }
    }

    /// Transforms the full record collection into canonical samples.
    ///
    /// The sample's order is the random draw's order when subsampling, and
    /// the input order otherwise. The first record missing a required field
    /// fails the whole collection.
    pub fn transform<R: Rng>(
        &self,
        records: Vec<RawRecord>,
        rng: &mut R,
    ) -> Result<Vec<AnnotatedSample>, SchemaError> {
        let picked = if self.subsample >= 0 {
            let amount = (self.subsample as usize).min(records.len());
            let indices = rand::seq::index::sample(rng, records.len(), amount);
            let mut slots: Vec<Option<RawRecord>> = records.into_iter().map(Some).collect();
            indices
                .into_iter()
                .map(|i| slots[i].take().expect("indices are distinct"))
                .collect()
        } else {
            records
        };

        picked
            .into_iter()
            .map(|record| {
                let sections = record.sentences.ok_or(SchemaError { field: "sentences" })?;
                let codes = record.codes.ok_or(SchemaError { field: "codes" })?;
                let section_names = codes.iter().map(code_to_string).collect();
                Ok(AnnotatedSample::new(sections, section_names))
            })
            .collect()
    }
}
