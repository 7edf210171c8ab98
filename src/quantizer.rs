//! Nearest-centroid assignment against a fixed, pretrained codebook.
//!
//! The codebook artifact is a JSON array of K centroid vectors sharing one
//! dimension. It is loaded once at pipeline start and never mutated;
//! assignment is a plain Euclidean scan, which for codebooks of a few
//! thousand entries is cheap next to the embedding call that precedes it.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Errors surfaced while loading or querying a codebook.
#[derive(Debug)]
pub enum CodebookError {
    /// The artifact could not be read from disk.
    Io(std::io::Error),
    /// The artifact was not a JSON array of float vectors.
    Parse(serde_json::Error),
    /// The artifact contained no centroids.
    Empty,
    /// A vector's dimension disagreed with the codebook's.
    DimensionMismatch {
        /// Centroid index for load failures, query index for assign failures.
        index: usize,
        /// Dimension established by the first centroid.
        expected: usize,
        /// Dimension actually found.
        found: usize,
    },
}

impl fmt::Display for CodebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read codebook artifact: {err}"),
            Self::Parse(err) => write!(f, "failed to parse codebook artifact: {err}"),
            Self::Empty => write!(f, "codebook artifact contains no centroids"),
            Self::DimensionMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "vector {index} has dimension {found}, codebook expects {expected}"
            ),
        }
    }
}

impl std::error::Error for CodebookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Immutable ordered set of centroid vectors with a uniform dimension.
#[derive(Debug, Clone)]
pub struct Codebook {
    centroids: Vec<Vec<f32>>,
    dim: usize,
}

impl Codebook {
    /// Validates and wraps an in-memory centroid set.
    pub fn from_centroids(centroids: Vec<Vec<f32>>) -> Result<Self, CodebookError> {
        let Some(first) = centroids.first() else {
            return Err(CodebookError::Empty);
        };
        let dim = first.len();
        for (index, centroid) in centroids.iter().enumerate() {
            if centroid.len() != dim {
                return Err(CodebookError::DimensionMismatch {
                    index,
                    expected: dim,
                    found: centroid.len(),
                });
            }
        }
        Ok(Self { centroids, dim })
    }

    /// Loads a codebook from a JSON artifact on disk.
    pub fn load(path: &Path) -> Result<Self, CodebookError> {
        let file = File::open(path).map_err(CodebookError::Io)?;
        let centroids: Vec<Vec<f32>> =
            serde_json::from_reader(BufReader::new(file)).map_err(CodebookError::Parse)?;
        Self::from_centroids(centroids)
    }

    /// Number of centroids (K).
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// True when the codebook holds no centroids; unreachable after a
    /// successful load.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Shared centroid dimension (D).
    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// Assigns embedding vectors the index of their nearest codebook centroid.
#[derive(Debug, Clone)]
pub struct Quantizer {
    codebook: Codebook,
}

impl Quantizer {
    /// Builds a quantizer that owns the codebook for the run.
    pub fn new(codebook: Codebook) -> Self {
        Self { codebook }
    }

    /// Read access to the owned codebook.
    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// Returns the index of the centroid nearest to `vector` under Euclidean
    /// distance.
    ///
    /// Ties break toward the lowest index: centroids are scanned in order and
    /// a candidate only wins with a strictly smaller distance. Fails when the
    /// query dimension disagrees with the codebook's.
    pub fn assign(&self, vector: &[f32]) -> Result<usize, CodebookError> {
        if vector.len() != self.codebook.dim {
            return Err(CodebookError::DimensionMismatch {
                index: 0,
                expected: self.codebook.dim,
                found: vector.len(),
            });
        }

        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (index, centroid) in self.codebook.centroids.iter().enumerate() {
            let distance = squared_distance(vector, centroid);
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        Ok(best)
    }

    /// Assigns a batch of vectors, index-aligned with the input.
    ///
    /// Equivalent to calling [`assign`](Self::assign) on each element;
    /// assignments are independent of one another.
    pub fn assign_batch(&self, vectors: &[Vec<f32>]) -> Result<Vec<usize>, CodebookError> {
        vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| {
                self.assign(vector).map_err(|err| match err {
                    CodebookError::DimensionMismatch {
                        expected, found, ..
                    } => CodebookError::DimensionMismatch {
                        index,
                        expected,
                        found,
                    },
                    other => other,
                })
            })
            .collect()
    }
}

/// Squared Euclidean distance; the square root is monotone, so comparisons
/// can skip it.
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
