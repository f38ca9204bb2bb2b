//! Pretrained concept-embedding lookup table.
//!
//! Loaded once per run, then shared read-only across every graph in the
//! batch. Out-of-vocabulary tokens resolve to a deterministic unit-norm
//! Gaussian vector seeded by the token itself, so the same token always maps
//! to the same fallback within and across runs. Sampling mode
//! (`stability_level > 0`) instead redraws OOV vectors from the
//! caller-supplied RNG per repetition.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::ConfigError;

/// FNV-1a, fixed here so OOV fallbacks are stable across platforms and
/// Rust versions (std's `DefaultHasher` guarantees neither).
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Draw a unit-norm Gaussian vector.
pub(crate) fn random_unit_vector<R: Rng>(rng: &mut R, dim: usize) -> Vec<f32> {
    let normal = StandardNormal;
    let mut v: Vec<f32> = (0..dim).map(|_| normal.sample(rng)).collect();
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    } else {
        // All-zero draw is vanishingly rare; fall back to a basis vector.
        v[0] = 1.0;
    }
    v
}

/// Read-only concept-token → vector mapping with a fixed dimension.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
    seed: u64,
}

impl EmbeddingTable {
    /// Build from an in-memory token → vector map.
    ///
    /// All vectors must share one dimension; a mismatch is a configuration
    /// error, never a fallback.
    pub fn from_rows(rows: HashMap<String, Vec<f32>>) -> Result<Self, ConfigError> {
        let dim = match rows.values().next() {
            Some(v) => v.len(),
            None => {
                return Err(ConfigError::Load {
                    path: "<rows>".into(),
                    reason: "embedding table contains no vectors".to_string(),
                })
            }
        };
        for (token, v) in &rows {
            if v.len() != dim {
                return Err(ConfigError::DimensionMismatch {
                    context: format!("embedding for token `{token}`"),
                    expected: dim,
                    actual: v.len(),
                });
            }
        }
        Ok(Self {
            dim,
            vectors: rows,
            seed: 17,
        })
    }

    /// Parse the word2vec/GloVe text format: one `token v1 .. vd` per line,
    /// with an optional `count dim` header line.
    pub fn from_word2vec_text(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let mut rows = HashMap::new();
        let mut dim: Option<usize> = None;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let token = parts.next().unwrap_or_default();
            let values: Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
            let values = values.map_err(|e| ConfigError::Load {
                path: origin.into(),
                reason: format!("line {}: {e}", lineno + 1),
            })?;

            // A two-integer first line is the word2vec header.
            if lineno == 0 && values.len() == 1 && token.parse::<usize>().is_ok() {
                continue;
            }

            match dim {
                None => dim = Some(values.len()),
                Some(d) if d != values.len() => {
                    return Err(ConfigError::DimensionMismatch {
                        context: format!("{origin} line {} (token `{token}`)", lineno + 1),
                        expected: d,
                        actual: values.len(),
                    })
                }
                _ => {}
            }
            rows.insert(token.to_string(), values);
        }

        let dim = dim.ok_or_else(|| ConfigError::Load {
            path: origin.into(),
            reason: "embedding table contains no vectors".to_string(),
        })?;
        Ok(Self {
            dim,
            vectors: rows,
            seed: 17,
        })
    }

    /// Override the seed that fixes deterministic OOV fallbacks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Embedding dimension shared by every vector in the table.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Whether a token (after normalization) is in vocabulary.
    pub fn contains(&self, concept: &str) -> bool {
        self.lookup(concept).is_some()
    }

    /// Look up a concept with AMR-aware normalization: exact match first,
    /// then lowercased, then with the `-NN` predicate sense suffix stripped
    /// (`bake-01` → `bake`).
    pub fn lookup(&self, concept: &str) -> Option<&[f32]> {
        if let Some(v) = self.vectors.get(concept) {
            return Some(v);
        }
        let lower = concept.to_lowercase();
        if let Some(v) = self.vectors.get(&lower) {
            return Some(v);
        }
        if let Some(stripped) = strip_sense_suffix(&lower) {
            if let Some(v) = self.vectors.get(stripped) {
                return Some(v);
            }
        }
        None
    }

    /// Deterministic fallback vector for an out-of-vocabulary token.
    pub fn fallback_vector(&self, token: &str) -> Vec<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(fnv1a(token.as_bytes()) ^ self.seed);
        random_unit_vector(&mut rng, self.dim)
    }
}

/// Strip an AMR predicate sense suffix (`-01`, `-91`, ...), if present.
fn strip_sense_suffix(token: &str) -> Option<&str> {
    let (head, tail) = token.rsplit_once('-')?;
    if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
        Some(head)
    } else {
        None
    }
}
