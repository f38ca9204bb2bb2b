//! Relation parameters: per-label scalars or vectors, with generative
//! initialization for labels a custom table does not cover.
//!
//! The representation is a closed set of variants selected once per run:
//! a custom relation table makes relations `vector`, otherwise they are
//! `scalar` edge-strength multipliers. Gaps are filled by the configured
//! [`InitScheme`]; with no scheme configured a gap is a fatal
//! [`MissingEmbeddingError`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MissingEmbeddingError, Result};

/// Generative initialization scheme for relation labels absent from the
/// supplied table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitScheme {
    /// Low-magnitude value (0.1 per component): the choice that minimizes
    /// the contribution entropy of an unknown relation during propagation.
    #[default]
    MinEntropy,
    /// U(0,1) per component, drawn from the caller-supplied RNG.
    RandomUniform,
    /// 1.0 per component.
    Ones,
    /// 0.5 per component.
    Constant,
}

impl InitScheme {
    /// The closed set of accepted names, for error messages.
    pub const ALLOWED: &'static str = "min_entropy, random_uniform, ones, constant";

    fn fill<R: Rng>(self, rng: &mut R) -> f32 {
        match self {
            InitScheme::MinEntropy => 0.1,
            InitScheme::RandomUniform => rng.gen_range(0.0..1.0),
            InitScheme::Ones => 1.0,
            InitScheme::Constant => 0.5,
        }
    }
}

impl FromStr for InitScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, ConfigError> {
        match s {
            "min_entropy" => Ok(InitScheme::MinEntropy),
            "random_uniform" => Ok(InitScheme::RandomUniform),
            "ones" => Ok(InitScheme::Ones),
            "constant" => Ok(InitScheme::Constant),
            other => Err(ConfigError::UnsupportedValue {
                field: "random_init_relation",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for InitScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InitScheme::MinEntropy => "min_entropy",
            InitScheme::RandomUniform => "random_uniform",
            InitScheme::Ones => "ones",
            InitScheme::Constant => "constant",
        };
        f.write_str(s)
    }
}

/// One relation's resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationValue {
    /// Edge-strength multiplier.
    Scalar(f32),
    /// Full embedding, combined with node embeddings during propagation.
    Vector(Vec<f32>),
}

/// A possibly partial relation parameter set.
#[derive(Debug, Clone)]
pub enum RelationParams {
    /// Scalar weights per label (the default when no custom table exists).
    Scalar(HashMap<String, f32>),
    /// Full vectors per label, all of dimension `dim`.
    Vector {
        vectors: HashMap<String, Vec<f32>>,
        dim: usize,
    },
}

impl RelationParams {
    /// Empty scalar set: every label falls through to the scheme.
    pub fn empty_scalar() -> Self {
        RelationParams::Scalar(HashMap::new())
    }

    /// Build the vector variant from serialized tables: a JSON array of
    /// rows and a JSON `{label: row_index}` map (the `edge_params` /
    /// `edge_param_keys` pair).
    pub fn vector_from_json(
        params_json: &str,
        keys_json: &str,
        origin: &str,
    ) -> std::result::Result<Self, ConfigError> {
        let rows: Vec<Vec<f32>> =
            serde_json::from_str(params_json).map_err(|e| ConfigError::Load {
                path: origin.into(),
                reason: format!("edge params: {e}"),
            })?;
        let keys: HashMap<String, usize> =
            serde_json::from_str(keys_json).map_err(|e| ConfigError::Load {
                path: origin.into(),
                reason: format!("edge param keys: {e}"),
            })?;

        let dim = match rows.first() {
            Some(r) => r.len(),
            None => {
                return Err(ConfigError::Load {
                    path: origin.into(),
                    reason: "edge params table contains no rows".to_string(),
                })
            }
        };
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(ConfigError::DimensionMismatch {
                    context: format!("{origin} edge params row {i}"),
                    expected: dim,
                    actual: row.len(),
                });
            }
        }

        let mut vectors = HashMap::with_capacity(keys.len());
        for (label, row) in keys {
            let v = rows
                .get(row)
                .ok_or_else(|| ConfigError::RelationIndexOutOfRange {
                    label: label.clone(),
                    row,
                    rows: rows.len(),
                })?;
            vectors.insert(label, v.clone());
        }
        Ok(RelationParams::Vector { vectors, dim })
    }

    /// Vector dimension, if this is the vector variant.
    pub fn dim(&self) -> Option<usize> {
        match self {
            RelationParams::Scalar(_) => None,
            RelationParams::Vector { dim, .. } => Some(*dim),
        }
    }
}

/// Fully resolved relation parameters: every label the batch uses has a
/// value, so propagation lookups are infallible.
#[derive(Debug, Clone)]
pub struct ResolvedRelations {
    values: HashMap<String, RelationValue>,
}

impl ResolvedRelations {
    /// Value for a label. The resolver materialized every label collected
    /// from the batch, so an absent label is a caller bug.
    pub fn get(&self, label: &str) -> &RelationValue {
        &self.values[label]
    }

    /// Number of resolved labels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no labels were resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves relation labels to parameters, filling table gaps with the
/// configured scheme.
#[derive(Debug, Clone)]
pub struct RelationResolver {
    params: RelationParams,
    scheme: Option<InitScheme>,
}

impl RelationResolver {
    /// Resolver over a (possibly partial) parameter set with a gap-filling
    /// scheme.
    pub fn new(params: RelationParams, scheme: InitScheme) -> Self {
        Self {
            params,
            scheme: Some(scheme),
        }
    }

    /// Resolver with no fallback: any uncovered label is fatal.
    pub fn strict(params: RelationParams) -> Self {
        Self {
            params,
            scheme: None,
        }
    }

    /// Whether relations are vectors (custom table supplied) or scalars.
    pub fn is_vector(&self) -> bool {
        matches!(self.params, RelationParams::Vector { .. })
    }

    /// Vector dimension, if relations are vectors.
    pub fn dim(&self) -> Option<usize> {
        self.params.dim()
    }

    /// Resolve every label in `labels` to a concrete value.
    ///
    /// Labels iterate in sorted order so the RNG stream (and therefore any
    /// `random_uniform` fill) is identical for identical label sets,
    /// regardless of graph enumeration order.
    pub fn materialize<R: Rng>(
        &self,
        labels: &BTreeSet<String>,
        rng: &mut R,
    ) -> Result<ResolvedRelations> {
        let mut values = HashMap::with_capacity(labels.len());
        for label in labels {
            let value = match &self.params {
                RelationParams::Scalar(weights) => match weights.get(label) {
                    Some(&w) => RelationValue::Scalar(w),
                    None => RelationValue::Scalar(self.fill_scalar(label, rng)?),
                },
                RelationParams::Vector { vectors, dim } => match vectors.get(label) {
                    Some(v) => RelationValue::Vector(v.clone()),
                    None => {
                        let fill = self.fill_vector(label, *dim, rng)?;
                        RelationValue::Vector(fill)
                    }
                },
            };
            values.insert(label.clone(), value);
        }
        Ok(ResolvedRelations { values })
    }

    fn fill_scalar<R: Rng>(&self, label: &str, rng: &mut R) -> Result<f32> {
        let scheme = self.require_scheme(label)?;
        Ok(scheme.fill(rng))
    }

    fn fill_vector<R: Rng>(&self, label: &str, dim: usize, rng: &mut R) -> Result<Vec<f32>> {
        let scheme = self.require_scheme(label)?;
        Ok((0..dim).map(|_| scheme.fill(rng)).collect())
    }

    fn require_scheme(&self, label: &str) -> Result<InitScheme> {
        self.scheme.ok_or_else(|| {
            MissingEmbeddingError {
                label: label.to_string(),
            }
            .into()
        })
    }
}
