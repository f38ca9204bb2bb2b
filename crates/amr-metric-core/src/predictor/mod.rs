//! Batch prediction: orchestrates initialization, propagation, transport,
//! and alignment across many graph pairs.
//!
//! Lifecycle: [`Predictor::new`] validates configuration and tables up
//! front (a dimension mismatch or an unresolvable relation label aborts
//! before any pair is scored); the scoring methods then run one whole batch
//! each, so no mode change can happen mid-batch. Pair-local failures
//! (unparseable graph, degenerate transport) yield an error outcome for
//! that pair while the rest of the batch proceeds.
//!
//! Pairs are mutually independent — shared tables are read-only — and are
//! scored in parallel with rayon, collected back in input order. Each
//! pair's RNG is derived from the base seed and the pair index, so worker
//! scheduling cannot perturb results.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alignment::extract_alignment;
use crate::embeddings::{EmbeddingTable, Initializer, RelationResolver, ResolvedRelations};
use crate::error::{ConfigError, InputError, MetricError, Result};
use crate::graph::Graph;
use crate::propagation::{Direction, Propagator, DEFAULT_ITERATIONS};
use crate::transport::{pair_distance, similarity, TransportPlan};

/// Per-pair outcome: a value or the error that poisoned this pair alone.
pub type PairOutcome<T> = std::result::Result<T, MetricError>;

/// One pair of graphs ready for scoring, or the input error that kept it
/// from parsing.
pub type PairInput = std::result::Result<(Graph, Graph), MetricError>;

/// Evaluation mode exposed by the prediction surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Per-pair similarity, ordered as input.
    #[default]
    Score,
    /// Arithmetic mean of all per-pair scores.
    ScoreCorpus,
    /// Per-pair similarity plus node alignment.
    ScoreAlignment,
}

impl OutputMode {
    /// The closed set of accepted names, for error messages.
    pub const ALLOWED: &'static str = "score, score_corpus, score_alignment";
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, ConfigError> {
        match s {
            "score" => Ok(OutputMode::Score),
            "score_corpus" => Ok(OutputMode::ScoreCorpus),
            "score_alignment" => Ok(OutputMode::ScoreAlignment),
            other => Err(ConfigError::UnsupportedValue {
                field: "output_type",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputMode::Score => "score",
            OutputMode::ScoreCorpus => "score_corpus",
            OutputMode::ScoreAlignment => "score_alignment",
        };
        f.write_str(s)
    }
}

/// Engine configuration shared by every pair of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Number of WL propagation iterations (K).
    pub iterations: usize,
    /// Message-passing direction.
    pub direction: Direction,
    /// OOV sampling repetitions; 0 disables sampling (single deterministic
    /// draw).
    pub stability_level: usize,
    /// Base RNG seed threaded through relation initialization and OOV
    /// sampling.
    pub seed: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            direction: Direction::Both,
            stability_level: 0,
            seed: 0,
        }
    }
}

/// Score plus alignment, for `score_alignment` mode.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAlignment {
    pub score: f64,
    pub alignment: BTreeMap<String, String>,
}

/// Batch predictor over one shared initializer configuration.
#[derive(Debug)]
pub struct Predictor<'a> {
    table: &'a EmbeddingTable,
    resolver: RelationResolver,
    config: PredictorConfig,
}

impl<'a> Predictor<'a> {
    /// Validate configuration and build the predictor.
    ///
    /// A custom relation table whose vectors disagree with the node table's
    /// dimension is rejected here, before any pair is scored.
    pub fn new(
        table: &'a EmbeddingTable,
        resolver: RelationResolver,
        config: PredictorConfig,
    ) -> Result<Self> {
        if let Some(dim) = resolver.dim() {
            if dim != table.dim() {
                return Err(ConfigError::DimensionMismatch {
                    context: "relation vectors vs node embedding table".to_string(),
                    expected: table.dim(),
                    actual: dim,
                }
                .into());
            }
        }
        Ok(Self {
            table,
            resolver,
            config,
        })
    }

    /// Per-pair similarity scores, ordered as input.
    pub fn score(&self, pairs: &[PairInput]) -> Result<Vec<PairOutcome<f64>>> {
        let relations = self.materialize_relations(pairs)?;
        Ok(self.run_batch(pairs, &relations, |score, _, _, _| score))
    }

    /// Arithmetic mean of per-pair scores. Pair-local failures are logged
    /// and excluded from the mean; if no pair scored, the first error is
    /// returned.
    pub fn score_corpus(&self, pairs: &[PairInput]) -> Result<f64> {
        if pairs.is_empty() {
            return Err(InputError::EmptyFile {
                path: "<batch>".into(),
            }
            .into());
        }
        let outcomes = self.score(pairs)?;
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut first_err = None;
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(s) => {
                    sum += s;
                    count += 1;
                }
                Err(e) => {
                    warn!(pair = i, error = %e, "pair excluded from corpus score");
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        if count == 0 {
            // Batch is non-empty, so at least one outcome carried an error.
            if let Some(e) = first_err {
                return Err(e);
            }
        }
        Ok(sum / count as f64)
    }

    /// Per-pair similarity plus node alignment from the final-level
    /// transport plan.
    pub fn score_alignment(
        &self,
        pairs: &[PairInput],
    ) -> Result<Vec<PairOutcome<ScoredAlignment>>> {
        let relations = self.materialize_relations(pairs)?;
        Ok(
            self.run_batch(pairs, &relations, |score, plan, g1, g2| ScoredAlignment {
                score,
                alignment: extract_alignment(plan, g1, g2),
            }),
        )
    }

    /// Resolve every relation label the batch uses, up front, so a missing
    /// embedding without a fallback scheme aborts before scoring.
    fn materialize_relations(&self, pairs: &[PairInput]) -> Result<ResolvedRelations> {
        let mut labels = BTreeSet::new();
        for pair in pairs.iter().flatten() {
            for g in [&pair.0, &pair.1] {
                for edge in g.edges() {
                    labels.insert(edge.label.clone());
                }
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.resolver.materialize(&labels, &mut rng)
    }

    fn run_batch<T, F>(
        &self,
        pairs: &[PairInput],
        relations: &ResolvedRelations,
        finish: F,
    ) -> Vec<PairOutcome<T>>
    where
        T: Send,
        F: Fn(f64, &TransportPlan, &Graph, &Graph) -> T + Sync,
    {
        pairs
            .par_iter()
            .enumerate()
            .map(|(index, input)| match input {
                Ok((g1, g2)) => self
                    .score_pair(index, g1, g2, relations)
                    .map(|(score, plan)| finish(score, &plan, g1, g2)),
                Err(e) => Err(e.clone()),
            })
            .collect()
    }

    /// Score one pair: initialize, propagate, transport, transform.
    fn score_pair(
        &self,
        index: usize,
        g1: &Graph,
        g2: &Graph,
        relations: &ResolvedRelations,
    ) -> Result<(f64, TransportPlan)> {
        let initializer = Initializer::new(self.table);
        let init1 = initializer.initialize(g1);
        let init2 = initializer.initialize(g2);
        let propagator = Propagator::new(self.config.iterations, self.config.direction);

        let samples = if self.config.stability_level > 0 && (init1.has_oov() || init2.has_oov())
        {
            self.config.stability_level
        } else {
            1
        };

        let mut rng = self.pair_rng(index);
        let mut total = 0.0;
        let mut plan = None;
        for sample in 0..samples {
            let (base1, base2) = if sample == 0 && samples == 1 {
                (init1.base.clone(), init2.base.clone())
            } else {
                (
                    initializer.resample_oov(&init1, &mut rng),
                    initializer.resample_oov(&init2, &mut rng),
                )
            };
            let levels1 = propagator.propagate(g1, base1, relations);
            let levels2 = propagator.propagate(g2, base2, relations);
            let (d, p) = pair_distance(&levels1, &levels2)?;
            total += d;
            plan = Some(p);
        }
        let distance = total / samples as f64;
        let plan = plan.ok_or_else(|| MetricError::from(crate::error::NumericalError::EmptyGraph {
            left: g1.node_count(),
            right: g2.node_count(),
        }))?;

        debug!(pair = index, distance, "scored pair");
        Ok((similarity(distance), plan))
    }

    /// Derive a pair-local RNG so parallel scheduling cannot reorder draws.
    fn pair_rng(&self, index: usize) -> ChaCha8Rng {
        let golden = 0x9e37_79b9_7f4a_7c15u64;
        ChaCha8Rng::seed_from_u64(self.config.seed ^ golden.wrapping_mul(index as u64 + 1))
    }
}

/// Zip two parsed banks into scoring inputs.
///
/// Banks must pair one-to-one; a length mismatch makes pairing undefined
/// and is fatal. A parse failure in either bank poisons only its pair.
pub fn zip_banks(
    bank1: Vec<std::result::Result<Graph, InputError>>,
    bank2: Vec<std::result::Result<Graph, InputError>>,
) -> Result<Vec<PairInput>> {
    if bank1.len() != bank2.len() {
        return Err(InputError::BankLengthMismatch {
            left: bank1.len(),
            right: bank2.len(),
        }
        .into());
    }
    Ok(bank1
        .into_iter()
        .zip(bank2)
        .map(|(a, b)| match (a, b) {
            (Ok(g1), Ok(g2)) => Ok((g1, g2)),
            (Err(e), _) | (_, Err(e)) => Err(e.into()),
        })
        .collect())
}
