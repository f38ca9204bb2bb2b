//! Wasserstein Weisfeiler-Leman similarity for AMR graphs.
//!
//! Scores semantic similarity between pairs of Abstract Meaning
//! Representation graphs by combining iterative neighborhood-aware
//! embedding refinement (Weisfeiler-Leman style propagation) with an exact
//! optimal-transport distance between the resulting node-embedding clouds.
//!
//! # Pipeline
//!
//! 1. [`graph::penman`] parses textual graphs into the arena-indexed
//!    [`graph::Graph`] model (optionally rewritten by
//!    [`graph::transform`]).
//! 2. [`embeddings`] assigns level-0 vectors from a pretrained table (with
//!    an out-of-vocabulary policy) and resolves relation parameters.
//! 3. [`propagation`] runs K rounds of directional message passing,
//!    retaining one snapshot per level.
//! 4. [`transport`] solves exact discrete optimal transport per level and
//!    aggregates the level distances into one similarity score.
//! 5. [`alignment`] derives a node-to-node correspondence from the final
//!    transport plan.
//! 6. [`predictor`] orchestrates batches of pairs, rayon-parallel, in three
//!    output modes.
//!
//! # Determinism
//!
//! All randomness flows through caller-seeded `ChaCha8Rng` instances; with
//! `stability_level = 0` and no OOV tokens, repeated runs are bit-identical.

pub mod alignment;
pub mod embeddings;
pub mod error;
pub mod graph;
pub mod predictor;
pub mod propagation;
pub mod transport;

pub use embeddings::{EmbeddingTable, InitScheme, RelationParams, RelationResolver};
pub use error::{MetricError, Result};
pub use graph::Graph;
pub use predictor::{
    zip_banks, OutputMode, PairInput, PairOutcome, Predictor, PredictorConfig, ScoredAlignment,
};
pub use propagation::Direction;
