//! Top-level unified error type for the amr-metric engine.

use thiserror::Error;

use super::sub_errors::{ConfigError, InputError, MissingEmbeddingError, NumericalError};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MetricError>;

/// Top-level unified error type.
///
/// All sub-errors convert into this type via `From`, so engine code can
/// propagate any failure with `?`. Callers that run batches use
/// [`MetricError::is_pair_local`] to decide whether a failure poisons one
/// pair or the whole run.
#[derive(Debug, Clone, Error)]
pub enum MetricError {
    /// Configuration error: fatal, aborts before scoring.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input error: the offending pair is skipped.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Unresolvable relation embedding: fatal for the run.
    #[error("missing embedding: {0}")]
    MissingEmbedding(#[from] MissingEmbeddingError),

    /// Transport solver failure: the offending pair yields no score.
    #[error("numerical error: {0}")]
    Numerical(#[from] NumericalError),
}

impl MetricError {
    /// Whether this failure is confined to a single graph pair.
    ///
    /// Pair-local failures must not abort the remainder of a batch; all
    /// other kinds abort before (or instead of) scoring.
    pub fn is_pair_local(&self) -> bool {
        matches!(self, MetricError::Input(_) | MetricError::Numerical(_))
    }
}
