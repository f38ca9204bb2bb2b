//! Sub-error types wrapped by [`MetricError`](super::MetricError).

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors. Fatal: the run aborts before any pair is scored.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Embedding dimensions disagree between tables, snapshots, or relation
    /// vectors that are used together.
    #[error("embedding dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What carried the offending dimension (table path, relation label).
        context: String,
        /// Dimension fixed by the first-loaded table.
        expected: usize,
        /// Dimension actually found.
        actual: usize,
    },

    /// A config file key is missing or carries an unusable value.
    #[error("malformed key `{key}` in config file {path}: {reason}")]
    MalformedKey {
        key: String,
        path: PathBuf,
        reason: String,
    },

    /// An enum-valued setting received a value outside its closed set.
    #[error("unsupported value `{value}` for `{field}` (expected one of: {allowed})")]
    UnsupportedValue {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },

    /// A table or config file could not be read or deserialized.
    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A relation key maps to a row index outside the parameter matrix.
    #[error("relation key `{label}` maps to row {row}, but the parameter table has {rows} rows")]
    RelationIndexOutOfRange {
        label: String,
        row: usize,
        rows: usize,
    },
}

/// Input errors. Pair-local: the offending pair is skipped, the batch
/// continues.
#[derive(Debug, Clone, Error)]
pub enum InputError {
    /// An input file contained no graphs at all.
    #[error("empty input file: {path}")]
    EmptyFile { path: PathBuf },

    /// One graph in a bank failed to parse.
    #[error("failed to parse graph {index} in {origin}: {reason}")]
    Parse {
        /// File path or other human-readable source description.
        origin: String,
        /// Zero-based position of the graph within its bank.
        index: usize,
        reason: String,
    },

    /// The two banks do not pair up one-to-one.
    #[error("graph banks differ in length: {left} graphs vs {right} graphs")]
    BankLengthMismatch { left: usize, right: usize },
}

/// A relation label has no entry in the supplied table and no fallback
/// initialization scheme is configured. Fatal for the run; with a scheme
/// configured the gap is filled silently and this error never surfaces.
#[derive(Debug, Clone, Error)]
#[error("no embedding for relation label `{label}` and no initialization scheme configured")]
pub struct MissingEmbeddingError {
    /// The unresolvable relation label.
    pub label: String,
}

/// Numerical failures inside the transport solver. Pair-local: the pair
/// yields no score rather than a corrupted one.
#[derive(Debug, Clone, Error)]
pub enum NumericalError {
    /// Optimal transport is undefined when either side has zero nodes.
    #[error("cannot transport between empty node sets (|V1|={left}, |V2|={right})")]
    EmptyGraph { left: usize, right: usize },

    /// A cost entry was NaN or infinite.
    #[error("non-finite transport cost at cell ({row}, {col})")]
    NonFiniteCost { row: usize, col: usize },

    /// The transportation simplex exceeded its pivot budget.
    #[error("transport solver failed to converge after {pivots} pivots")]
    NoConvergence { pivots: usize },
}
