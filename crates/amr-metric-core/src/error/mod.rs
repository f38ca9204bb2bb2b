//! Error types for amr-metric-core.
//!
//! This module defines the central error types used throughout the engine:
//!
//! - [`MetricError`]: top-level unified error for all crate errors
//! - Sub-error types: [`ConfigError`], [`InputError`],
//!   [`MissingEmbeddingError`], [`NumericalError`]
//!
//! Error discipline:
//! - library code returns `Result`, never panics
//! - errors are propagated with the `?` operator
//! - every fatal message names the offending input or configuration field
//!
//! Configuration errors are fatal for the whole run and surface before any
//! pair is scored. Input and numerical errors are pair-local: the offending
//! pair yields no score while the rest of the batch proceeds.

mod sub_errors;
mod unified;

#[cfg(test)]
mod tests;

pub use sub_errors::{ConfigError, InputError, MissingEmbeddingError, NumericalError};
pub use unified::{MetricError, Result};
