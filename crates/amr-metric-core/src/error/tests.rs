use std::path::PathBuf;

use super::*;

#[test]
fn dimension_mismatch_names_context_and_dimensions() {
    let err = MetricError::from(ConfigError::DimensionMismatch {
        context: "relation label `ARG0`".to_string(),
        expected: 100,
        actual: 50,
    });
    let msg = err.to_string();
    assert!(msg.contains("ARG0"));
    assert!(msg.contains("100"));
    assert!(msg.contains("50"));
    assert!(!err.is_pair_local());
}

#[test]
fn parse_error_is_pair_local() {
    let err = MetricError::from(InputError::Parse {
        origin: "bank_a.txt".to_string(),
        index: 3,
        reason: "unbalanced parentheses".to_string(),
    });
    assert!(err.is_pair_local());
    assert!(err.to_string().contains("bank_a.txt"));
    assert!(err.to_string().contains('3'));
}

#[test]
fn empty_file_names_the_path() {
    let err = MetricError::from(InputError::EmptyFile {
        path: PathBuf::from("/tmp/empty.amr"),
    });
    assert!(err.to_string().contains("/tmp/empty.amr"));
}

#[test]
fn numerical_errors_are_pair_local() {
    let err = MetricError::from(NumericalError::EmptyGraph { left: 0, right: 4 });
    assert!(err.is_pair_local());
}

#[test]
fn missing_embedding_is_fatal_for_the_run() {
    let err = MetricError::from(MissingEmbeddingError {
        label: "ARG7".to_string(),
    });
    assert!(!err.is_pair_local());
    assert!(err.to_string().contains("ARG7"));
}
