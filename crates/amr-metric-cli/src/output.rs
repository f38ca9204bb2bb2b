//! Score rounding and line-oriented output.
//!
//! `score` mode prints one value per input pair; a failed pair prints `NaN`
//! so line positions stay aligned with the input, and the failure is
//! logged. `score_alignment` prints one JSON object per line.

use amr_metric_core::{PairOutcome, ScoredAlignment};
use serde_json::json;
use tracing::error;

/// Round to `decimals` places; any negative value disables rounding.
/// Capped at f64 precision: beyond that, rounding is a no-op anyway and an
/// unclamped exponent would overflow the scale factor to infinity.
pub fn round_score(score: f64, decimals: i32) -> f64 {
    if decimals < 0 {
        return score;
    }
    let factor = 10f64.powi(decimals.min(15));
    (score * factor).round() / factor
}

/// Render per-pair scores, one line each.
pub fn render_scores(outcomes: &[PairOutcome<f64>], decimals: i32) -> String {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| match outcome {
            Ok(s) => round_score(*s, decimals).to_string(),
            Err(e) => {
                error!(pair = i, error = %e, "pair yielded no score");
                "NaN".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render score-plus-alignment outcomes as JSON lines.
pub fn render_alignments(
    outcomes: &[PairOutcome<ScoredAlignment>],
    decimals: i32,
) -> String {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| match outcome {
            Ok(sa) => json!({
                "score": round_score(sa.score, decimals),
                "alignment": sa.alignment,
            })
            .to_string(),
            Err(e) => {
                error!(pair = i, error = %e, "pair yielded no score");
                json!({ "score": null, "alignment": null }).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use amr_metric_core::error::NumericalError;
    use amr_metric_core::MetricError;

    use super::*;

    #[test]
    fn rounding_honors_decimals() {
        assert_eq!(round_score(0.428_437_5, 4), 0.4284);
        assert_eq!(round_score(0.428_437_5, 1), 0.4);
        assert_eq!(round_score(0.428_437_5, 0), 0.0);
    }

    #[test]
    fn negative_decimals_disable_rounding() {
        let x = 0.123_456_789_012;
        assert_eq!(round_score(x, -100), x);
    }

    #[test]
    fn oversized_decimals_leave_scores_finite() {
        let x = 0.428_437_5;
        let rounded = round_score(x, 400);
        assert!(rounded.is_finite());
        assert_eq!(rounded, x);
    }

    #[test]
    fn failed_pairs_print_nan_in_place() {
        let outcomes: Vec<PairOutcome<f64>> = vec![
            Ok(0.5),
            Err(MetricError::from(NumericalError::EmptyGraph {
                left: 0,
                right: 1,
            })),
            Ok(0.25),
        ];
        assert_eq!(render_scores(&outcomes, 3), "0.5\nNaN\n0.25");
    }

    #[test]
    fn alignment_lines_are_json_objects() {
        let outcomes = vec![Ok(ScoredAlignment {
            score: 0.75,
            alignment: [("v1".to_string(), "w1".to_string())].into_iter().collect(),
        })];
        let line = render_alignments(&outcomes, 2);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["score"], 0.75);
        assert_eq!(parsed["alignment"]["v1"], "w1");
    }
}
