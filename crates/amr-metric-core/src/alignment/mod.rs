//! Node alignment extraction from a transport plan.
//!
//! For every G1 node the aligned G2 counterpart is the column receiving the
//! largest transported mass, ties broken by the lowest column index. Output
//! is keyed by original variable names; nodes synthesized by the
//! edge-to-node transform are skipped on both sides so alignments always
//! reference pre-transform identifiers.

use std::collections::BTreeMap;

use crate::graph::Graph;
use crate::transport::TransportPlan;

/// Argmax-mass correspondence at the index level.
///
/// `keep_row`/`keep_col` filter which arena indices participate (used to
/// hide synthetic nodes). Every kept row is assigned exactly one kept
/// column: alignment is a total function over kept G1 nodes.
pub fn align_indices(
    plan: &TransportPlan,
    keep_row: impl Fn(usize) -> bool,
    keep_col: impl Fn(usize) -> bool,
) -> Vec<(usize, usize)> {
    let cols: Vec<usize> = (0..plan.cols()).filter(|&j| keep_col(j)).collect();
    let mut pairs = Vec::new();
    for i in (0..plan.rows()).filter(|&i| keep_row(i)) {
        let mut best = None;
        let mut best_mass = f64::NEG_INFINITY;
        for &j in &cols {
            let mass = plan.mass(i, j);
            // Strict comparison keeps the lowest column index on ties.
            if mass > best_mass {
                best_mass = mass;
                best = Some(j);
            }
        }
        if let Some(j) = best {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Variable-keyed alignment between two graphs.
pub fn extract_alignment(
    plan: &TransportPlan,
    g1: &Graph,
    g2: &Graph,
) -> BTreeMap<String, String> {
    align_indices(
        plan,
        |i| !g1.nodes()[i].synthetic,
        |j| !g2.nodes()[j].synthetic,
    )
    .into_iter()
    .map(|(i, j)| (g1.nodes()[i].var.clone(), g2.nodes()[j].var.clone()))
    .collect()
}

#[cfg(test)]
mod tests {
    use crate::graph::penman::parse_graph;
    use crate::transport::{cost_matrix, solve};

    use super::*;

    #[test]
    fn alignment_is_total_over_g1_and_targets_lie_in_g2() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];
        let b = vec![vec![0.9, 0.1], vec![0.1, 0.9]];
        let (_, plan) = solve(&cost_matrix(&a, &b).unwrap()).unwrap();
        let pairs = align_indices(&plan, |_| true, |_| true);
        assert_eq!(pairs.len(), 3);
        for (i, j) in pairs {
            assert!(i < 3);
            assert!(j < 2);
        }
    }

    #[test]
    fn identical_clouds_align_identically() {
        let cloud = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let (_, plan) = solve(&cost_matrix(&cloud, &cloud).unwrap()).unwrap();
        let pairs = align_indices(&plan, |_| true, |_| true);
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn ties_break_to_the_lowest_column_index() {
        // Equidistant targets: the plan splits mass evenly.
        let a = vec![vec![0.0f32]];
        let b = vec![vec![1.0f32], vec![-1.0f32]];
        let (_, plan) = solve(&cost_matrix(&a, &b).unwrap()).unwrap();
        let pairs = align_indices(&plan, |_| true, |_| true);
        assert_eq!(pairs, vec![(0, 0)]);
    }

    #[test]
    fn variable_keys_come_from_the_graphs() {
        let g1 = parse_graph("(v1 / bake :ARG0 (v2 / man))").unwrap();
        let g2 = parse_graph("(w1 / bake :ARG0 (w2 / man))").unwrap();
        let cloud1 = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let cloud2 = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let (_, plan) = solve(&cost_matrix(&cloud1, &cloud2).unwrap()).unwrap();
        let map = extract_alignment(&plan, &g1, &g2);
        assert_eq!(map.get("v1").map(String::as_str), Some("w1"));
        assert_eq!(map.get("v2").map(String::as_str), Some("w2"));
    }
}
