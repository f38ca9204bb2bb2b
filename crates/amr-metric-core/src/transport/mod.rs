//! Optimal-transport distance between node-embedding clouds.
//!
//! For each propagation level, an Euclidean cost matrix over the two graphs'
//! node embeddings feeds the exact transportation-simplex solver in
//! [`simplex`]. Level distances are averaged into one pair distance; the
//! bounded similarity transform is `s = exp(-d)`, which is 1 exactly for
//! identical clouds and strictly decreasing in divergence.

pub mod simplex;

pub use simplex::{solve, TransportPlan};

use crate::error::{NumericalError, Result};
use crate::propagation::Snapshot;

/// Row-major rectangular cost matrix, f64 for solver stability.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Wrap raw row-major data, rejecting NaN and infinity up front so the
    /// solver never sees them.
    pub fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        debug_assert_eq!(data.len(), rows * cols);
        for (k, &c) in data.iter().enumerate() {
            if !c.is_finite() {
                return Err(NumericalError::NonFiniteCost {
                    row: k / cols.max(1),
                    col: k % cols.max(1),
                }
                .into());
            }
        }
        Ok(Self { rows, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub(crate) fn data(&self) -> &[f64] {
        &self.data
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Pairwise Euclidean cost matrix between two embedding matrices.
pub fn cost_matrix(a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<CostMatrix> {
    if a.is_empty() || b.is_empty() {
        return Err(NumericalError::EmptyGraph {
            left: a.len(),
            right: b.len(),
        }
        .into());
    }
    let mut data = Vec::with_capacity(a.len() * b.len());
    for row in a {
        for col in b {
            data.push(euclidean(row, col));
        }
    }
    CostMatrix::from_raw(a.len(), b.len(), data)
}

/// Wasserstein distance between two embedding clouds under uniform
/// marginals.
pub fn wasserstein(a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<f64> {
    let (d, _) = solve(&cost_matrix(a, b)?)?;
    Ok(d)
}

/// Multi-level pair distance: the mean of per-level Wasserstein distances,
/// plus the final level's transport plan for alignment extraction.
pub fn pair_distance(
    levels_a: &[Snapshot],
    levels_b: &[Snapshot],
) -> Result<(f64, TransportPlan)> {
    debug_assert_eq!(levels_a.len(), levels_b.len());
    let mut total = 0.0;
    let mut final_plan = None;
    for (a, b) in levels_a.iter().zip(levels_b) {
        let (d, plan) = solve(&cost_matrix(a, b)?)?;
        total += d;
        final_plan = Some(plan);
    }
    let plan = final_plan.ok_or(NumericalError::EmptyGraph { left: 0, right: 0 })?;
    Ok((total / levels_a.len() as f64, plan))
}

/// Monotonically decreasing distance-to-similarity transform, bounded to
/// (0, 1] with s = 1 iff d = 0.
#[inline]
pub fn similarity(distance: f64) -> f64 {
    (-distance).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_clouds_have_zero_distance() {
        let cloud = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];
        let d = wasserstein(&cloud, &cloud).unwrap();
        assert!(d.abs() < 1e-12);
        assert!((similarity(d) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn distance_grows_with_divergence() {
        let a = vec![vec![0.0, 0.0]];
        let near = vec![vec![0.1, 0.0]];
        let far = vec![vec![5.0, 0.0]];
        let d_near = wasserstein(&a, &near).unwrap();
        let d_far = wasserstein(&a, &far).unwrap();
        assert!(d_near < d_far);
        assert!(similarity(d_near) > similarity(d_far));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let b = vec![vec![0.3, 0.4], vec![0.9, 0.1], vec![0.2, 0.2]];
        let d_ab = wasserstein(&a, &b).unwrap();
        let d_ba = wasserstein(&b, &a).unwrap();
        assert!((d_ab - d_ba).abs() < 1e-9);
    }

    #[test]
    fn pair_distance_averages_levels() {
        let a0 = vec![vec![0.0f32]];
        let b0 = vec![vec![1.0f32]];
        let a1 = vec![vec![0.0f32]];
        let b1 = vec![vec![3.0f32]];
        let (d, plan) = pair_distance(&[a0, a1], &[b0, b1]).unwrap();
        assert!((d - 2.0).abs() < 1e-12);
        assert_eq!(plan.rows(), 1);
        assert_eq!(plan.cols(), 1);
    }

    #[test]
    fn non_finite_costs_are_rejected() {
        let a = vec![vec![f32::NAN]];
        let b = vec![vec![0.0f32]];
        assert!(wasserstein(&a, &b).is_err());
    }

    #[test]
    fn empty_cloud_is_an_error() {
        let a: Vec<Vec<f32>> = vec![];
        let b = vec![vec![0.0f32]];
        assert!(wasserstein(&a, &b).is_err());
    }

    #[test]
    fn similarity_is_bounded_and_maximal_at_zero() {
        assert_eq!(similarity(0.0), 1.0);
        assert!(similarity(10.0) > 0.0);
        assert!(similarity(10.0) < similarity(1.0));
    }
}
