//! Exact discrete optimal transport via the transportation simplex.
//!
//! Solves `min Σ C[i][j]·x[i][j]` subject to row sums 1/n, column sums 1/m,
//! `x ≥ 0`. Northwest-corner initial basis, MODI (u/v) potentials,
//! stepping-stone pivots. Degenerate bases keep zero-mass cells so the basis
//! graph stays a spanning tree. All arithmetic is f64; costs come in from
//! f32 embeddings, so exactness here means exact simplex optimality, not
//! closed-form arithmetic.

use crate::error::NumericalError;

use super::CostMatrix;

const REDUCED_COST_TOL: f64 = 1e-12;
const MAX_PIVOTS: usize = 10_000;

/// Non-negative coupling matrix with uniform per-graph marginals.
#[derive(Debug, Clone)]
pub struct TransportPlan {
    rows: usize,
    cols: usize,
    mass: Vec<f64>,
}

impl TransportPlan {
    /// Number of rows (|V(G1)|).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (|V(G2)|).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Transported mass from row node `i` to column node `j`.
    #[inline]
    pub fn mass(&self, i: usize, j: usize) -> f64 {
        self.mass[i * self.cols + j]
    }
}

/// Solve the uniform-marginal transport problem for `cost`.
///
/// Returns the minimum total transport cost and the realizing plan.
pub fn solve(cost: &CostMatrix) -> Result<(f64, TransportPlan), NumericalError> {
    let n = cost.rows();
    let m = cost.cols();
    if n == 0 || m == 0 {
        return Err(NumericalError::EmptyGraph { left: n, right: m });
    }

    let supply = 1.0 / n as f64;
    let demand = 1.0 / m as f64;

    // Northwest-corner initialization. Exactly n + m - 1 basic cells: every
    // step advances one row or one column, ties advance the row and leave a
    // zero-mass (degenerate) basic cell behind.
    let mut alloc = vec![0.0f64; n * m];
    let mut basic = vec![false; n * m];
    let mut s = vec![supply; n];
    let mut d = vec![demand; m];
    let (mut i, mut j) = (0usize, 0usize);
    loop {
        let moved = s[i].min(d[j]);
        alloc[i * m + j] = moved;
        basic[i * m + j] = true;
        s[i] -= moved;
        d[j] -= moved;
        if i == n - 1 && j == m - 1 {
            break;
        }
        // The balance of remaining supply and demand decides the direction;
        // at the border only one direction stays in bounds.
        if (s[i] <= d[j] && i < n - 1) || j == m - 1 {
            i += 1;
        } else {
            j += 1;
        }
    }

    for _ in 0..MAX_PIVOTS {
        let (u, v) = potentials(cost, &basic, n, m)?;

        // Entering cell: most negative reduced cost.
        let mut entering: Option<(usize, usize)> = None;
        let mut best = -REDUCED_COST_TOL;
        for r in 0..n {
            for c in 0..m {
                if basic[r * m + c] {
                    continue;
                }
                let rc = cost.get(r, c) - u[r] - v[c];
                if rc < best {
                    best = rc;
                    entering = Some((r, c));
                }
            }
        }
        let (ei, ej) = match entering {
            Some(cell) => cell,
            None => {
                // Optimal.
                let total: f64 = (0..n * m).map(|k| alloc[k] * cost.data()[k]).sum();
                return Ok((
                    total,
                    TransportPlan {
                        rows: n,
                        cols: m,
                        mass: alloc,
                    },
                ));
            }
        };

        // The basis is a spanning tree, so adding the entering cell closes a
        // unique alternating cycle; find the tree path row(ei) .. col(ej).
        let path = tree_path(&basic, n, m, ei, ej)?;

        // Signs along the cycle: entering cell is +, then path edges
        // alternate starting with -.
        let mut theta = f64::INFINITY;
        let mut leaving = None;
        for (k, &(r, c)) in path.iter().enumerate() {
            if k % 2 == 0 {
                let a = alloc[r * m + c];
                if a < theta {
                    theta = a;
                    leaving = Some((r, c));
                }
            }
        }
        let (li, lj) = leaving.ok_or(NumericalError::NoConvergence { pivots: MAX_PIVOTS })?;

        alloc[ei * m + ej] += theta;
        basic[ei * m + ej] = true;
        for (k, &(r, c)) in path.iter().enumerate() {
            if k % 2 == 0 {
                alloc[r * m + c] -= theta;
            } else {
                alloc[r * m + c] += theta;
            }
        }
        alloc[li * m + lj] = 0.0;
        basic[li * m + lj] = false;
    }

    Err(NumericalError::NoConvergence { pivots: MAX_PIVOTS })
}

/// MODI potentials: u[0] = 0, then `u[i] + v[j] = c[i][j]` propagated over
/// the basis spanning tree.
fn potentials(
    cost: &CostMatrix,
    basic: &[bool],
    n: usize,
    m: usize,
) -> Result<(Vec<f64>, Vec<f64>), NumericalError> {
    // Bipartite node ids: rows are 0..n, columns are n..n+m.
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n + m];
    for r in 0..n {
        for c in 0..m {
            if basic[r * m + c] {
                adj[r].push(n + c);
                adj[n + c].push(r);
            }
        }
    }

    let mut u = vec![f64::NAN; n];
    let mut v = vec![f64::NAN; m];
    u[0] = 0.0;
    let mut queue = vec![0usize];
    let mut seen = vec![false; n + m];
    seen[0] = true;
    while let Some(node) = queue.pop() {
        for &next in &adj[node] {
            if seen[next] {
                continue;
            }
            seen[next] = true;
            if next >= n {
                let (r, c) = (node, next - n);
                v[c] = cost.get(r, c) - u[r];
            } else {
                let (r, c) = (next, node - n);
                u[r] = cost.get(r, c) - v[c];
            }
            queue.push(next);
        }
    }

    if seen.iter().any(|&s| !s) {
        // A disconnected basis graph means the invariant broke; treat it as
        // a solver failure for this pair rather than a corrupted score.
        return Err(NumericalError::NoConvergence { pivots: 0 });
    }
    Ok((u, v))
}

/// Path of basis cells from row `ei` to column `ej` through the basis tree,
/// as (row, col) edges in traversal order.
fn tree_path(
    basic: &[bool],
    n: usize,
    m: usize,
    ei: usize,
    ej: usize,
) -> Result<Vec<(usize, usize)>, NumericalError> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n + m];
    for r in 0..n {
        for c in 0..m {
            if basic[r * m + c] {
                adj[r].push(n + c);
                adj[n + c].push(r);
            }
        }
    }

    let start = ei;
    let goal = n + ej;
    let mut parent = vec![usize::MAX; n + m];
    let mut seen = vec![false; n + m];
    seen[start] = true;
    let mut queue = std::collections::VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        if node == goal {
            break;
        }
        for &next in &adj[node] {
            if !seen[next] {
                seen[next] = true;
                parent[next] = node;
                queue.push_back(next);
            }
        }
    }
    if !seen[goal] {
        return Err(NumericalError::NoConvergence { pivots: 0 });
    }

    let mut nodes = vec![goal];
    let mut tail = goal;
    while tail != start {
        tail = parent[tail];
        nodes.push(tail);
    }
    nodes.reverse();

    let mut path = Vec::with_capacity(nodes.len() - 1);
    for pair in nodes.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (r, c) = if a < n { (a, b - n) } else { (b, a - n) };
        path.push((r, c));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::super::CostMatrix;
    use super::*;

    fn cost(rows: usize, cols: usize, data: Vec<f64>) -> CostMatrix {
        CostMatrix::from_raw(rows, cols, data).unwrap()
    }

    #[test]
    fn one_by_one_moves_all_mass() {
        let (d, plan) = solve(&cost(1, 1, vec![0.7])).unwrap();
        assert!((d - 0.7).abs() < 1e-12);
        assert!((plan.mass(0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_diagonal_costs_nothing() {
        let (d, _) = solve(&cost(2, 2, vec![0.0, 1.0, 1.0, 0.0])).unwrap();
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn picks_the_cheap_off_diagonal_assignment() {
        // Optimum routes row 1 -> col 0 (cost 0) and row 0 -> col 1 (cost 2).
        let (d, plan) = solve(&cost(2, 2, vec![1.0, 2.0, 0.0, 3.0])).unwrap();
        assert!((d - 1.0).abs() < 1e-12);
        assert!((plan.mass(1, 0) - 0.5).abs() < 1e-12);
        assert!((plan.mass(0, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rectangular_marginals_are_uniform_per_graph() {
        let (d, plan) = solve(&cost(2, 1, vec![2.0, 4.0])).unwrap();
        assert!((d - 3.0).abs() < 1e-12);
        for i in 0..2 {
            let row: f64 = (0..1).map(|j| plan.mass(i, j)).sum();
            assert!((row - 0.5).abs() < 1e-12);
        }
        let col: f64 = (0..2).map(|i| plan.mass(i, 0)).sum();
        assert!((col - 1.0).abs() < 1e-12);
    }

    #[test]
    fn three_by_three_matches_best_permutation() {
        // With equal sizes and uniform marginals the optimum is attained at
        // a permutation matrix scaled by 1/3 (Birkhoff).
        let c = vec![4.0, 1.0, 3.0, 2.0, 0.0, 5.0, 3.0, 2.0, 2.0];
        let (d, _) = solve(&cost(3, 3, c.clone())).unwrap();
        let perms = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let best = perms
            .iter()
            .map(|p| (0..3).map(|i| c[i * 3 + p[i]]).sum::<f64>() / 3.0)
            .fold(f64::INFINITY, f64::min);
        assert!((d - best).abs() < 1e-12);
    }

    #[test]
    fn unequal_sizes_split_mass() {
        // One source, two sinks: the single row must feed both columns.
        let (d, plan) = solve(&cost(1, 2, vec![1.0, 3.0])).unwrap();
        assert!((d - 2.0).abs() < 1e-12);
        assert!((plan.mass(0, 0) - 0.5).abs() < 1e-12);
        assert!((plan.mass(0, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn plan_marginals_hold_on_a_degenerate_case() {
        // n == m makes the northwest corner maximally degenerate.
        let (_, plan) = solve(&cost(3, 3, vec![1.0; 9])).unwrap();
        for i in 0..3 {
            let row: f64 = (0..3).map(|j| plan.mass(i, j)).sum();
            assert!((row - 1.0 / 3.0).abs() < 1e-12);
        }
        for j in 0..3 {
            let col: f64 = (0..3).map(|i| plan.mass(i, j)).sum();
            assert!((col - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_side_is_a_numerical_error() {
        let err = solve(&CostMatrix::from_raw(0, 2, vec![]).unwrap()).unwrap_err();
        assert!(matches!(err, NumericalError::EmptyGraph { left: 0, right: 2 }));
    }
}
