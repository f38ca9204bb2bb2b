//! Weisfeiler-Leman style embedding propagation.
//!
//! Runs K rounds of neighbor-aware update over a graph, retaining every
//! intermediate state: the result is K+1 snapshots, snapshot 0 being the
//! initial embeddings. Level 0 is the no-context baseline the multi-level
//! transport distance needs, so the update keeps half of each node's own
//! embedding instead of overwriting it.
//!
//! Update rule, per node and iteration:
//!
//! ```text
//! next[v] = 0.5 * cur[v] + 0.5 * mean over neighbors (u, e) of contrib(u, e)
//! contrib, scalar relation w:  w * cur[u]
//! contrib, vector relation r:  0.5 * (cur[u] + r)    componentwise
//! ```
//!
//! The neighbor mean is commutative, so edge enumeration order carries no
//! meaning. Isolated nodes (no neighbors in the chosen direction) propagate
//! unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::embeddings::{RelationValue, ResolvedRelations};
use crate::error::ConfigError;
use crate::graph::{Graph, NodeId};

/// Default number of WL iterations.
pub const DEFAULT_ITERATIONS: usize = 2;

/// One per-graph, per-level matrix of node embeddings.
pub type Snapshot = Vec<Vec<f32>>;

/// Message-passing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Aggregate over all incident edges, treating the graph as undirected.
    #[default]
    Both,
    /// Aggregate only from nodes this node points to.
    FromOut,
    /// Aggregate only from nodes pointing to this node.
    FromIn,
}

impl Direction {
    /// The closed set of accepted names, for error messages.
    pub const ALLOWED: &'static str = "both, fromout, fromin";
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "both" => Ok(Direction::Both),
            "fromout" => Ok(Direction::FromOut),
            "fromin" => Ok(Direction::FromIn),
            other => Err(ConfigError::UnsupportedValue {
                field: "communication_direction",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Both => "both",
            Direction::FromOut => "fromout",
            Direction::FromIn => "fromin",
        };
        f.write_str(s)
    }
}

/// Multi-iteration propagator over one graph.
#[derive(Debug, Clone, Copy)]
pub struct Propagator {
    iterations: usize,
    direction: Direction,
}

impl Propagator {
    pub fn new(iterations: usize, direction: Direction) -> Self {
        Self {
            iterations,
            direction,
        }
    }

    /// Run K iterations from `init`, returning K+1 snapshots.
    pub fn propagate(
        &self,
        graph: &Graph,
        init: Snapshot,
        relations: &ResolvedRelations,
    ) -> Vec<Snapshot> {
        let mut snapshots = Vec::with_capacity(self.iterations + 1);
        let mut cur = init;
        for _ in 0..self.iterations {
            let mut next = Vec::with_capacity(graph.node_count());
            for v in 0..graph.node_count() {
                next.push(self.update_node(graph, NodeId(v as u32), &cur, relations));
            }
            snapshots.push(cur);
            cur = next;
        }
        snapshots.push(cur);
        snapshots
    }

    fn update_node(
        &self,
        graph: &Graph,
        v: NodeId,
        cur: &Snapshot,
        relations: &ResolvedRelations,
    ) -> Vec<f32> {
        let own = &cur[v.index()];
        let dim = own.len();

        let mut agg = vec![0.0f32; dim];
        let mut count = 0usize;
        let mut absorb = |neighbors: &[(NodeId, crate::graph::EdgeId)]| {
            for &(u, e) in neighbors {
                let contribution = &cur[u.index()];
                match relations.get(&graph.edge(e).label) {
                    RelationValue::Scalar(w) => {
                        for d in 0..dim {
                            agg[d] += w * contribution[d];
                        }
                    }
                    RelationValue::Vector(r) => {
                        for d in 0..dim {
                            agg[d] += 0.5 * (contribution[d] + r[d]);
                        }
                    }
                }
                count += 1;
            }
        };

        match self.direction {
            Direction::Both => {
                absorb(graph.outgoing(v));
                absorb(graph.incoming(v));
            }
            Direction::FromOut => absorb(graph.outgoing(v)),
            Direction::FromIn => absorb(graph.incoming(v)),
        }

        if count == 0 {
            return own.clone();
        }
        let scale = 0.5 / count as f32;
        (0..dim).map(|d| 0.5 * own[d] + scale * agg[d]).collect()
    }
}
