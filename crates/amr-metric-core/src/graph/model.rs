//! Arena-indexed graph model.
//!
//! A [`Graph`] is built once from parsed input and is read-only afterwards.
//! Node embeddings are deliberately NOT stored on nodes: the propagator owns
//! dense per-level matrices instead, which keeps the graph shareable across
//! sampling repetitions and worker threads without copies.

use serde::Serialize;

/// Index of a node within its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena position as a usize.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an edge within its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Arena position as a usize.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A concept-bearing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Human-readable identifier: the penman variable (`v1`), a generated
    /// name for attribute constants (`attr-0`), or a reserved name for
    /// transform-synthesized nodes.
    pub var: String,
    /// Concept label used for embedding lookup.
    pub concept: String,
    /// True for nodes inserted by the edge-to-node transform. Synthetic
    /// nodes participate in propagation and transport but are hidden from
    /// alignment output.
    pub synthetic: bool,
}

/// A labeled directed edge. Immutable once the graph is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Relation label without the leading `:` (e.g. `ARG0`, `mod`).
    pub label: String,
}

/// Immutable directed, edge-labeled, possibly cyclic graph.
///
/// Multi-edges between the same node pair with different labels are allowed;
/// adjacency is precomputed per node in both directions.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<(NodeId, EdgeId)>>,
    incoming: Vec<Vec<(NodeId, EdgeId)>>,
}

impl Graph {
    /// Build a graph from arenas, precomputing adjacency.
    ///
    /// Edge endpoints must be valid arena indices; the parser and the
    /// transform uphold this by construction.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (i, edge) in edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            outgoing[edge.source.index()].push((edge.target, id));
            incoming[edge.target.index()].push((edge.source, id));
        }
        Self {
            nodes,
            edges,
            outgoing,
            incoming,
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes in arena order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in input order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node by arena index.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Edge by arena index.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Nodes this node points to, with the connecting edge.
    #[inline]
    pub fn outgoing(&self, id: NodeId) -> &[(NodeId, EdgeId)] {
        &self.outgoing[id.index()]
    }

    /// Nodes pointing to this node, with the connecting edge.
    #[inline]
    pub fn incoming(&self, id: NodeId) -> &[(NodeId, EdgeId)] {
        &self.incoming[id.index()]
    }

    /// Look up a node by its variable name.
    pub fn node_by_var(&self, var: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.var == var)
            .map(|i| NodeId(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(var: &str, concept: &str) -> Node {
        Node {
            var: var.to_string(),
            concept: concept.to_string(),
            synthetic: false,
        }
    }

    #[test]
    fn adjacency_is_precomputed_in_both_directions() {
        let g = Graph::new(
            vec![node("a", "alpha"), node("b", "beta"), node("c", "gamma")],
            vec![
                Edge {
                    source: NodeId(0),
                    target: NodeId(1),
                    label: "ARG0".to_string(),
                },
                Edge {
                    source: NodeId(2),
                    target: NodeId(1),
                    label: "mod".to_string(),
                },
            ],
        );
        assert_eq!(g.outgoing(NodeId(0)), &[(NodeId(1), EdgeId(0))]);
        assert_eq!(
            g.incoming(NodeId(1)),
            &[(NodeId(0), EdgeId(0)), (NodeId(2), EdgeId(1))]
        );
        assert!(g.outgoing(NodeId(1)).is_empty());
    }

    #[test]
    fn cycles_and_multi_edges_are_representable() {
        let g = Graph::new(
            vec![node("a", "alpha"), node("b", "beta")],
            vec![
                Edge {
                    source: NodeId(0),
                    target: NodeId(1),
                    label: "ARG0".to_string(),
                },
                Edge {
                    source: NodeId(0),
                    target: NodeId(1),
                    label: "ARG1".to_string(),
                },
                Edge {
                    source: NodeId(1),
                    target: NodeId(0),
                    label: "ARG0-of".to_string(),
                },
            ],
        );
        assert_eq!(g.outgoing(NodeId(0)).len(), 2);
        assert_eq!(g.incoming(NodeId(0)).len(), 1);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn node_by_var_resolves_arena_index() {
        let g = Graph::new(vec![node("x1", "thing")], vec![]);
        assert_eq!(g.node_by_var("x1"), Some(NodeId(0)));
        assert_eq!(g.node_by_var("nope"), None);
    }
}
