//! Edge-to-node structural transform.
//!
//! Rewrites every labeled edge `(u, label, v)` into two unlabeled edges
//! `u -> s -> v` through a synthetic intermediate node `s` whose concept is
//! `label`. The labeled multigraph becomes an unlabeled simple graph, so a
//! pure node-identity propagation scheme absorbs relation semantics through
//! the synthetic nodes.

use super::model::{Edge, Graph, Node, NodeId};

/// Label carried by the unlabeled edges the transform introduces.
pub const PLAIN_EDGE_LABEL: &str = "edge";

/// Apply the edge-to-node transform.
///
/// Reachability is preserved: every original path `u -> v` still exists,
/// lengthened through the synthetic node. Synthetic variables use a `$`
/// prefix, which the penman token charset cannot produce, so they can never
/// collide with parsed identifiers. Original nodes keep their arena indices.
pub fn edge_to_node_transform(graph: &Graph) -> Graph {
    let mut nodes: Vec<Node> = graph.nodes().to_vec();
    let mut edges: Vec<Edge> = Vec::with_capacity(graph.edge_count() * 2);

    for (i, edge) in graph.edges().iter().enumerate() {
        let synthetic = NodeId(nodes.len() as u32);
        nodes.push(Node {
            var: format!("$rel-{i}"),
            concept: edge.label.clone(),
            synthetic: true,
        });
        edges.push(Edge {
            source: edge.source,
            target: synthetic,
            label: PLAIN_EDGE_LABEL.to_string(),
        });
        edges.push(Edge {
            source: synthetic,
            target: edge.target,
            label: PLAIN_EDGE_LABEL.to_string(),
        });
    }

    Graph::new(nodes, edges)
}
