//! Graph model and collaborators.
//!
//! - [`model`]: arena-indexed immutable graph (nodes, labeled directed
//!   edges, precomputed adjacency). AMR graphs are reentrant, so nodes and
//!   edges live in flat arenas addressed by [`NodeId`]/[`EdgeId`] instead of
//!   linked structures.
//! - [`penman`]: the `parse(text) -> Graph` collaborator for the textual
//!   penman notation.
//! - [`transform`]: optional edge-to-node rewrite that turns the labeled
//!   multigraph into an unlabeled simple graph.

pub mod model;
pub mod penman;
pub mod transform;

pub use model::{Edge, EdgeId, Graph, Node, NodeId};
pub use penman::{parse_bank, parse_graph};
pub use transform::edge_to_node_transform;
