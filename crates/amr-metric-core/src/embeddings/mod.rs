//! Embedding tables, relation parameters, and node initialization.
//!
//! - [`table`]: pretrained concept-token lookup table with the
//!   out-of-vocabulary policy.
//! - [`relation`]: relation parameter set (scalar weights or full vectors)
//!   with generative initialization schemes for labels absent from a custom
//!   table.
//! - [`initializer`]: assigns level-0 embeddings to every node of a graph.

pub mod initializer;
pub mod relation;
pub mod table;

pub use initializer::{InitializedGraph, Initializer};
pub use relation::{InitScheme, RelationParams, RelationResolver, RelationValue, ResolvedRelations};
pub use table::EmbeddingTable;
