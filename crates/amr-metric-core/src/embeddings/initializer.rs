//! Level-0 node embedding assignment.

use rand::Rng;

use crate::graph::Graph;

use super::table::{random_unit_vector, EmbeddingTable};

/// A graph's initial embeddings plus the positions of its OOV nodes.
///
/// `base` holds the deterministic level-0 matrix (in-vocabulary lookups and
/// deterministic OOV fallbacks). `oov` records which rows came from the
/// fallback so sampling mode can redraw exactly those.
#[derive(Debug, Clone)]
pub struct InitializedGraph {
    /// Level-0 embedding per node, arena order.
    pub base: Vec<Vec<f32>>,
    /// Arena indices of out-of-vocabulary nodes.
    pub oov: Vec<usize>,
}

impl InitializedGraph {
    /// Whether any node missed the pretrained table.
    pub fn has_oov(&self) -> bool {
        !self.oov.is_empty()
    }
}

/// Assigns initial vectors to every node of a graph by token lookup.
#[derive(Debug, Clone, Copy)]
pub struct Initializer<'a> {
    table: &'a EmbeddingTable,
}

impl<'a> Initializer<'a> {
    pub fn new(table: &'a EmbeddingTable) -> Self {
        Self { table }
    }

    /// Deterministic initialization: table lookups plus the token-seeded
    /// fallback for OOV concepts.
    pub fn initialize(&self, graph: &Graph) -> InitializedGraph {
        let mut base = Vec::with_capacity(graph.node_count());
        let mut oov = Vec::new();
        for (i, node) in graph.nodes().iter().enumerate() {
            match self.table.lookup(&node.concept) {
                Some(v) => base.push(v.to_vec()),
                None => {
                    oov.push(i);
                    base.push(self.table.fallback_vector(&node.concept));
                }
            }
        }
        InitializedGraph { base, oov }
    }

    /// Sampling repetition: copy the base matrix with fresh random vectors
    /// in the OOV rows, drawn from the caller-supplied RNG.
    pub fn resample_oov<R: Rng>(&self, init: &InitializedGraph, rng: &mut R) -> Vec<Vec<f32>> {
        let mut embeddings = init.base.clone();
        for &row in &init.oov {
            embeddings[row] = random_unit_vector(rng, self.table.dim());
        }
        embeddings
    }
}
