//! The prebuilt graph the core searches over (spec §3, §6).
//!
//! spec.md treats the roadmap layer — the thing that actually produces
//! this graph from a probabilistic roadmap or a grid — as an external
//! collaborator. What the core consumes is just this: a dense array of
//! nodes, each carrying its point and its neighbor ids.

use crate::error::{PlannerError, Result};
use crate::geometry::Point;

/// Dense index identifying a node within a [`Graph`]. For grid-based
/// variants this equals the cell's row-major index; the core never cares
/// which convention produced it.
pub type NodeId = usize;

/// A single vertex of the external graph: read-only to the search core.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: NodeId,
    pub point: Point,
    pub neighbor_ids: Vec<NodeId>,
}

/// A dense-indexed, read-only graph of nodes with neighbor sets.
///
/// This is the one piece of "roadmap" the core actually touches. Building
/// one validates that every neighbor id is in range — the sole
/// construction-time failure mode; anything past this point that hands the
/// core an out-of-bounds id is a contract violation (spec §7), not a
/// recoverable error.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<GraphNode>,
}

impl Graph {
    /// Builds a graph from nodes already carrying their neighbor ids,
    /// validating that every neighbor id indexes into `nodes`.
    pub fn try_new(nodes: Vec<GraphNode>) -> Result<Self> {
        let len = nodes.len();
        for node in &nodes {
            for &neighbor in &node.neighbor_ids {
                if neighbor >= len {
                    return Err(PlannerError::NeighborOutOfBounds {
                        node: node.id,
                        neighbor,
                        len,
                    });
                }
            }
        }
        Ok(Graph { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id. Out-of-range ids are a contract violation
    /// (spec §7): this panics rather than returning `Option`, matching
    /// every other indexing-style accessor in the core.
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].neighbor_ids
    }

    pub fn point(&self, id: NodeId) -> Point {
        self.nodes[id].point
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }
}
