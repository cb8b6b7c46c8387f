//! Construction-time failures.
//!
//! Everything downstream of a successfully built [`crate::graph::Graph`] /
//! [`crate::grid::Grid`] follows spec §7: bad start/goal ids and mutating
//! the grid outside `map_change` are programmer-error contracts, not
//! recoverable errors, so they assert rather than returning `Result`. This
//! type covers only the one place a caller can hand the crate malformed
//! raw data: building the graph/grid in the first place.

use thiserror::Error;

/// Failure building a [`crate::graph::Graph`] or [`crate::grid::Grid`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("node {node} lists neighbor {neighbor} which is out of bounds (graph has {len} nodes)")]
    NeighborOutOfBounds {
        node: usize,
        neighbor: usize,
        len: usize,
    },

    #[error("grid dimensions {width}x{height} do not match {rows} cell rows")]
    DimensionMismatch {
        width: usize,
        height: usize,
        rows: usize,
    },

    #[error("grid row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        actual: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, PlannerError>;
