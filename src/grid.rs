//! The occupancy grid the LPA*/D* Lite variants consume (spec §6).
//!
//! A dense, (y, x)-indexed array of signed-byte occupancy values, plus the
//! coordinate mapping between world points and grid cells and the
//! `edge_cost` rule of spec §4.6: two adjacent free cells cost their
//! Euclidean distance apart; anything touching an occupied cell costs
//! [`BIG_NUM`](crate::geometry::BIG_NUM).
//!
//! Grounded on the teacher's `grid.rs` (`Position`/`Cell`/`Grid`,
//! `get_neighbors`), generalized from 4-connected unit-cost moves to
//! 8-connected Euclidean-cost moves, which is what spec §8's scenarios
//! (diagonal paths costing `2*sqrt(2)`) require.

use crate::error::{PlannerError, Result};
use crate::geometry::{Point, BIG_NUM};
use crate::graph::{Graph, GraphNode, NodeId};

/// Occupancy value for a single cell. The grid-update layer stores
/// signed-byte occupancy (spec §4.6); the core only ever consumes the
/// binary free/not-free distinction via [`Occupancy::is_free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy(pub i8);

impl Occupancy {
    pub const FREE: Occupancy = Occupancy(0);

    pub fn is_free(self) -> bool {
        self.0 == 0
    }
}

/// A dense occupancy grid with unit cell size, origin at (0, 0).
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Occupancy>,
}

impl Grid {
    /// All-free grid of the given dimensions.
    pub fn new_empty(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![Occupancy::FREE; width * height],
        }
    }

    /// Builds a grid from caller-assembled rows of raw occupancy data,
    /// validating that there are exactly `height` rows (else
    /// [`PlannerError::DimensionMismatch`]) and that every row has exactly
    /// `width` cells (else [`PlannerError::RaggedRow`]).
    pub fn try_new(width: usize, height: usize, rows: Vec<Vec<i8>>) -> Result<Self> {
        if rows.len() != height {
            return Err(PlannerError::DimensionMismatch {
                width,
                height,
                rows: rows.len(),
            });
        }
        let mut cells = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(PlannerError::RaggedRow {
                    row,
                    actual: values.len(),
                    expected: width,
                });
            }
            cells.extend(values.into_iter().map(Occupancy));
        }
        Ok(Grid { width, height, cells })
    }

    pub fn get_grid_dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Row-major `(y, x)` -> dense id, matching [`Graph`]'s node ids.
    pub fn node_id(&self, x: usize, y: usize) -> NodeId {
        y * self.width + x
    }

    fn xy(&self, id: NodeId) -> (usize, usize) {
        (id % self.width, id / self.width)
    }

    pub fn world_to_grid(&self, p: Point) -> Point {
        Point::new(p.x.round(), p.y.round())
    }

    pub fn grid_to_world(&self, p: Point) -> Point {
        p
    }

    /// The grid's cells as graph nodes, one row per `y` (spec §6's
    /// `get_nodes`). Each node's neighbor set is the fixed 8-connected
    /// geometric adjacency, same as [`Grid::build_graph`]'s flattened form.
    pub fn get_nodes(&self) -> Vec<Vec<GraphNode>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let id = self.node_id(x, y);
                        GraphNode {
                            id,
                            point: Point::new(x as f64, y as f64),
                            neighbor_ids: self.geometric_neighbors(id),
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// The full 2D occupancy array, one row per `y`.
    pub fn get_grid(&self) -> Vec<Vec<i8>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cells[self.node_id(x, y)].0)
                    .collect()
            })
            .collect()
    }

    pub fn occupancy(&self, id: NodeId) -> Occupancy {
        self.cells[id]
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// 8-connected neighbor ids of `id`, regardless of occupancy — the
    /// graph topology is fixed; occupancy is consulted separately via
    /// [`Grid::edge_cost`] so LPA*/D* Lite can react to it without
    /// rebuilding the graph.
    fn geometric_neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let (x, y) = self.xy(id);
        let (x, y) = (x as i64, y as i64);
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if self.in_bounds(nx, ny) {
                    out.push(self.node_id(nx as usize, ny as usize));
                }
            }
        }
        out
    }

    /// Builds the full topology graph LPA*/D* Lite search over: every
    /// cell is a node, neighbor sets are the fixed 8-connected geometric
    /// adjacency regardless of current occupancy.
    pub fn build_graph(&self) -> Graph {
        let nodes = (0..self.cells.len())
            .map(|id| {
                let (x, y) = self.xy(id);
                GraphNode {
                    id,
                    point: Point::new(x as f64, y as f64),
                    neighbor_ids: self.geometric_neighbors(id),
                }
            })
            .collect();
        Graph::try_new(nodes).expect("grid-derived neighbor ids are always in range")
    }

    /// Builds a graph for one-shot search (A*/Theta*) with the current
    /// occupancy baked statically into the topology: an edge exists only
    /// between two currently-free cells. Unlike [`Grid::build_graph`],
    /// this graph does not adapt to later occupancy changes.
    pub fn build_free_graph(&self) -> Graph {
        let nodes = (0..self.cells.len())
            .map(|id| {
                let (x, y) = self.xy(id);
                let neighbor_ids = if self.occupancy(id).is_free() {
                    self.geometric_neighbors(id)
                        .into_iter()
                        .filter(|&n| self.occupancy(n).is_free())
                        .collect()
                } else {
                    Vec::new()
                };
                GraphNode {
                    id,
                    point: Point::new(x as f64, y as f64),
                    neighbor_ids,
                }
            })
            .collect();
        Graph::try_new(nodes).expect("grid-derived neighbor ids are always in range")
    }

    /// Edge cost rule of spec §4.6: Euclidean distance between two free
    /// cells, or [`BIG_NUM`] if either endpoint is occupied.
    pub fn edge_cost(&self, a: NodeId, b: NodeId, graph: &Graph) -> f64 {
        if self.occupancy(a).is_free() && self.occupancy(b).is_free() {
            graph.point(a).distance(&graph.point(b))
        } else {
            BIG_NUM
        }
    }

    /// Applies occupancy updates given in world coordinates, returning a
    /// per-update changed flag (spec §6's `update_grid`). A cell "changes"
    /// when the new occupancy value differs from what was stored.
    pub fn update_grid(&mut self, updates: &[(Point, i8)]) -> Vec<bool> {
        updates
            .iter()
            .map(|&(p, value)| {
                let g = self.world_to_grid(p);
                let (x, y) = (g.x as usize, g.y as usize);
                let id = self.node_id(x, y);
                let changed = self.cells[id].0 != value;
                self.cells[id] = Occupancy(value);
                changed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_is_all_free() {
        let grid = Grid::new_empty(3, 3);
        for id in 0..9 {
            assert!(grid.occupancy(id).is_free());
        }
    }

    #[test]
    fn try_new_accepts_well_formed_rows() {
        let rows = vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]];
        let grid = Grid::try_new(3, 3, rows).unwrap();
        assert!(!grid.occupancy(grid.node_id(1, 1)).is_free());
    }

    #[test]
    fn try_new_rejects_ragged_row() {
        let rows = vec![vec![0, 0, 0], vec![0, 0], vec![0, 0, 0]];
        let err = Grid::try_new(3, 3, rows).unwrap_err();
        assert_eq!(
            err,
            PlannerError::RaggedRow {
                row: 1,
                actual: 2,
                expected: 3
            }
        );
    }

    #[test]
    fn try_new_rejects_wrong_row_count() {
        let rows = vec![vec![0, 0, 0], vec![0, 0, 0]];
        let err = Grid::try_new(3, 3, rows).unwrap_err();
        assert_eq!(
            err,
            PlannerError::DimensionMismatch {
                width: 3,
                height: 3,
                rows: 2
            }
        );
    }

    #[test]
    fn corner_has_three_neighbors() {
        let grid = Grid::new_empty(3, 3);
        let graph = grid.build_graph();
        assert_eq!(graph.neighbors(grid.node_id(0, 0)).len(), 3);
    }

    #[test]
    fn center_has_eight_neighbors() {
        let grid = Grid::new_empty(3, 3);
        let graph = grid.build_graph();
        assert_eq!(graph.neighbors(grid.node_id(1, 1)).len(), 8);
    }

    #[test]
    fn update_grid_reports_changed_flags() {
        let mut grid = Grid::new_empty(3, 3);
        let flags = grid.update_grid(&[(Point::new(1.0, 1.0), 1), (Point::new(2.0, 2.0), 0)]);
        assert_eq!(flags, vec![true, false]);
        assert!(!grid.occupancy(grid.node_id(1, 1)).is_free());
    }

    #[test]
    fn edge_cost_is_big_num_through_obstacle() {
        let mut grid = Grid::new_empty(3, 3);
        grid.update_grid(&[(Point::new(1.0, 1.0), 1)]);
        let graph = grid.build_graph();
        let a = grid.node_id(0, 0);
        let b = grid.node_id(1, 1);
        assert_eq!(grid.edge_cost(a, b, &graph), BIG_NUM);
    }

    #[test]
    fn get_nodes_matches_build_graph_topology() {
        let grid = Grid::new_empty(3, 3);
        let rows = grid.get_nodes();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1].neighbor_ids.len(), 8);
        assert_eq!(rows[0][0].point, Point::new(0.0, 0.0));
    }

    #[test]
    fn build_free_graph_excludes_blocked_edges() {
        let mut grid = Grid::new_empty(3, 3);
        grid.update_grid(&[(Point::new(1.0, 1.0), 1)]);
        let free_graph = grid.build_free_graph();
        let blocked = grid.node_id(1, 1);
        assert!(free_graph.neighbors(blocked).is_empty());
        let corner = grid.node_id(0, 0);
        assert!(!free_graph.neighbors(corner).contains(&blocked));
    }
}
