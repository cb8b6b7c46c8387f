//! D* Lite (spec §4.7): LPA* with the source/anchor roles swapped so
//! replanning tracks a moving robot instead of a moving goal.
//!
//! Grounded on the teacher's `d_star_lite.rs`/`d_star_lite_simple.rs`
//! (`km`, `update_robot_loc`/equivalent drift bookkeeping), rebuilt on top
//! of [`LPAStar`] rather than duplicating its loop. Resolves the spec §9
//! naming anomaly: internally, the fixed destination is LPA*'s
//! `source_id` (rhs pinned to 0) and the robot's current cell is LPA*'s
//! `anchor_id` (the moving search target, driving `h` and the termination
//! test) — the reverse of how a caller thinks about "start" and "goal".

use crate::geometry::{saturating_add, Point};
use crate::graph::{Graph, NodeId};
use crate::grid::Grid;
use crate::lpa_star::LPAStar;

/// Wraps [`LPAStar`] with `start`/`goal` swapped: the fixed destination
/// becomes the pinned source, the robot's current cell becomes the
/// moving anchor (spec §6: `DStarLite(grid_graph_ptr, grid_ptr,
/// robot_cell, goal_cell)`).
pub struct DStarLite<'g> {
    inner: LPAStar<'g>,
}

impl<'g> DStarLite<'g> {
    pub fn new(graph: &'g Graph, grid: &'g mut Grid, robot_cell: NodeId, goal_cell: NodeId) -> Self {
        DStarLite {
            inner: LPAStar::new(graph, grid, goal_cell, robot_cell),
        }
    }

    pub fn compute_shortest_path(&mut self) -> bool {
        self.inner.compute_shortest_path()
    }

    pub fn map_change(&mut self, updates: &[(Point, i8)]) -> bool {
        self.inner.map_change(updates)
    }

    /// Moves the robot to `new_location`, accumulating the drift term
    /// `km += distance(old robot cell, new robot cell)` so that stale
    /// cached keys from before the move stay valid priority bounds
    /// without needing to touch them (spec §4.7).
    pub fn update_robot_loc(&mut self, new_location: NodeId) {
        let old_point = self.inner.anchor_location;
        let new_point = self.inner.graph.point(new_location);
        self.inner.km = saturating_add(self.inner.km, old_point.distance(&new_point));
        self.inner.anchor_id = new_location;
        self.inner.anchor_location = new_point;
    }

    pub fn get_path(&self) -> Vec<Point> {
        self.inner.get_path()
    }

    pub fn get_expanded_nodes(&self) -> Vec<Point> {
        self.inner.get_expanded_nodes()
    }

    /// Current drift accumulator (spec §8 invariant 4: non-decreasing
    /// across `update_robot_loc` calls).
    pub fn km(&self) -> f64 {
        self.inner.km
    }
}
