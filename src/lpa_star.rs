//! Lifelong Planning A*: incremental replanning under edge-cost changes
//! (spec §4.6).
//!
//! Grounded on the teacher's `d_star_lite.rs` (`calculate_key`,
//! `update_vertex`, `compute_shortest_path`), restructured onto
//! [`crate::vertex_store::VertexStore`] instead of a generation-counter
//! lazy-deletion heap, and generalized from unit edge costs to the
//! free/free-Euclidean-else-`BIG_NUM` rule of spec §4.6.
//!
//! Naming note (resolving the spec §9 anomaly about which endpoint is the
//! search anchor): the vertex whose `rhs` is pinned to 0 is `source_id`
//! (spec calls it `start`); the vertex being searched *toward*, whose key
//! drives both the heuristic and the termination test, is `anchor_id`
//! (spec calls it `goal`). [`crate::d_star_lite::DStarLite`] moves
//! `anchor_id` at runtime; plain LPA* never does.

use crate::error::Result;
use crate::geometry::{saturating_add, Point, BIG_NUM};
use crate::graph::{Graph, NodeId};
use crate::grid::Grid;
use crate::key::Key;
use crate::search_node::Lifecycle;
use crate::vertex_store::VertexStore;
use tracing::debug;

/// Incremental replanner over a fixed graph topology and a mutable
/// occupancy grid (spec §6: `LPAStar(grid_graph_ptr, grid_ptr, start_cell,
/// goal_cell)`).
pub struct LPAStar<'g> {
    pub(crate) graph: &'g Graph,
    pub(crate) grid: &'g mut Grid,
    pub(crate) source_id: NodeId,
    pub(crate) anchor_id: NodeId,
    pub(crate) anchor_location: Point,
    pub(crate) km: f64,
    store: VertexStore,
    expanded_nodes: Vec<Point>,
    last_path: Vec<Point>,
}

impl<'g> LPAStar<'g> {
    pub fn new(graph: &'g Graph, grid: &'g mut Grid, start: NodeId, goal: NodeId) -> Self {
        let anchor_location = graph.point(goal);
        let mut planner = LPAStar {
            graph,
            grid,
            source_id: start,
            anchor_id: goal,
            anchor_location,
            km: 0.0,
            store: VertexStore::materialize_all(graph.len()),
            expanded_nodes: Vec::new(),
            last_path: Vec::new(),
        };
        planner.store.get_mut(start).unwrap().rhs_val = 0.0;
        planner.recompute_key(start);
        planner.store.promote(start);
        planner
    }

    /// Fallible variant that validates `start`/`goal` are in range before
    /// doing any work, for callers assembling the graph and ids together
    /// (spec §7 treats out-of-bounds ids past this point as a contract
    /// violation, not a recoverable error).
    pub fn try_new(graph: &'g Graph, grid: &'g mut Grid, start: NodeId, goal: NodeId) -> Result<Self> {
        let (w, h) = grid.get_grid_dimensions();
        if start >= graph.len() || goal >= graph.len() || graph.len() != w * h {
            return Err(crate::error::PlannerError::DimensionMismatch {
                width: w,
                height: h,
                rows: graph.len() / w.max(1),
            });
        }
        Ok(Self::new(graph, grid, start, goal))
    }

    fn edge_cost(&self, a: NodeId, b: NodeId) -> f64 {
        self.grid.edge_cost(a, b, self.graph)
    }

    fn recompute_key(&mut self, id: NodeId) {
        let h = self.graph.point(id).distance(&self.anchor_location);
        let (min_val, key) = {
            let node = self.store.get_mut(id).expect("materialized at construction");
            node.h_val = h;
            let min_val = node.g_val.min(node.rhs_val);
            let k1 = saturating_add(saturating_add(min_val, h), self.km);
            let key = Key::new(k1, min_val);
            node.key_val = key;
            (min_val, key)
        };
        debug!(node = id, k1 = key.k1, k2 = key.k2, min_val, "recomputed key");
        self.store.resift(id);
    }

    /// `ComputeCost(sp, u)` (spec §4.6): `c = g(sp) + edge(sp, u)`; if
    /// cheaper than `u`'s current `rhs`, adopt it.
    fn compute_cost(&mut self, sp: NodeId, u: NodeId) {
        let edge = self.edge_cost(sp, u);
        let g_sp = self.store.get(sp).map(|n| n.g_val).unwrap_or(BIG_NUM);
        let c = saturating_add(g_sp, edge);
        if let Some(node) = self.store.get_mut(u) {
            if c < node.rhs_val {
                node.rhs_val = c;
                node.parent_p = Some(sp);
            }
        }
    }

    /// `UpdateVertex(u)` (spec §4.6).
    fn update_vertex(&mut self, u: NodeId) {
        self.expanded_nodes.push(self.graph.point(u));

        if u != self.source_id {
            self.store.get_mut(u).unwrap().rhs_val = BIG_NUM;
            let graph = self.graph;
            for &sp in graph.neighbors(u) {
                self.compute_cost(sp, u);
            }
        }
        self.recompute_key(u);

        let consistent = self.store.get(u).unwrap().is_consistent();
        if consistent {
            self.store.demote(u);
        } else {
            self.store.promote(u);
        }
    }

    fn goal_key(&mut self) -> Key {
        self.recompute_key(self.anchor_id);
        self.store.get(self.anchor_id).unwrap().key_val
    }

    /// `ComputeShortestPath` (spec §4.6). Terminates when the open queue's
    /// top key exceeds the anchor's key and the anchor is locally
    /// consistent — including the degenerate case where the queue has
    /// drained entirely, which is treated as a top key of positive infinity
    /// rather than an immediate failure: an empty queue with an
    /// inconsistent anchor means genuinely unreachable, but an empty queue
    /// with a consistent, finite-cost anchor means the search converged on
    /// its very last vertex (the anchor itself).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compute_shortest_path(&mut self) -> bool {
        self.expanded_nodes.clear();
        loop {
            let goal_key = self.goal_key();
            let goal_consistent = self.store.get(self.anchor_id).unwrap().is_consistent();

            let Some(u) = self.store.peek() else {
                break;
            };
            let u_key = self.store.get(u).unwrap().key_val;
            if u_key > goal_key && goal_consistent {
                break;
            }

            let u = self.store.pop().expect("peeked above");
            self.store.get_mut(u).unwrap().state = Lifecycle::Closed;
            let k_old = self.store.get(u).unwrap().key_val;
            self.recompute_key(u);
            let k_new = self.store.get(u).unwrap().key_val;

            if k_old < k_new {
                self.store.promote(u);
                continue;
            }

            let (g_u, rhs_u) = {
                let n = self.store.get(u).unwrap();
                (n.g_val, n.rhs_val)
            };

            if g_u > rhs_u {
                self.store.get_mut(u).unwrap().g_val = rhs_u;
                let graph = self.graph;
                for &sp in graph.neighbors(u) {
                    self.update_vertex(sp);
                }
            } else {
                self.store.get_mut(u).unwrap().g_val = BIG_NUM;
                let graph = self.graph;
                let neighbors: Vec<NodeId> = graph.neighbors(u).to_vec();
                for &sp in &neighbors {
                    self.update_vertex(sp);
                }
                self.update_vertex(u);
            }
        }

        if self.store.get(self.anchor_id).unwrap().rhs_val < BIG_NUM {
            self.last_path = self.assemble_path();
            true
        } else {
            self.last_path = Vec::new();
            false
        }
    }

    /// `MapChange` (spec §4.6): forwards occupancy updates to the grid,
    /// and for every flagged-changed cell, re-derives that cell itself and
    /// every neighbor of its graph node — a cell's own `rhs` depends on its
    /// neighbors' `g` via `edge_cost`, and a neighbor's `rhs` depends on
    /// this cell's `g` the same way, so both directions need updating.
    /// Returns whether any update actually changed occupancy.
    pub fn map_change(&mut self, updates: &[(Point, i8)]) -> bool {
        let flags = self.grid.update_grid(updates);
        let mut any = false;
        for (idx, &(point, _)) in updates.iter().enumerate() {
            if !flags[idx] {
                continue;
            }
            any = true;
            let g = self.grid.world_to_grid(point);
            let changed_id = self.grid.node_id(g.x as usize, g.y as usize);
            let graph = self.graph;
            let neighbors: Vec<NodeId> = graph.neighbors(changed_id).to_vec();
            for sp in neighbors {
                self.update_vertex(sp);
            }
            self.update_vertex(changed_id);
        }
        any
    }

    /// Read-only traversal from the anchor back to the source, re-deriving
    /// the minimizing predecessor at each step instead of trusting
    /// `parent_p` (spec §9: treats extraction as read-only, never mutating
    /// live `rhs` values).
    fn assemble_path(&self) -> Vec<Point> {
        let mut path = Vec::new();
        let mut current = self.anchor_id;
        let guard = self.graph.len() + 1;
        for _ in 0..guard {
            path.push(self.graph.point(current));
            if current == self.source_id {
                break;
            }
            let mut best_cost = BIG_NUM;
            let mut best_parent = None;
            for &sp in self.graph.neighbors(current) {
                let g_sp = self.store.get(sp).map(|n| n.g_val).unwrap_or(BIG_NUM);
                let c = saturating_add(g_sp, self.edge_cost(sp, current));
                if c < best_cost {
                    best_cost = c;
                    best_parent = Some(sp);
                }
            }
            match best_parent {
                Some(p) => current = p,
                None => break,
            }
        }
        path
    }

    pub fn get_path(&self) -> Vec<Point> {
        self.last_path.clone()
    }

    pub fn get_expanded_nodes(&self) -> Vec<Point> {
        self.expanded_nodes.clone()
    }
}
