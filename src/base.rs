//! Shared scaffolding for the one-shot searches, A* and Theta* (spec §4.3).
//!
//! Both algorithms run the exact same loop and differ only in
//! `ComputeCost`'s relaxation rule (spec §9: "express as a small
//! capability/strategy... compose A*, Theta*... by supplying different
//! relaxation functions to a common loop"). `OneShotContext` is the `h`/`g`/`f`
//! scaffolding of spec §4.3; `run_one_shot` is `ComputeShortestPath`.

use crate::geometry::Point;
use crate::graph::{Graph, NodeId};
use crate::key::Key;
use crate::search_node::Lifecycle;
use crate::vertex_store::VertexStore;
use tracing::{debug, trace};

/// Shared state for a single one-shot search: the borrowed graph, the
/// current goal anchor, and the vertex store doubling as both open queue
/// and (for A*/Theta*) closed list.
pub struct OneShotContext<'g> {
    pub graph: &'g Graph,
    pub goal_location: Point,
    pub store: VertexStore,
}

impl<'g> OneShotContext<'g> {
    pub fn new(graph: &'g Graph, goal_location: Point) -> Self {
        OneShotContext {
            store: VertexStore::with_capacity(graph.len()),
            graph,
            goal_location,
        }
    }

    /// `h(n) = distance(n.point, goal_location)` — Euclidean, admissible
    /// and consistent on a grid/roadmap (spec §4.3, §8 invariant 5).
    pub fn h(&self, n: NodeId) -> f64 {
        self.graph.point(n).distance(&self.goal_location)
    }

    /// `g(s, s') = s.g_val + distance(s.point, s'.point)`.
    pub fn g_via(&self, s: NodeId, s_prime: NodeId) -> f64 {
        let g_s = self.store.get(s).map(|n| n.g_val).unwrap_or(crate::geometry::BIG_NUM);
        crate::geometry::saturating_add(g_s, self.graph.point(s).distance(&self.graph.point(s_prime)))
    }

    /// `f(s, s') = (g + h, g, h)`.
    pub fn f_via(&self, s: NodeId, s_prime: NodeId) -> (f64, f64, f64) {
        let g = self.g_via(s, s_prime);
        let h = self.h(s_prime);
        (crate::geometry::saturating_add(g, h), g, h)
    }
}

/// The only algorithm-specific hook A*/Theta* override (spec §4.3).
pub trait ComputeCost {
    /// Relaxes the edge `s -> s_prime`, possibly updating `s_prime`'s
    /// `g`/`h`/`key`/`parent` in `ctx.store`.
    fn compute_cost(&self, ctx: &mut OneShotContext<'_>, s: NodeId, s_prime: NodeId);
}

/// Outcome of a one-shot search: whether a path was found, the path in
/// goal-to-start order (spec §4.3's `get_path` ordering), and the
/// expansion trace.
pub struct OneShotOutcome {
    pub found: bool,
    pub path: Vec<Point>,
    pub expanded_nodes: Vec<Point>,
}

/// `ComputeShortestPath` for A*/Theta* (spec §4.4 steps 1-6).
pub fn run_one_shot(graph: &Graph, start: NodeId, goal: NodeId, relax: &dyn ComputeCost) -> OneShotOutcome {
    let mut ctx = OneShotContext::new(graph, graph.point(goal));
    let mut expanded_nodes = Vec::new();

    {
        let h_start = ctx.h(start);
        let node = ctx.store.ensure(start);
        node.g_val = 0.0;
        node.h_val = h_start;
        node.key_val = Key::new(h_start, 0.0);
        node.parent_p = None;
        node.state = Lifecycle::Open;
    }
    ctx.store.promote(start);

    loop {
        let Some(u) = ctx.store.pop() else {
            debug!("one-shot search exhausted the open queue without reaching the goal");
            return OneShotOutcome {
                found: false,
                path: Vec::new(),
                expanded_nodes,
            };
        };
        expanded_nodes.push(graph.point(u));

        if u == goal {
            let path = assemble_path(&ctx, u);
            return OneShotOutcome {
                found: true,
                path,
                expanded_nodes,
            };
        }

        ctx.store.get_mut(u).expect("popped vertex is materialized").state = Lifecycle::Closed;

        for &v in graph.neighbors(u) {
            if matches!(ctx.store.get(v).map(|n| n.state), Some(Lifecycle::Closed)) {
                continue;
            }
            let was_open = ctx.store.is_open(v);
            let was_new = !ctx.store.contains(v);
            ctx.store.ensure(v);
            relax.compute_cost(&mut ctx, u, v);
            if was_new {
                ctx.store.get_mut(v).unwrap().state = Lifecycle::Open;
                ctx.store.promote(v);
            } else if was_open {
                ctx.store.resift(v);
            }
        }
    }
}

/// Walks parent back-links from `goal` to `start`, accumulating points in
/// goal-to-start order (spec §4.3's `assemble_path`).
pub fn assemble_path(ctx: &OneShotContext<'_>, goal: NodeId) -> Vec<Point> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(id) = current {
        path.push(ctx.graph.point(id));
        trace!(node = id, "assembling path");
        current = ctx.store.get(id).and_then(|n| n.parent_p);
    }
    path
}
