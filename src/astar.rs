//! One-shot A* search (spec §4.4).
//!
//! All of the algorithm's actual logic lives in [`crate::base::run_one_shot`]
//! and [`AStarRelax`]; this module is the thin `ComputeCost` override plus
//! the public handle spec §6 names (`AStar::compute_shortest_path`,
//! `get_path`, `get_expanded_nodes`).

use crate::base::{run_one_shot, ComputeCost, OneShotContext, OneShotOutcome};
use crate::geometry::{saturating_add, Point, BIG_NUM};
use crate::graph::{Graph, NodeId};
use crate::key::Key;

/// `ComputeCost(s, s')` for A* (spec §4.4): relax if the candidate `f`
/// beats the cached `k1` on `s'`.
pub struct AStarRelax;

impl ComputeCost for AStarRelax {
    fn compute_cost(&self, ctx: &mut OneShotContext<'_>, s: NodeId, s_prime: NodeId) {
        let (f, g, h) = ctx.f_via(s, s_prime);
        let current_k1 = ctx
            .store
            .get(s_prime)
            .map(|n| n.key_val.k1)
            .unwrap_or(BIG_NUM);
        if f < current_k1 {
            let node = ctx.store.get_mut(s_prime).expect("ensured before relaxation");
            node.g_val = g;
            node.h_val = h;
            node.key_val = Key::new(saturating_add(g, h), g);
            node.parent_p = Some(s);
        }
    }
}

/// One-shot forward search over a borrowed [`Graph`] (spec §6: `AStar(graph_ptr)`).
pub struct AStar<'g> {
    graph: &'g Graph,
    outcome: Option<OneShotOutcome>,
}

impl<'g> AStar<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        AStar {
            graph,
            outcome: None,
        }
    }

    /// Finds a path from `start` to `goal`; returns whether one exists.
    pub fn compute_shortest_path(&mut self, start: NodeId, goal: NodeId) -> bool {
        let outcome = run_one_shot(self.graph, start, goal, &AStarRelax);
        let found = outcome.found;
        self.outcome = Some(outcome);
        found
    }

    /// Path from goal back to start, empty if the last search failed.
    pub fn get_path(&self) -> Vec<Point> {
        self.outcome.as_ref().map(|o| o.path.clone()).unwrap_or_default()
    }

    pub fn get_expanded_nodes(&self) -> Vec<Point> {
        self.outcome
            .as_ref()
            .map(|o| o.expanded_nodes.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx_eq;
    use crate::graph::GraphNode;

    fn grid_graph(size: usize, blocked: &[(usize, usize)]) -> Graph {
        let blocked: std::collections::HashSet<_> = blocked.iter().copied().collect();
        let id_of = |x: usize, y: usize| y * size + x;
        let mut nodes = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let mut neighbor_ids = Vec::new();
                if !blocked.contains(&(x, y)) {
                    for dy in -1..=1_i64 {
                        for dx in -1..=1_i64 {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                            if nx >= 0 && ny >= 0 && (nx as usize) < size && (ny as usize) < size {
                                let (nx, ny) = (nx as usize, ny as usize);
                                if !blocked.contains(&(nx, ny)) {
                                    neighbor_ids.push(id_of(nx, ny));
                                }
                            }
                        }
                    }
                }
                nodes.push(GraphNode {
                    id: id_of(x, y),
                    point: Point::new(x as f64, y as f64),
                    neighbor_ids,
                });
            }
        }
        Graph::try_new(nodes).unwrap()
    }

    #[test]
    fn empty_3x3_diagonal_shortcut() {
        let graph = grid_graph(3, &[]);
        let mut astar = AStar::new(&graph);
        assert!(astar.compute_shortest_path(0, 8));
        assert_eq!(astar.get_path().len(), 3);
        let cost: f64 = astar
            .get_path()
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum();
        assert!(approx_eq(cost, 2.0 * 2.0_f64.sqrt()));
    }

    #[test]
    fn blocked_diagonal_routes_around() {
        let graph = grid_graph(3, &[(1, 1)]);
        let mut astar = AStar::new(&graph);
        assert!(astar.compute_shortest_path(0, 8));
        let path = astar.get_path();
        assert!(!path.iter().any(|p| *p == Point::new(1.0, 1.0)));
    }

    #[test]
    fn start_equals_goal_returns_singleton_path() {
        let graph = grid_graph(3, &[]);
        let mut astar = AStar::new(&graph);
        assert!(astar.compute_shortest_path(4, 4));
        assert_eq!(astar.get_path(), vec![Point::new(1.0, 1.0)]);
    }

    #[test]
    fn fully_blocked_goal_fails() {
        // Every neighbor of (2,2) is blocked, isolating the goal entirely.
        let graph = grid_graph(3, &[(1, 1), (1, 2), (2, 1)]);
        let goal = 2 * 3 + 2;
        let mut astar = AStar::new(&graph);
        assert!(!astar.compute_shortest_path(0, goal));
        assert!(astar.get_path().is_empty());
    }

    /// A* optimality law (spec §8): the returned path cost equals the
    /// minimum cost over all start->goal paths, checked by brute-force
    /// enumeration on a small graph.
    #[test]
    fn optimality_matches_brute_force_on_random_small_graphs() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let size = 4;
            let num_blocked = rng.gen_range(0..4);
            let mut blocked = Vec::new();
            for _ in 0..num_blocked {
                let x = rng.gen_range(1..size - 1);
                let y = rng.gen_range(1..size - 1);
                blocked.push((x, y));
            }
            let graph = grid_graph(size, &blocked);
            let start = 0;
            let goal = size * size - 1;
            let mut astar = AStar::new(&graph);
            let found = astar.compute_shortest_path(start, goal);
            let brute = brute_force_shortest(&graph, start, goal);
            assert_eq!(found, brute.is_some());
            if let (true, Some(expected)) = (found, brute) {
                let cost: f64 = astar
                    .get_path()
                    .windows(2)
                    .map(|w| w[0].distance(&w[1]))
                    .sum();
                assert!(approx_eq(cost, expected), "{cost} vs {expected}");
            }
        }
    }

    fn brute_force_shortest(graph: &Graph, start: NodeId, goal: NodeId) -> Option<f64> {
        use std::collections::BinaryHeap;
        #[derive(PartialEq)]
        struct Entry(f64, NodeId);
        impl Eq for Entry {}
        impl PartialOrd for Entry {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                other.0.partial_cmp(&self.0)
            }
        }
        impl Ord for Entry {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.partial_cmp(other).unwrap()
            }
        }
        let mut dist = vec![f64::INFINITY; graph.len()];
        dist[start] = 0.0;
        let mut heap = BinaryHeap::new();
        heap.push(Entry(0.0, start));
        while let Some(Entry(d, u)) = heap.pop() {
            if d > dist[u] {
                continue;
            }
            if u == goal {
                return Some(d);
            }
            for &v in graph.neighbors(u) {
                let nd = d + graph.point(u).distance(&graph.point(v));
                if nd < dist[v] {
                    dist[v] = nd;
                    heap.push(Entry(nd, v));
                }
            }
        }
        if dist[goal].is_finite() {
            Some(dist[goal])
        } else {
            None
        }
    }
}
