//! Theta*: A* with line-of-sight parent smoothing for any-angle paths
//! (spec §4.5).

use crate::base::{run_one_shot, ComputeCost, OneShotContext, OneShotOutcome};
use crate::collision::{has_line_of_sight, Polygon};
use crate::geometry::{Point, BIG_NUM};
use crate::graph::{Graph, NodeId};
use crate::key::Key;

/// `ComputeCost(s, s')` for Theta* (spec §4.5): prefer adopting `s`'s
/// parent directly (grandparent adoption) when there is a clear line of
/// sight from it to `s'` and doing so is cheaper; otherwise fall back to
/// the plain A* relaxation.
pub struct ThetaStarRelax<'o> {
    pub obstacles: &'o [Polygon],
    pub buffer_radius: f64,
}

impl ComputeCost for ThetaStarRelax<'_> {
    fn compute_cost(&self, ctx: &mut OneShotContext<'_>, s: NodeId, s_prime: NodeId) {
        let current_k1 = ctx
            .store
            .get(s_prime)
            .map(|n| n.key_val.k1)
            .unwrap_or(BIG_NUM);

        if let Some(parent) = ctx.store.get(s).and_then(|n| n.parent_p) {
            let sight_clear = has_line_of_sight(
                ctx.graph.point(parent),
                ctx.graph.point(s_prime),
                self.obstacles,
                self.buffer_radius,
            );
            if sight_clear {
                let (f, g, h) = ctx.f_via(parent, s_prime);
                if f < current_k1 {
                    apply(ctx, s_prime, parent, f, g, h);
                    return;
                }
            }
        }

        let (f, g, h) = ctx.f_via(s, s_prime);
        if f < current_k1 {
            apply(ctx, s_prime, s, f, g, h);
        }
    }
}

fn apply(ctx: &mut OneShotContext<'_>, s_prime: NodeId, parent: NodeId, f: f64, g: f64, h: f64) {
    let node = ctx.store.get_mut(s_prime).expect("ensured before relaxation");
    node.g_val = g;
    node.h_val = h;
    node.key_val = Key::new(f, g);
    node.parent_p = Some(parent);
}

/// Any-angle search over a borrowed [`Graph`] plus the obstacle set Theta*
/// needs for its line-of-sight check (spec §6: `ThetaStar(graph_ptr, map,
/// buffer_radius)`).
pub struct ThetaStar<'g> {
    graph: &'g Graph,
    obstacles: Vec<Polygon>,
    buffer_radius: f64,
    outcome: Option<OneShotOutcome>,
}

impl<'g> ThetaStar<'g> {
    pub fn new(graph: &'g Graph, obstacles: Vec<Polygon>, buffer_radius: f64) -> Self {
        ThetaStar {
            graph,
            obstacles,
            buffer_radius,
            outcome: None,
        }
    }

    pub fn compute_shortest_path(&mut self, start: NodeId, goal: NodeId) -> bool {
        let relax = ThetaStarRelax {
            obstacles: &self.obstacles,
            buffer_radius: self.buffer_radius,
        };
        let outcome = run_one_shot(self.graph, start, goal, &relax);
        let found = outcome.found;
        self.outcome = Some(outcome);
        found
    }

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
    use crate::astar::AStar;
    use crate::graph::GraphNode;

    fn grid_graph(size: usize) -> Graph {
        let id_of = |x: usize, y: usize| y * size + x;
        let mut nodes = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let mut neighbor_ids = Vec::new();
                for dy in -1..=1_i64 {
                    for dx in -1..=1_i64 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                        if nx >= 0 && ny >= 0 && (nx as usize) < size && (ny as usize) < size {
                            neighbor_ids.push(id_of(nx as usize, ny as usize));
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

    fn path_cost(path: &[Point]) -> f64 {
        path.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Theta* dominance law (spec §8): on a map with a line-of-sight
    /// shortcut around a blocky obstacle, Theta*'s path is no longer than
    /// A*'s grid-constrained one.
    #[test]
    fn theta_star_dominates_a_star_around_an_obstacle() {
        let size = 10;
        let graph = grid_graph(size);
        let obstacles = vec![Polygon::new(Point::new(3.0, 3.0), Point::new(6.0, 6.0))];

        // Build an A*-equivalent graph that statically excludes edges
        // crossing the obstacle footprint, so both searches avoid it.
        let blocked: std::collections::HashSet<(usize, usize)> = (3..=6)
            .flat_map(|x| (3..=6).map(move |y| (x, y)))
            .collect();
        let id_of = |x: usize, y: usize| y * size + x;
        let mut astar_nodes = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let neighbor_ids = if blocked.contains(&(x, y)) {
                    Vec::new()
                } else {
                    graph
                        .neighbors(id_of(x, y))
                        .iter()
                        .copied()
                        .filter(|&n| {
                            let (nx, ny) = (n % size, n / size);
                            !blocked.contains(&(nx, ny))
                        })
                        .collect()
                };
                astar_nodes.push(GraphNode {
                    id: id_of(x, y),
                    point: Point::new(x as f64, y as f64),
                    neighbor_ids,
                });
            }
        }
        let astar_graph = Graph::try_new(astar_nodes).unwrap();

        let start = id_of(0, 0);
        let goal = id_of(9, 9);

        let mut astar = AStar::new(&astar_graph);
        assert!(astar.compute_shortest_path(start, goal));
        let astar_cost = path_cost(&astar.get_path());

        let mut theta = ThetaStar::new(&graph, obstacles, 0.0);
        assert!(theta.compute_shortest_path(start, goal));
        let theta_cost = path_cost(&theta.get_path());

        assert!(theta_cost <= astar_cost + 1e-9, "{theta_cost} vs {astar_cost}");
        assert!(theta.get_path().len() <= 4);
    }

    #[test]
    fn start_equals_goal_returns_singleton_path() {
        let graph = grid_graph(3);
        let mut theta = ThetaStar::new(&graph, Vec::new(), 0.0);
        assert!(theta.compute_shortest_path(4, 4));
        assert_eq!(theta.get_path(), vec![Point::new(1.0, 1.0)]);
    }
}
