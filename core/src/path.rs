use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::model::{normalize_weight, UserId, UserProfile, Weight};

/// A single step in a weighted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub user_id: UserId,
    pub username: String,
    /// Weight of the edge used to reach this step. None for the start.
    pub edge_weight: Option<Weight>,
    /// Accumulated weight from the start up to and including this step.
    pub distance: u64,
}

/// Flatten a path into its username sequence.
pub fn path_names(path: &[PathStep]) -> Vec<String> {
    path.iter().map(|s| s.username.clone()).collect()
}

/// Total weight of a path (0 for an empty or single-step path).
pub fn path_weight(path: &[PathStep]) -> u64 {
    path.last().map_or(0, |s| s.distance)
}

/// Which shortest-path strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAlgorithm {
    Dijkstra,
    BellmanFord,
    /// A* with the [`IdDistance`] heuristic.
    AStar,
}

impl PathAlgorithm {
    pub fn run(self, graph: &Graph, start: &str, goal: &str) -> Result<Option<Vec<PathStep>>> {
        match self {
            PathAlgorithm::Dijkstra => dijkstra(graph, start, goal),
            PathAlgorithm::BellmanFord => bellman_ford(graph, start, goal),
            PathAlgorithm::AStar => astar(graph, start, goal, &IdDistance),
        }
    }
}

// ---------------------------------------------------------------------------
// Dijkstra
// ---------------------------------------------------------------------------

/// Weighted shortest path from `start` to `goal` using Dijkstra's algorithm.
///
/// Returns `Ok(None)` when `goal` is unreachable, `Err(UserNotFound)` when
/// either endpoint is unknown. Equal distances are settled in discovery order.
pub fn dijkstra(graph: &Graph, start: &str, goal: &str) -> Result<Option<Vec<PathStep>>> {
    let (start, goal) = endpoints(graph, start, goal)?;

    let mut dist: HashMap<UserId, u64> = HashMap::new();
    let mut parent: HashMap<UserId, (UserId, Weight)> = HashMap::new();
    let mut settled: HashSet<UserId> = HashSet::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    dist.insert(start, 0);
    heap.push(Reverse((0u64, seq, start)));

    while let Some(Reverse((d, _, current))) = heap.pop() {
        if !settled.insert(current) {
            continue;
        }
        if current == goal {
            return Ok(Some(reconstruct_path(graph, &parent, start, goal)));
        }

        for edge in graph.neighbors_out(current) {
            let next = d + u64::from(edge.weight);
            if dist.get(&edge.destination).map_or(true, |&old| next < old) {
                dist.insert(edge.destination, next);
                parent.insert(edge.destination, (current, edge.weight));
                seq += 1;
                heap.push(Reverse((next, seq, edge.destination)));
            }
        }
    }

    Ok(None)
}

// ---------------------------------------------------------------------------
// Bellman-Ford
// ---------------------------------------------------------------------------

/// One row of a single-source shortest-path table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceEntry {
    pub username: String,
    pub distance: u64,
    /// None for the source itself.
    pub predecessor: Option<String>,
}

/// Weighted shortest path from `start` to `goal` using Bellman-Ford.
pub fn bellman_ford(graph: &Graph, start: &str, goal: &str) -> Result<Option<Vec<PathStep>>> {
    let (start, goal) = endpoints(graph, start, goal)?;
    let relaxed = relax_graph(graph, start)?;

    if !relaxed.dist.contains_key(&goal) {
        return Ok(None);
    }
    let parent = positive_parents(relaxed.parent);
    Ok(Some(reconstruct_path(graph, &parent, start, goal)))
}

/// Distance and predecessor of every user reachable from `start`, in
/// identifier order.
pub fn bellman_ford_tree(graph: &Graph, start: &str) -> Result<Vec<DistanceEntry>> {
    let start = graph.require(start)?;
    let relaxed = relax_graph(graph, start)?;

    Ok(graph
        .user_ids()
        .filter_map(|id| {
            let &d = relaxed.dist.get(&id)?;
            Some(DistanceEntry {
                username: graph.name_of(id).to_string(),
                distance: d.max(0) as u64,
                predecessor: relaxed
                    .parent
                    .get(&id)
                    .map(|&(p, _)| graph.name_of(p).to_string()),
            })
        })
        .collect())
}

fn relax_graph(graph: &Graph, start: UserId) -> Result<Relaxed> {
    let nodes: Vec<UserId> = graph.user_ids().collect();
    let edges: Vec<(UserId, UserId, i64)> = nodes
        .iter()
        .flat_map(|&id| graph.neighbors_out(id).iter())
        .map(|c| (c.source, c.destination, i64::from(c.weight)))
        .collect();
    relax_edges(nodes.len(), &edges, start)
}

/// Output of Bellman-Ford relaxation over signed weights.
#[derive(Debug)]
struct Relaxed {
    dist: HashMap<UserId, i64>,
    parent: HashMap<UserId, (UserId, i64)>,
}

/// Relax every edge up to `node_count - 1` times, then run one more pass to
/// detect a negative-weight cycle reachable from `start`.
///
/// Takes signed weights so the cycle check can be exercised; registry weights
/// are always positive.
fn relax_edges(node_count: usize, edges: &[(UserId, UserId, i64)], start: UserId) -> Result<Relaxed> {
    let mut dist: HashMap<UserId, i64> = HashMap::new();
    let mut parent: HashMap<UserId, (UserId, i64)> = HashMap::new();
    dist.insert(start, 0);

    for _ in 1..node_count.max(1) {
        let mut changed = false;
        for &(u, v, w) in edges {
            let Some(&du) = dist.get(&u) else { continue };
            let candidate = du + w;
            if dist.get(&v).map_or(true, |&dv| candidate < dv) {
                dist.insert(v, candidate);
                parent.insert(v, (u, w));
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    for &(u, v, w) in edges {
        let Some(&du) = dist.get(&u) else { continue };
        if dist.get(&v).map_or(true, |&dv| du + w < dv) {
            tracing::warn!(from = u, to = v, weight = w, "negative weight cycle detected");
            return Err(GraphError::NegativeCycle);
        }
    }

    Ok(Relaxed { dist, parent })
}

fn positive_parents(parent: HashMap<UserId, (UserId, i64)>) -> HashMap<UserId, (UserId, Weight)> {
    parent
        .into_iter()
        .map(|(id, (p, w))| (id, (p, normalize_weight(w))))
        .collect()
}

// ---------------------------------------------------------------------------
// A*
// ---------------------------------------------------------------------------

/// Estimated remaining cost from `current` to `goal`.
///
/// A* returns an optimal path only if the estimate never exceeds the true
/// remaining cost (admissible). Consistency is not required: a node reached
/// again at a lower cost is expanded again.
pub trait Heuristic {
    fn estimate(&self, current: &UserProfile, goal: &UserProfile) -> u64;
}

impl<F> Heuristic for F
where
    F: Fn(&UserProfile, &UserProfile) -> u64,
{
    fn estimate(&self, current: &UserProfile, goal: &UserProfile) -> u64 {
        self(current, goal)
    }
}

/// Absolute difference of user identifiers.
///
/// Admissible only when identifier order correlates with path cost, which
/// nothing in the registry guarantees. On other graphs A* may return a
/// longer path than Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdDistance;

impl Heuristic for IdDistance {
    fn estimate(&self, current: &UserProfile, goal: &UserProfile) -> u64 {
        current.id().abs_diff(goal.id())
    }
}

/// Always 0. Admissible on every graph; A* then behaves like Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _current: &UserProfile, _goal: &UserProfile) -> u64 {
        0
    }
}

/// Best-first search ordered by `cost so far + heuristic(node, goal)`.
///
/// Optimal for any admissible heuristic. Ties on priority are settled in
/// discovery order.
pub fn astar<H>(graph: &Graph, start: &str, goal: &str, heuristic: &H) -> Result<Option<Vec<PathStep>>>
where
    H: Heuristic + ?Sized,
{
    let (start, goal) = endpoints(graph, start, goal)?;
    let Some(goal_profile) = graph.user_by_id(goal) else {
        return Ok(None);
    };
    let estimate = |id: UserId| {
        graph
            .user_by_id(id)
            .map_or(0, |p| heuristic.estimate(p, goal_profile))
    };

    let mut g_score: HashMap<UserId, u64> = HashMap::new();
    let mut parent: HashMap<UserId, (UserId, Weight)> = HashMap::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0);
    open.push(Reverse((estimate(start), seq, 0u64, start)));

    while let Some(Reverse((_, _, g, current))) = open.pop() {
        // Stale: a cheaper route to `current` was queued after this entry
        if g_score.get(&current).is_some_and(|&best| g > best) {
            continue;
        }
        if current == goal {
            return Ok(Some(reconstruct_path(graph, &parent, start, goal)));
        }

        for edge in graph.neighbors_out(current) {
            let neighbor = edge.destination;
            let tentative = g + u64::from(edge.weight);
            if g_score.get(&neighbor).map_or(true, |&old| tentative < old) {
                g_score.insert(neighbor, tentative);
                parent.insert(neighbor, (current, edge.weight));
                seq += 1;
                open.push(Reverse((tentative + estimate(neighbor), seq, tentative, neighbor)));
            }
        }
    }

    Ok(None)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn endpoints(graph: &Graph, start: &str, goal: &str) -> Result<(UserId, UserId)> {
    Ok((graph.require(start)?, graph.require(goal)?))
}

/// Walk parent pointers from `goal` back to `start`, then accumulate
/// distances forward.
fn reconstruct_path(
    graph: &Graph,
    parent: &HashMap<UserId, (UserId, Weight)>,
    start: UserId,
    goal: UserId,
) -> Vec<PathStep> {
    let mut hops: Vec<(UserId, Option<Weight>)> = Vec::new();
    let mut current = goal;

    while current != start {
        let &(prev, weight) = &parent[&current];
        hops.push((current, Some(weight)));
        current = prev;
    }
    hops.push((start, None));
    hops.reverse();

    let mut distance = 0u64;
    hops.into_iter()
        .map(|(id, edge_weight)| {
            distance += edge_weight.map_or(0, u64::from);
            PathStep {
                user_id: id,
                username: graph.name_of(id).to_string(),
                edge_weight,
                distance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewUser;

    fn graph(names: &[&str], edges: &[(&str, &str, i64)]) -> Graph {
        let mut g = Graph::new();
        for n in names {
            g.add_user(NewUser::new(*n, "F", "L", "e@x")).unwrap();
        }
        for (a, b, w) in edges {
            g.add_connection(a, b, *w).unwrap();
        }
        g
    }

    /// A–B(1), B–C(1), A–C(4), C–D(1)
    fn diamond() -> Graph {
        graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 1), ("B", "C", 1), ("A", "C", 4), ("C", "D", 1)],
        )
    }

    fn all_algorithms(g: &Graph, s: &str, t: &str) -> Vec<Result<Option<Vec<PathStep>>>> {
        vec![
            dijkstra(g, s, t),
            bellman_ford(g, s, t),
            astar(g, s, t, &IdDistance),
            astar(g, s, t, &ZeroHeuristic),
        ]
    }

    // --- Dijkstra ---

    #[test]
    fn test_dijkstra_prefers_lighter_longer_path() {
        let g = diamond();
        let path = dijkstra(&g, "A", "D").unwrap().unwrap();
        assert_eq!(path_names(&path), vec!["A", "B", "C", "D"]);
        assert_eq!(path_weight(&path), 3);
        assert_eq!(path[0].edge_weight, None);
        assert_eq!(path[0].distance, 0);
        assert_eq!(path[2].edge_weight, Some(1));
        assert_eq!(path[2].distance, 2);
    }

    #[test]
    fn test_dijkstra_tie_broken_by_discovery_order() {
        // Two equal-weight routes a-b-d and a-c-d; b is discovered first.
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b", 1), ("a", "c", 1), ("b", "d", 1), ("c", "d", 1)],
        );
        let path = dijkstra(&g, "a", "d").unwrap().unwrap();
        assert_eq!(path_names(&path), vec!["a", "b", "d"]);
    }

    // --- Shared contract ---

    #[test]
    fn test_all_algorithms_agree_on_diamond() {
        let g = diamond();
        for result in all_algorithms(&g, "A", "D") {
            let path = result.unwrap().unwrap();
            assert_eq!(path_names(&path), vec!["A", "B", "C", "D"]);
            assert_eq!(path_weight(&path), 3);
        }
    }

    #[test]
    fn test_disconnected_components_have_no_path() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B", 1), ("C", "D", 1)]);
        for result in all_algorithms(&g, "A", "C") {
            assert_eq!(result, Ok(None));
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let g = diamond();
        for result in all_algorithms(&g, "B", "B") {
            let path = result.unwrap().unwrap();
            assert_eq!(path_names(&path), vec!["B"]);
            assert_eq!(path_weight(&path), 0);
        }
    }

    #[test]
    fn test_unknown_endpoints() {
        let g = diamond();
        for result in all_algorithms(&g, "A", "Z") {
            assert_eq!(result, Err(GraphError::UserNotFound("Z".to_string())));
        }
        for result in all_algorithms(&g, "Y", "A") {
            assert_eq!(result, Err(GraphError::UserNotFound("Y".to_string())));
        }
    }

    #[test]
    fn test_path_algorithm_dispatch() {
        let g = diamond();
        for algo in [
            PathAlgorithm::Dijkstra,
            PathAlgorithm::BellmanFord,
            PathAlgorithm::AStar,
        ] {
            let path = algo.run(&g, "A", "D").unwrap().unwrap();
            assert_eq!(path_weight(&path), 3, "{algo:?}");
        }
    }

    // --- Bellman-Ford ---

    #[test]
    fn test_bellman_ford_tree() {
        let g = diamond();
        let tree = bellman_ford_tree(&g, "A").unwrap();
        let names: Vec<&str> = tree.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(tree[0].predecessor, None);
        assert_eq!(tree[2].distance, 2);
        assert_eq!(tree[2].predecessor.as_deref(), Some("B"));
        assert_eq!(tree[3].distance, 3);
    }

    #[test]
    fn test_bellman_ford_tree_omits_unreachable() {
        let g = graph(&["A", "B", "C"], &[("A", "B", 2)]);
        let tree = bellman_ford_tree(&g, "A").unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|e| e.username != "C"));
    }

    #[test]
    fn test_relax_negative_edge_without_cycle() {
        // Directed: 1→2 (4), 1→3 (1), 3→2 (-2)
        let edges: [(UserId, UserId, i64); 3] = [(1, 2, 4), (1, 3, 1), (3, 2, -2)];
        let relaxed = relax_edges(3, &edges, 1).unwrap();
        assert_eq!(relaxed.dist[&2], -1);
        assert_eq!(relaxed.parent[&2], (3, -2));
    }

    #[test]
    fn test_relax_detects_negative_cycle() {
        // 2→3→2 sums to -1
        let edges: [(UserId, UserId, i64); 3] = [(1, 2, 1), (2, 3, -2), (3, 2, 1)];
        assert_eq!(relax_edges(3, &edges, 1).unwrap_err(), GraphError::NegativeCycle);
    }

    #[test]
    fn test_relax_ignores_unreachable_negative_cycle() {
        let edges: [(UserId, UserId, i64); 3] = [(1, 2, 1), (3, 4, -5), (4, 3, 1)];
        let relaxed = relax_edges(4, &edges, 1).unwrap();
        assert!(!relaxed.dist.contains_key(&3));
    }

    // --- A* ---

    #[test]
    fn test_astar_closure_heuristic() {
        let g = diamond();
        let calls = std::cell::Cell::new(0);
        let h = |_: &UserProfile, _: &UserProfile| -> u64 {
            calls.set(calls.get() + 1);
            0
        };
        let path = astar(&g, "A", "D", &h).unwrap().unwrap();
        assert_eq!(path_weight(&path), 3);
        assert!(calls.get() > 0);
    }

    #[test]
    fn test_astar_inadmissible_heuristic_may_miss_optimum() {
        // Heuristic that strongly overestimates through B steers A* to A-C-D.
        let g = diamond();
        let b_id = g.user("B").unwrap().id();
        let h = move |u: &UserProfile, _: &UserProfile| -> u64 {
            if u.id() == b_id {
                100
            } else {
                0
            }
        };
        let path = astar(&g, "A", "D", &h).unwrap().unwrap();
        assert_eq!(path_names(&path), vec!["A", "C", "D"]);
        assert_eq!(path_weight(&path), 5);
    }

    #[test]
    fn test_astar_admissible_inconsistent_heuristic_stays_optimal() {
        // h(Y)=4 never overestimates (Y is 11 from G) but breaks
        // consistency across S-Y, so X is first reached via the heavy edge.
        let g = graph(
            &["S", "X", "Y", "G"],
            &[("S", "X", 4), ("S", "Y", 1), ("Y", "X", 1), ("X", "G", 10)],
        );
        let h = |u: &UserProfile, _: &UserProfile| -> u64 {
            if u.username() == "Y" {
                4
            } else {
                0
            }
        };
        let by_astar = astar(&g, "S", "G", &h).unwrap().unwrap();
        let by_dijkstra = dijkstra(&g, "S", "G").unwrap().unwrap();

        assert_eq!(path_names(&by_astar), vec!["S", "Y", "X", "G"]);
        assert_eq!(path_weight(&by_astar), 12);
        assert_eq!(by_astar, by_dijkstra);
    }

    #[test]
    fn test_id_distance() {
        let g = diamond();
        let a = g.user("A").unwrap();
        let d = g.user("D").unwrap();
        assert_eq!(IdDistance.estimate(a, d), 3);
        assert_eq!(IdDistance.estimate(d, a), 3);
        assert_eq!(ZeroHeuristic.estimate(a, d), 0);
    }
}
