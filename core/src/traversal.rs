use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::Result;
use crate::graph::Graph;
use crate::model::UserId;

/// Breadth-first walk from `start`, returning usernames in visit order.
///
/// Each user is enqueued at most once; neighbours are expanded in
/// adjacency-list order, so the result is deterministic.
pub fn bfs(graph: &Graph, start: &str) -> Result<Vec<String>> {
    let start = graph.require(start)?;
    Ok(names(graph, bfs_order(graph, start)))
}

/// Depth-first walk from `start`, returning usernames in visit order.
///
/// Explicit stack, same order as the recursive form: a user is recorded on
/// entry and its neighbours are explored in adjacency order before
/// backtracking. Only the start's component is explored.
pub fn dfs(graph: &Graph, start: &str) -> Result<Vec<String>> {
    let start = graph.require(start)?;
    Ok(names(graph, dfs_order(graph, start)))
}

/// Unweighted hop count from `start` to every reachable user, in BFS order.
pub fn hop_distances(graph: &Graph, start: &str) -> Result<Vec<(String, u32)>> {
    let start = graph.require(start)?;
    let (order, dist) = bfs_with_depth(graph, start);
    Ok(order
        .into_iter()
        .map(|id| (graph.name_of(id).to_string(), dist[&id]))
        .collect())
}

pub(crate) fn bfs_order(graph: &Graph, start: UserId) -> Vec<UserId> {
    bfs_with_depth(graph, start).0
}

/// BFS with visited-set pruning; each user is reached at its minimum depth.
pub(crate) fn bfs_with_depth(graph: &Graph, start: UserId) -> (Vec<UserId>, HashMap<UserId, u32>) {
    let mut order = Vec::new();
    let mut depth: HashMap<UserId, u32> = HashMap::new();
    let mut queue: VecDeque<UserId> = VecDeque::new();

    depth.insert(start, 0);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        order.push(current);
        let d = depth[&current];
        for edge in graph.neighbors_out(current) {
            if !depth.contains_key(&edge.destination) {
                depth.insert(edge.destination, d + 1);
                queue.push_back(edge.destination);
            }
        }
    }

    (order, depth)
}

pub(crate) fn dfs_order(graph: &Graph, start: UserId) -> Vec<UserId> {
    let mut order = Vec::new();
    let mut visited: HashSet<UserId> = HashSet::new();
    let mut stack: Vec<UserId> = vec![start];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        order.push(current);
        // Reverse so the first neighbour is popped first
        for edge in graph.neighbors_out(current).iter().rev() {
            if !visited.contains(&edge.destination) {
                stack.push(edge.destination);
            }
        }
    }

    order
}

fn names(graph: &Graph, ids: Vec<UserId>) -> Vec<String> {
    ids.into_iter()
        .map(|id| graph.name_of(id).to_string())
        .collect()
}
