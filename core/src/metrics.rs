use serde::Serialize;

use crate::graph::Graph;
use crate::model::UserId;
use crate::traversal::bfs_with_depth;

/// Degree information for a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeEntry {
    pub user_id: UserId,
    pub username: String,
    pub degree: u32,
}

/// Aggregate figures backing the "graph analysis" command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphAnalysis {
    pub users: usize,
    pub connections: usize,
    pub average_degree: f64,
    pub diameter: i64,
}

/// Directed edge records per user. 0.0 for an empty graph.
pub fn average_degree(graph: &Graph) -> f64 {
    if graph.user_count() == 0 {
        return 0.0;
    }
    graph.directed_edge_count() as f64 / graph.user_count() as f64
}

/// Longest shortest-hop distance between any two connected users.
///
/// Unreachable pairs are ignored. Returns -1 for an empty graph and 0 for a
/// graph with no edges.
pub fn diameter(graph: &Graph) -> i64 {
    if graph.user_count() == 0 {
        return -1;
    }
    graph
        .user_ids()
        .map(|id| {
            let (_, depth) = bfs_with_depth(graph, id);
            depth.values().copied().max().unwrap_or(0)
        })
        .max()
        .map_or(0, i64::from)
}

/// Users ranked by degree.
///
/// If `top_n` is 0, returns all users. Otherwise returns the top N by degree
/// (descending). Ties are broken by user id (ascending).
pub fn degree_ranking(graph: &Graph, top_n: usize) -> Vec<DegreeEntry> {
    let mut results: Vec<DegreeEntry> = graph
        .users()
        .map(|u| DegreeEntry {
            user_id: u.id(),
            username: u.username().to_string(),
            degree: graph.neighbors_out(u.id()).len() as u32,
        })
        .collect();

    results.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.user_id.cmp(&b.user_id)));

    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }

    results
}

pub fn analyze(graph: &Graph) -> GraphAnalysis {
    GraphAnalysis {
        users: graph.user_count(),
        connections: graph.connection_count(),
        average_degree: average_degree(graph),
        diameter: diameter(graph),
    }
}
