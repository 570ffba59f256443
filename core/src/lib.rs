//! social-graph-core: In-memory social graph engine.
//!
//! A pure Rust library that keeps a registry of user profiles and an
//! adjacency list of weighted, logically undirected connections, and answers
//! traversal, shortest path and metric queries over it.
//! No I/O surface: ingestion, rendering and the command loop live in the
//! `social-graph-cli` crate.

mod config;
mod error;
mod export;
mod graph;
mod metrics;
mod model;
mod path;
mod traversal;

pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use export::{to_dot, write_dot};
pub use graph::Graph;
pub use metrics::{analyze, average_degree, degree_ranking, diameter, DegreeEntry, GraphAnalysis};
pub use model::{normalize_weight, Connection, NewUser, UserId, UserProfile, Weight};
pub use path::{
    astar, bellman_ford, bellman_ford_tree, dijkstra, path_names, path_weight, DistanceEntry,
    Heuristic, IdDistance, PathAlgorithm, PathStep, ZeroHeuristic,
};
pub use traversal::{bfs, dfs, hop_distances};
