use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use social_graph_core::{
    analyze, bellman_ford_tree, bfs, degree_ranking, dfs, hop_distances, path_weight, DegreeEntry,
    DistanceEntry, Graph, GraphAnalysis, NewUser, PathAlgorithm, PathStep, UserProfile, Weight,
};

use crate::render;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Dijkstra,
    BellmanFord,
    Astar,
}

impl From<Algorithm> for PathAlgorithm {
    fn from(a: Algorithm) -> Self {
        match a {
            Algorithm::Dijkstra => PathAlgorithm::Dijkstra,
            Algorithm::BellmanFord => PathAlgorithm::BellmanFord,
            Algorithm::Astar => PathAlgorithm::AStar,
        }
    }
}

/// Operations on the loaded graph. Shared by one-shot invocations and the
/// interactive shell.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum GraphCommand {
    /// Register a new user
    AddUser {
        username: String,
        first_name: String,
        last_name: String,
        email: String,
    },
    /// Remove a user and every connection touching it
    RemoveUser { username: String },
    /// Replace a user's name and email
    UpdateUser {
        username: String,
        first_name: String,
        last_name: String,
        email: String,
    },
    /// Connect two users; non-positive weights become 1
    Connect {
        source: String,
        destination: String,
        /// Defaults to `[graph] default_weight`
        #[arg(allow_negative_numbers = true)]
        weight: Option<i64>,
    },
    /// Remove the connection between two users
    Disconnect { source: String, destination: String },
    /// Remove every connection of a user, keeping the user
    DeleteConnections { username: String },
    /// Number of registered users
    UserCount,
    /// Number of logical connections
    ConnectionCount,
    /// Check whether two users are directly connected
    IsConnected { source: String, destination: String },
    /// Breadth-first traversal order
    Bfs { start: String },
    /// Depth-first traversal order
    Dfs { start: String },
    /// Weighted shortest path between two users
    Path {
        start: String,
        goal: String,
        #[arg(long, short, value_enum, default_value_t = Algorithm::Dijkstra)]
        algorithm: Algorithm,
    },
    /// Weighted distance and predecessor of every user reachable from `start`
    Distances {
        start: String,
        /// Count hops instead of summing weights
        #[arg(long)]
        hops: bool,
    },
    /// List a user's connections with weights
    Connections { username: String },
    /// User count, connection count, average degree and diameter
    Analyze {
        /// Also list the N best-connected users (0 lists everyone)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Write the DOT file and render it with the layout command
    Export {
        #[arg(long, value_name = "FILE")]
        dot: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
        /// Only write the DOT file
        #[arg(long)]
        no_render: bool,
    },
    /// Print the adjacency listing
    List,
    /// Remove every connection, keeping the users
    ClearGraph,
    /// Remove every user and connection
    ClearUsers,
    /// Show a user's profile
    Show { username: String },
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionEntry {
    pub username: String,
    pub weight: Weight,
}

#[derive(Debug, Clone, Serialize)]
pub struct HopEntry {
    pub username: String,
    pub hops: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub analysis: GraphAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Vec<DegreeEntry>>,
}

/// Result of one command, rendered as text or JSON by the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Message(String),
    Count(usize),
    Flag(bool),
    Names(Vec<String>),
    Path(Option<Vec<PathStep>>),
    Distances(Vec<DistanceEntry>),
    Hops(Vec<HopEntry>),
    Connections(Vec<ConnectionEntry>),
    Profile(UserProfile),
    Analysis(AnalysisReport),
    Exit,
}

impl Reply {
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(self)?);
        }
        Ok(match self {
            Reply::Message(m) => m.clone(),
            Reply::Count(n) => n.to_string(),
            Reply::Flag(true) => "connected".to_string(),
            Reply::Flag(false) => "not connected".to_string(),
            Reply::Names(names) => names.join(" "),
            Reply::Path(None) => "no path".to_string(),
            Reply::Path(Some(steps)) => {
                let names: Vec<&str> = steps.iter().map(|s| s.username.as_str()).collect();
                format!("{} (weight {})", names.join(" -> "), path_weight(steps))
            }
            Reply::Distances(table) => table
                .iter()
                .map(|e| match &e.predecessor {
                    Some(p) => format!("{} {} (via {p})", e.username, e.distance),
                    None => format!("{} {}", e.username, e.distance),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Reply::Hops(list) => list
                .iter()
                .map(|e| format!("{} {}", e.username, e.hops))
                .collect::<Vec<_>>()
                .join("\n"),
            Reply::Connections(list) => list
                .iter()
                .map(|c| format!("{} ({})", c.username, c.weight))
                .collect::<Vec<_>>()
                .join("\n"),
            Reply::Profile(p) => p.to_string(),
            Reply::Analysis(report) => {
                let a = &report.analysis;
                let mut out = format!(
                    "Users: {}\nConnections: {}\nAverage degree: {:.2}\nDiameter: {}",
                    a.users, a.connections, a.average_degree, a.diameter
                );
                for entry in report.ranking.iter().flatten() {
                    out.push_str(&format!("\n  {:<16} {}", entry.username, entry.degree));
                }
                out
            }
            Reply::Exit => "bye".to_string(),
        })
    }
}

/// Apply one command to the graph.
///
/// # Errors
/// Graph errors (unknown users, duplicates, self-loops) and export I/O
/// failures. A failed layout render is reported in the reply instead.
pub fn execute(graph: &mut Graph, settings: &Settings, command: GraphCommand) -> Result<Reply> {
    let reply = match command {
        GraphCommand::AddUser { username, first_name, last_name, email } => {
            let id = graph.add_user(NewUser::new(username.as_str(), first_name, last_name, email))?;
            Reply::Message(format!("added {username} (id {id})"))
        }
        GraphCommand::RemoveUser { username } => {
            let profile = graph.remove_user(&username)?;
            Reply::Message(format!("removed {} (id {})", profile.username(), profile.id()))
        }
        GraphCommand::UpdateUser { username, first_name, last_name, email } => {
            graph.update_profile(&username, first_name, last_name, email)?;
            Reply::Message(format!("updated {username}"))
        }
        GraphCommand::Connect { source, destination, weight } => {
            let weight = match weight {
                Some(w) => graph.add_connection(&source, &destination, w)?,
                None => graph.add_connection_default(&source, &destination)?,
            };
            Reply::Message(format!("connected {source} and {destination} (weight {weight})"))
        }
        GraphCommand::Disconnect { source, destination } => {
            graph.remove_connection(&source, &destination)?;
            Reply::Message(format!("disconnected {source} and {destination}"))
        }
        GraphCommand::DeleteConnections { username } => {
            if !graph.contains_user(&username) {
                bail!("user not found: {username}");
            }
            let n = graph.delete_connections_of_user(&username);
            Reply::Message(format!("removed {n} connection(s) of {username}"))
        }
        GraphCommand::UserCount => Reply::Count(graph.user_count()),
        GraphCommand::ConnectionCount => Reply::Count(graph.connection_count()),
        GraphCommand::IsConnected { source, destination } => {
            Reply::Flag(graph.is_connected(&source, &destination))
        }
        GraphCommand::Bfs { start } => Reply::Names(bfs(graph, &start)?),
        GraphCommand::Dfs { start } => Reply::Names(dfs(graph, &start)?),
        GraphCommand::Path { start, goal, algorithm } => {
            Reply::Path(PathAlgorithm::from(algorithm).run(graph, &start, &goal)?)
        }
        GraphCommand::Distances { start, hops: false } => {
            Reply::Distances(bellman_ford_tree(graph, &start)?)
        }
        GraphCommand::Distances { start, hops: true } => Reply::Hops(
            hop_distances(graph, &start)?
                .into_iter()
                .map(|(username, hops)| HopEntry { username, hops })
                .collect(),
        ),
        GraphCommand::Connections { username } => {
            let list = graph
                .connections_of(&username)?
                .iter()
                .filter_map(|c| {
                    graph.user_by_id(c.destination).map(|u| ConnectionEntry {
                        username: u.username().to_string(),
                        weight: c.weight,
                    })
                })
                .collect();
            Reply::Connections(list)
        }
        GraphCommand::Analyze { top } => Reply::Analysis(AnalysisReport {
            analysis: analyze(graph),
            ranking: top.map(|n| degree_ranking(graph, n)),
        }),
        GraphCommand::Export { dot, image, no_render } => {
            let dot = dot.unwrap_or_else(|| settings.dot_file.clone());
            render::export_dot(graph, &dot)?;
            if no_render {
                Reply::Message(format!("wrote {}", dot.display()))
            } else {
                let image = image.unwrap_or_else(|| settings.image_file.clone());
                match render::render_image(&settings.layout_command, &dot, &image) {
                    Ok(()) => Reply::Message(format!("wrote {} and {}", dot.display(), image.display())),
                    Err(e) => Reply::Message(format!(
                        "wrote {}; rendering failed: {e:#}",
                        dot.display()
                    )),
                }
            }
        }
        GraphCommand::List => {
            let text = graph.to_string();
            Reply::Message(text.trim_end().to_string())
        }
        GraphCommand::ClearGraph => {
            graph.clear_connections();
            Reply::Message("all connections removed".to_string())
        }
        GraphCommand::ClearUsers => {
            graph.clear();
            Reply::Message("all users removed".to_string())
        }
        GraphCommand::Show { username } => match graph.user(&username) {
            Some(profile) => Reply::Profile(profile.clone()),
            None => bail!("user not found: {username}"),
        },
        GraphCommand::Exit => Reply::Exit,
    };
    Ok(reply)
}
