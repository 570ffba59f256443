use std::collections::HashSet;
use std::io;

use crate::graph::Graph;

const HEADER: &str = "graph G {
  graph [splines=true, overlap=false];
  node [style=filled, fillcolor=\"#f0f0f0\", shape=ellipse, fontcolor=black, fontsize=16];
  edge [fontcolor=\"black\", fontsize=12, color=\"#3366ff\", penwidth=3];
";

/// Render the graph as Graphviz DOT text.
///
/// One statement per user (identifier order), then one statement per logical
/// edge with the lexicographically smaller username first and the weight as
/// its label.
pub fn to_dot(graph: &Graph) -> String {
    let mut out = String::from(HEADER);

    for user in graph.users() {
        out.push_str(&format!("  {};\n", quote(user.username())));
    }

    let mut emitted: HashSet<(&str, &str)> = HashSet::new();
    for user in graph.users() {
        for edge in graph.neighbors_out(user.id()) {
            let a = user.username();
            let b = graph.name_of(edge.destination);
            let key = if a <= b { (a, b) } else { (b, a) };
            if emitted.insert(key) {
                out.push_str(&format!(
                    "  {} -- {} [label=\"{}\"];\n",
                    quote(key.0),
                    quote(key.1),
                    edge.weight
                ));
            }
        }
    }

    out.push_str("}\n");
    out
}

/// Write the DOT rendering to any writer.
pub fn write_dot<W: io::Write>(graph: &Graph, mut writer: W) -> io::Result<()> {
    writer.write_all(to_dot(graph).as_bytes())?;
    writer.flush()
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}
