use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use social_graph_core::{Graph, NewUser};

use crate::settings::Settings;

/// Counts from one ingestion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub users_added: usize,
    pub users_skipped: usize,
    pub connections_added: usize,
    pub connections_skipped: usize,
}

/// Parse `username firstname lastname email`. Any other field count is malformed.
pub fn parse_user_line(line: &str) -> Option<NewUser> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [username, first, last, email] => Some(NewUser::new(*username, *first, *last, *email)),
        _ => None,
    }
}

/// Parse `source destination weight`.
pub fn parse_connection_line(line: &str) -> Option<(String, String, i64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [source, destination, weight] => {
            let weight = weight.parse().ok()?;
            Some((source.to_string(), destination.to_string(), weight))
        }
        _ => None,
    }
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Add every well-formed user record; malformed lines and rejected users are
/// counted as skipped.
pub fn load_users<R: BufRead>(graph: &mut Graph, reader: R, report: &mut LoadReport) -> io::Result<()> {
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if is_blank_or_comment(&line) {
            continue;
        }
        let Some(user) = parse_user_line(&line) else {
            tracing::warn!(line = lineno + 1, "skipping malformed user record");
            report.users_skipped += 1;
            continue;
        };
        match graph.add_user(user) {
            Ok(_) => report.users_added += 1,
            Err(e) => {
                tracing::warn!(line = lineno + 1, error = %e, "user record rejected");
                report.users_skipped += 1;
            }
        }
    }
    Ok(())
}

/// Add every well-formed connection whose endpoints are already registered.
pub fn load_connections<R: BufRead>(
    graph: &mut Graph,
    reader: R,
    report: &mut LoadReport,
) -> io::Result<()> {
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if is_blank_or_comment(&line) {
            continue;
        }
        let Some((source, destination, weight)) = parse_connection_line(&line) else {
            tracing::warn!(line = lineno + 1, "skipping malformed connection record");
            report.connections_skipped += 1;
            continue;
        };
        match graph.add_connection(&source, &destination, weight) {
            Ok(_) => report.connections_added += 1,
            Err(e) => {
                tracing::warn!(line = lineno + 1, error = %e, "connection record dropped");
                report.connections_skipped += 1;
            }
        }
    }
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Load the users file, then the connections file, from settings.
pub fn load_from_settings(graph: &mut Graph, settings: &Settings) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    if let Some(path) = &settings.users_file {
        load_users(graph, open(path)?, &mut report)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    if let Some(path) = &settings.connections_file {
        load_connections(graph, open(path)?, &mut report)
            .with_context(|| format!("reading {}", path.display()))?;
    }

    tracing::info!(
        users = report.users_added,
        users_skipped = report.users_skipped,
        connections = report.connections_added,
        connections_skipped = report.connections_skipped,
        "graph loaded"
    );
    Ok(report)
}
