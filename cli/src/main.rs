use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use social_graph_cli::{execute, load_from_settings, shell, GraphCommand, Settings};
use social_graph_core::Graph;
use tracing::Level;

#[derive(Parser)]
#[command(name = "social-graph", version, about = "Query and edit a weighted social graph")]
struct Cli {
    /// Settings file (defaults to ./social-graph.toml when present)
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Users file, overriding `users_file`
    #[arg(long, value_name = "FILE")]
    users: Option<PathBuf>,
    /// Connections file, overriding `connections_file`
    #[arg(long, value_name = "FILE")]
    connections: Option<PathBuf>,
    /// Layout program, overriding `layout_command`
    #[arg(long, value_name = "PROGRAM")]
    layout: Option<String>,
    /// Print replies as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Log mutations and skipped records at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<TopLevel>,
}

#[derive(clap::Subcommand)]
enum TopLevel {
    /// Read one command per line from stdin (the default)
    Shell,
    #[command(flatten)]
    Graph(GraphCommand),
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.users.is_some() {
        settings.users_file = cli.users;
    }
    if cli.connections.is_some() {
        settings.connections_file = cli.connections;
    }
    if let Some(layout) = cli.layout {
        settings.layout_command = layout;
    }

    let mut graph = Graph::with_config(settings.graph);
    let report = load_from_settings(&mut graph, &settings)?;
    if report.users_skipped + report.connections_skipped > 0 {
        eprintln!(
            "skipped {} user record(s) and {} connection record(s)",
            report.users_skipped, report.connections_skipped
        );
    }

    match cli.command.unwrap_or(TopLevel::Shell) {
        TopLevel::Shell => {
            let stdin = io::stdin();
            shell::run(&mut graph, &settings, cli.json, stdin.lock(), io::stdout(), io::stderr())?;
        }
        TopLevel::Graph(command) => {
            let reply = execute(&mut graph, &settings, command)?;
            println!("{}", reply.render(cli.json)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };
    init_tracing(cli.verbose);

    // Errors are reported, never turned into a failing exit status
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
    }
}
