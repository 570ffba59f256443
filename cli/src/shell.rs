use std::io::{self, BufRead, Write};

use clap::Parser;
use social_graph_core::Graph;

use crate::commands::{execute, GraphCommand};
use crate::settings::Settings;

pub const PROMPT: &str = "social-graph> ";

/// One shell line, parsed with the same grammar as the one-shot subcommands.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "social-graph", disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: GraphCommand,
}

/// Parse one line of shell input. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<GraphCommand>, clap::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    ShellLine::try_parse_from(line.split_whitespace()).map(|l| Some(l.command))
}

/// Read commands from `input` until `exit` or end of input.
///
/// Replies go to `out`, errors to `err`; neither ends the session.
pub fn run<R, W, E>(
    graph: &mut Graph,
    settings: &Settings,
    json: bool,
    input: R,
    mut out: W,
    mut err: E,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(GraphCommand::Exit)) => return Ok(()),
            Ok(Some(command)) => match execute(graph, settings, command).and_then(|r| r.render(json)) {
                Ok(text) => writeln!(out, "{text}")?,
                Err(e) => writeln!(err, "error: {e:#}")?,
            },
            // Includes `help`, which clap reports through the error path
            Err(e) => write!(err, "{e}")?,
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    Ok(())
}
