use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use social_graph_core::{write_dot, Graph};

/// Write the DOT rendering of `graph` to `path`.
pub fn export_dot(graph: &Graph, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_dot(graph, BufWriter::new(file)).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), users = graph.user_count(), "dot file written");
    Ok(())
}

/// Output format passed to the layout program, taken from the image extension.
fn image_format(image: &Path) -> &str {
    image.extension().and_then(|e| e.to_str()).unwrap_or("png")
}

/// Run `<layout> -T<format> <dot> -o <image>`.
pub fn render_image(layout_command: &str, dot: &Path, image: &Path) -> Result<()> {
    let status = Command::new(layout_command)
        .arg(format!("-T{}", image_format(image)))
        .arg(dot)
        .arg("-o")
        .arg(image)
        .status()
        .with_context(|| format!("running {layout_command}"))?;

    if !status.success() {
        bail!("{layout_command} exited with {status}");
    }
    tracing::debug!(image = %image.display(), "image rendered");
    Ok(())
}
