//! Command-line front end for `social-graph-core`: settings, record
//! ingestion, DOT rendering, one-shot commands and the interactive shell.

pub mod commands;
pub mod load;
pub mod render;
pub mod settings;
pub mod shell;

pub use commands::{execute, GraphCommand, Reply};
pub use load::{load_from_settings, LoadReport};
pub use settings::Settings;
