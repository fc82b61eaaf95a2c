//! CLI argument parsing for snippetstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "File-backed snippet manager", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all snippets
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find snippets whose name contains a string (case-insensitive)
    Search {
        /// Literal text to look for
        #[arg(required = true)]
        query: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print a snippet's template
    Show {
        /// Snippet name
        #[arg(required = true)]
        name: String,
    },

    /// Add a snippet to the default snippet directory
    Add {
        /// Snippet name (also the file name)
        #[arg(required = true)]
        name: String,

        /// Template text
        #[arg(short, long, conflicts_with = "file")]
        template: Option<String>,

        /// Read the template from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Change a snippet's name and/or template
    Edit {
        /// Current snippet name
        #[arg(required = true)]
        name: String,

        /// New name (renames the file)
        #[arg(short, long)]
        rename: Option<String>,

        /// New template text
        #[arg(short, long, conflicts_with = "file")]
        template: Option<String>,

        /// Read the new template from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a snippet and its file
    Delete {
        /// Snippet name
        #[arg(required = true)]
        name: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove every snippet from the collection (files are kept)
    Clear {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show registered snippet directories
    Dirs,
}

/// Output format for list/search
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

/// Where the binary writes its log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snippetstore")
        .join("logs")
        .join("snippetstore.log")
}
