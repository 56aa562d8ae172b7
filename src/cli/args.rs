//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Map Ansible inventories and playbooks as Mermaid diagrams
#[derive(Parser, Debug)]
#[command(name = "ansimap")]
#[command(about = "Map Ansible inventories and playbooks as Mermaid diagrams")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover inventory and playbook files in a repository
    Scan {
        /// Path to the repository to scan
        path: PathBuf,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Scan a repository and render its diagram
    Generate {
        /// Path to the repository to scan
        path: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./ansimap-out")]
        output: PathBuf,

        /// Diagram orientation (TD, LR)
        #[arg(long)]
        layout: Option<String>,

        /// Restrict the scan to these discovered paths (can be repeated)
        #[arg(long)]
        select: Vec<PathBuf>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Output format (mermaid, json, markdown)
        #[arg(long, default_value = "mermaid")]
        format: String,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}
