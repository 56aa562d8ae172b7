//! Ansimap - Map Ansible inventories and playbooks as Mermaid diagrams
//!
//! Scans an Ansible repository for inventory and playbook files, builds a
//! logical model of groups, hosts, plays and tasks, and renders it as a
//! Mermaid graph description.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod scan;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use model::ScanModel;
pub use output::{Layout, MermaidGenerator};
pub use scan::{ScanResult, ScanWarning, Scanner};
