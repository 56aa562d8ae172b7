//! CLI module for Ansimap

mod args;

pub use args::{Args, Command};

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::model::ModelStats;
use crate::output::MermaidGenerator;
use crate::scan::{ScanResult, ScanWarning, Scanner};
use crate::parser::FileRole;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Scan {
            path,
            exclude,
            config,
        } => {
            let mut cfg = load_config(config.as_deref());
            cfg.merge_cli(None, exclude, None, None);

            let scanner = Scanner::new(cfg);
            let files = scanner.discover(&path)?;

            let inventories: Vec<_> = files
                .iter()
                .filter(|f| f.role == FileRole::Inventory)
                .collect();
            let playbooks: Vec<_> = files
                .iter()
                .filter(|f| f.role == FileRole::Playbook)
                .collect();

            println!("Inventories ({}):", inventories.len());
            for file in &inventories {
                println!("  {}", file.path.display());
            }
            println!("Playbooks ({}):", playbooks.len());
            for file in &playbooks {
                println!("  {}", file.path.display());
            }

            Ok(())
        }

        Command::Generate {
            path,
            output,
            layout,
            select,
            exclude,
            format,
            config,
            verbose,
        } => {
            let mut cfg = load_config(config.as_deref());
            cfg.merge_cli(Some(output), exclude, Some(format.clone()), layout);
            cfg.validate()?;
            // Reject a bad format before any scanning happens
            let output_format = parse_format(&format)?;

            if verbose {
                println!("Scanning: {}", path.display());
                println!("Output: {}", cfg.output.directory.display());
                println!("Format: {:?}", cfg.output.format);
                println!("Layout: {}", cfg.diagram.layout);
                println!("Exclude: {:?}", cfg.scan.exclude);
                if !select.is_empty() {
                    println!("Select: {:?}", select);
                }
            }

            if !path.exists() {
                return Err(crate::error::Error::PathNotFound(path));
            }

            let scanner = Scanner::new(cfg.clone()).with_verbose(verbose);

            println!("Discovering files...");
            let mut result = scanner.scan(&path, &select)?;

            let stats = result.model.stats();
            println!(
                "Scan complete: {} groups, {} hosts, {} playbooks, {} tasks",
                stats.groups, stats.hosts, stats.playbooks, stats.tasks
            );

            let generator = MermaidGenerator::new().with_layout(cfg.layout()?);
            let diagram = generator.generate(&result.model)?;
            result.warnings.extend(diagram.warnings.clone());

            report_warnings(&result.warnings);

            let project_name = project_name(&cfg, &path);
            std::fs::create_dir_all(&cfg.output.directory)?;

            match output_format {
                OutputFormat::Mermaid => {
                    let output_path = cfg.output.directory.join("diagram.mmd");
                    std::fs::write(&output_path, &diagram.text)?;
                    println!("Diagram written to: {}", output_path.display());
                }
                OutputFormat::Json => {
                    let report = JsonReport {
                        project: &project_name,
                        stats: &stats,
                        model: &result.model,
                        warnings: &result.warnings,
                    };
                    let json = serde_json::to_string_pretty(&report)?;
                    let output_path = cfg.output.directory.join("model.json");
                    std::fs::write(&output_path, json)?;
                    println!("JSON written to: {}", output_path.display());
                }
                OutputFormat::Markdown => {
                    let md = generate_markdown(&project_name, &stats, &result, &diagram.text);
                    let output_path = cfg.output.directory.join("README.md");
                    std::fs::write(&output_path, md)?;
                    println!("Markdown written to: {}", output_path.display());
                }
            }

            Ok(())
        }

        Command::Version => {
            println!("ansimap {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    match format {
        "mermaid" => Ok(OutputFormat::Mermaid),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        other => Err(crate::error::Error::other(format!(
            "Unknown format: {}",
            other
        ))),
    }
}

fn load_config(explicit: Option<&Path>) -> Config {
    match explicit {
        Some(path) => Config::load_or_default(path),
        None => Config::load_or_default(Path::new("ansimap.toml")),
    }
}

fn project_name(cfg: &Config, path: &Path) -> String {
    if cfg.project.name == "Untitled Project" || cfg.project.name.is_empty() {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Repository")
            .to_string()
    } else {
        cfg.project.name.clone()
    }
}

fn report_warnings(warnings: &[ScanWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\nWarnings ({}):", warnings.len());
    for warning in warnings.iter().take(5) {
        println!("  {}", warning);
    }
    if warnings.len() > 5 {
        println!("  ... and {} more", warnings.len() - 5);
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    project: &'a str,
    stats: &'a ModelStats,
    model: &'a crate::model::ScanModel,
    warnings: &'a [ScanWarning],
}

/// Generate markdown documentation with the diagram embedded
fn generate_markdown(
    project_name: &str,
    stats: &ModelStats,
    result: &ScanResult,
    diagram_text: &str,
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", project_name));
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Groups:** {}\n", stats.groups));
    md.push_str(&format!("- **Hosts:** {}\n", stats.hosts));
    md.push_str(&format!("- **Playbooks:** {}\n", stats.playbooks));
    md.push_str(&format!("- **Plays:** {}\n", stats.plays));
    md.push_str(&format!("- **Tasks:** {}\n", stats.tasks));
    md.push('\n');

    md.push_str("## Diagram\n\n");
    md.push_str("```mermaid\n");
    md.push_str(diagram_text);
    md.push_str("\n```\n");

    if !result.warnings.is_empty() {
        md.push_str("\n## Warnings\n\n");
        for warning in &result.warnings {
            md.push_str(&format!("- {}\n", warning));
        }
    }

    md
}
