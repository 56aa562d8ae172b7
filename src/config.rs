use crate::error::{Error, Result};
use crate::output::Layout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub diagram: DiagramConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

/// Scan settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob patterns (relative to the scan root) to skip
    pub exclude: Vec<String>,
    pub follow_links: bool,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
}

/// Diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Mermaid orientation, "TD" or "LR"
    pub layout: String,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mermaid,
    Json,
    Markdown,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: vec![
                ".git/**".to_string(),
                "molecule/**".to_string(),
                "collections/**".to_string(),
                ".venv/**".to_string(),
            ],
            follow_links: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: PathBuf::from("./ansimap-out"),
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            layout: "TD".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        exclude: Vec<String>,
        format: Option<String>,
        layout: Option<String>,
    ) {
        if let Some(out) = output {
            self.output.directory = out;
        }

        if !exclude.is_empty() {
            self.scan.exclude.extend(exclude);
        }

        if let Some(fmt) = format {
            self.output.format = match fmt.as_str() {
                "json" => OutputFormat::Json,
                "markdown" | "md" => OutputFormat::Markdown,
                _ => OutputFormat::Mermaid,
            };
        }

        if let Some(l) = layout {
            self.diagram.layout = l;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Rejects anything other than TD/LR
        Layout::from_str(&self.diagram.layout)?;

        if self.output.directory.as_os_str().is_empty() {
            return Err(Error::config_validation("output directory cannot be empty"));
        }

        Ok(())
    }

    /// The validated diagram layout
    pub fn layout(&self) -> Result<Layout> {
        Layout::from_str(&self.diagram.layout)
    }
}
