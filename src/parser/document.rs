// Document loading for raw repository files

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::PathBuf;

/// Role a discovered file plays in the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Inventory,
    Playbook,
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRole::Inventory => write!(f, "inventory"),
            FileRole::Playbook => write!(f, "playbook"),
        }
    }
}

/// Raw file content handed to the interpreters
#[derive(Debug, Clone)]
pub struct RawFile {
    pub path: PathBuf,
    pub role: FileRole,
    pub text: String,
}

impl RawFile {
    pub fn new(path: impl Into<PathBuf>, role: FileRole, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role,
            text: text.into(),
        }
    }
}

/// Parse raw text as a single YAML document.
///
/// Returns the parsed tree or a reason string. Callers record failures as
/// warnings and keep scanning; a bad file never aborts the scan.
pub fn parse_document(text: &str) -> std::result::Result<Value, String> {
    serde_yaml::from_str(text).map_err(|e| e.to_string())
}

/// Best-effort scalar-to-string conversion for names authored as strings,
/// numbers or booleans.
pub fn scalar_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
