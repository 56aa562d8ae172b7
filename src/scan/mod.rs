// Repository scanning: discovery, parallel parsing and model merge

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{GroupEntry, Playbook, ScanModel};
use crate::parser::{
    interpret_inventory, interpret_playbook, parse_document, FileRole, PlaybookDoc, RawFile,
};
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A non-fatal problem recorded while scanning or synthesizing.
///
/// Warnings never abort a scan; the caller gets a best-effort model plus
/// this list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// A file's YAML parse failed; the file was excluded from the model
    ParseFailure { path: PathBuf, reason: String },
    /// A play entry lacked a resolvable target and was skipped
    MalformedPlay { path: PathBuf, index: usize },
    /// A play target matched nothing; attached to the literal string
    UnresolvedTarget { playbook: String, target: String },
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanWarning::ParseFailure { path, reason } => {
                write!(f, "parse failure in {}: {}", path.display(), reason)
            }
            ScanWarning::MalformedPlay { path, index } => {
                write!(f, "malformed play #{} in {}", index, path.display())
            }
            ScanWarning::UnresolvedTarget { playbook, target } => {
                write!(f, "unresolved target \"{}\" in {}", target, playbook)
            }
        }
    }
}

/// A candidate file found by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub role: FileRole,
}

/// Result of one scan: best-effort model plus warnings
#[derive(Debug)]
pub struct ScanResult {
    pub model: ScanModel,
    pub warnings: Vec<ScanWarning>,
    pub files: Vec<DiscoveredFile>,
}

enum ParsedDoc {
    Inventory(Vec<GroupEntry>),
    Playbook(PlaybookDoc),
    Failed(String),
}

/// Scanner that discovers and interprets one repository.
///
/// Every scan builds a fresh model; nothing is shared across scans.
pub struct Scanner {
    config: Config,
    verbose: bool,
}

impl Scanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    /// Create scanner with verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Discover inventory and playbook candidates under a root.
    ///
    /// Inventory: any file with an `inventory` directory component.
    /// Playbook: `playbooks/*.yml` whose text mentions `hosts:`.
    /// Results are sorted by path for a stable discovery order.
    pub fn discover(&self, root: &Path) -> Result<Vec<DiscoveredFile>> {
        let (loaded, _) = self.load_candidates(root)?;
        Ok(loaded
            .iter()
            .map(|f| DiscoveredFile {
                path: f.path.clone(),
                role: f.role,
            })
            .collect())
    }

    /// Walk the tree once, loading each candidate's text as it is found.
    /// Unreadable candidates become `ParseFailure` warnings.
    fn load_candidates(&self, root: &Path) -> Result<(Vec<RawFile>, Vec<ScanWarning>)> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        let patterns = self.exclude_patterns()?;
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(self.config.scan.follow_links)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if Self::is_excluded(relative, &patterns) {
                continue;
            }

            let Some(candidate) = classify(relative) else {
                continue;
            };

            match std::fs::read_to_string(path) {
                Ok(text) => match candidate {
                    Candidate::Inventory => {
                        files.push(RawFile::new(path.to_path_buf(), FileRole::Inventory, text))
                    }
                    // Only files that actually bind plays to hosts count
                    Candidate::PlaybookFile if text.contains("hosts:") => {
                        files.push(RawFile::new(path.to_path_buf(), FileRole::Playbook, text))
                    }
                    Candidate::PlaybookFile => {}
                },
                Err(e) => warnings.push(ScanWarning::ParseFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }),
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok((files, warnings))
    }

    /// Scan a repository root, optionally restricted to a selection of
    /// discovered paths, and build the merged model.
    pub fn scan(&self, root: &Path, selection: &[PathBuf]) -> Result<ScanResult> {
        let (loaded, mut warnings) = self.load_candidates(root)?;

        let selected: Vec<RawFile> = if selection.is_empty() {
            loaded
        } else {
            loaded
                .into_iter()
                .filter(|f| selection.iter().any(|s| path_matches(&f.path, s)))
                .collect()
        };

        if selected.is_empty() {
            return Err(Error::EmptySelection);
        }

        let mut result = self.scan_files(&selected);
        result.files = selected
            .iter()
            .map(|f| DiscoveredFile {
                path: f.path.clone(),
                role: f.role,
            })
            .collect();
        warnings.extend(result.warnings);
        result.warnings = warnings;
        Ok(result)
    }

    /// Interpret pre-loaded raw files into a merged model.
    ///
    /// Files are parsed in parallel, tagged with their discovery index
    /// and sorted before the serialized merge so emission order never
    /// depends on completion order.
    pub fn scan_files(&self, files: &[RawFile]) -> ScanResult {
        let progress = if self.verbose {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut parsed: Vec<(usize, ParsedDoc)> = files
            .par_iter()
            .enumerate()
            .map(|(index, file)| {
                let doc = match parse_document(&file.text) {
                    Ok(value) => match file.role {
                        FileRole::Inventory => {
                            ParsedDoc::Inventory(interpret_inventory(&value))
                        }
                        FileRole::Playbook => match interpret_playbook(&value) {
                            Ok(doc) => ParsedDoc::Playbook(doc),
                            Err(reason) => ParsedDoc::Failed(reason),
                        },
                    },
                    Err(reason) => ParsedDoc::Failed(reason),
                };
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                (index, doc)
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_with_message("Parsing complete");
        }

        parsed.sort_by_key(|(index, _)| *index);

        let mut model = ScanModel::new();
        let mut warnings = Vec::new();
        for (index, doc) in parsed {
            let file = &files[index];
            match doc {
                ParsedDoc::Inventory(entries) => model.merge_inventory(&entries),
                ParsedDoc::Playbook(doc) => {
                    for play_index in doc.malformed {
                        warnings.push(ScanWarning::MalformedPlay {
                            path: file.path.clone(),
                            index: play_index,
                        });
                    }
                    model.add_playbook(Playbook {
                        name: file_label(&file.path),
                        path: file.path.clone(),
                        plays: doc.plays,
                        imports: doc.imports,
                    });
                }
                ParsedDoc::Failed(reason) => warnings.push(ScanWarning::ParseFailure {
                    path: file.path.clone(),
                    reason,
                }),
            }
        }

        ScanResult {
            model,
            warnings,
            files: Vec::new(),
        }
    }

    fn exclude_patterns(&self) -> Result<Vec<Pattern>> {
        self.config
            .scan
            .exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(Error::from))
            .collect()
    }

    fn is_excluded(relative: &Path, patterns: &[Pattern]) -> bool {
        if relative.components().any(|c| c.as_os_str() == ".git") {
            return true;
        }
        let relative_str = relative.to_string_lossy();
        patterns.iter().any(|p| p.matches(&relative_str))
    }
}

/// What a path alone says about a file; playbook candidates still need
/// their text checked for `hosts:`
enum Candidate {
    Inventory,
    PlaybookFile,
}

/// Classify a file by the repository path conventions
fn classify(relative: &Path) -> Option<Candidate> {
    let in_inventory_dir = relative
        .parent()
        .map(|p| p.components().any(|c| c.as_os_str() == "inventory"))
        .unwrap_or(false);
    if in_inventory_dir {
        return Some(Candidate::Inventory);
    }

    let in_playbooks_dir = relative
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n == "playbooks")
        .unwrap_or(false);
    if in_playbooks_dir && relative.extension().map_or(false, |e| e == "yml") {
        return Some(Candidate::PlaybookFile);
    }

    None
}

/// True when a discovered path matches a user-supplied selection path
fn path_matches(discovered: &Path, selection: &Path) -> bool {
    discovered == selection || discovered.ends_with(selection)
}

/// Display label for a playbook: its file name
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let dir = TempDir::new().unwrap();

        let inventory = dir.path().join("inventory");
        fs::create_dir_all(&inventory).unwrap();
        fs::write(
            inventory.join("hosts.yml"),
            "webservers:\n  hosts:\n    web1:\n    web2:\ndbservers:\n  hosts:\n    db1:\n",
        )
        .unwrap();

        let playbooks = dir.path().join("playbooks");
        fs::create_dir_all(&playbooks).unwrap();
        fs::write(
            playbooks.join("site.yml"),
            "- hosts: webservers\n  tasks:\n    - name: install nginx\n      apt:\n        name: nginx\n",
        )
        .unwrap();

        dir
    }

    fn scanner() -> Scanner {
        Scanner::new(Config::default())
    }

    #[test]
    fn test_discover_classifies_roles() {
        let dir = create_test_repo();
        let files = scanner().discover(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        let roles: Vec<FileRole> = files.iter().map(|f| f.role).collect();
        assert!(roles.contains(&FileRole::Inventory));
        assert!(roles.contains(&FileRole::Playbook));
    }

    #[test]
    fn test_discover_missing_root() {
        let result = scanner().discover(Path::new("/nonexistent/repo"));
        assert!(matches!(result, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn test_discover_skips_playbook_without_hosts() {
        let dir = create_test_repo();
        fs::write(
            dir.path().join("playbooks/vars.yml"),
            "nginx_version: 1.24\n",
        )
        .unwrap();

        let files = scanner().discover(dir.path()).unwrap();
        assert!(files.iter().all(|f| !f.path.ends_with("vars.yml")));
    }

    #[test]
    fn test_discover_skips_non_yml_playbooks() {
        let dir = create_test_repo();
        fs::write(dir.path().join("playbooks/notes.md"), "hosts: nope\n").unwrap();

        let files = scanner().discover(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_discover_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("env/prod/inventory");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("hosts"), "web:\n  hosts:\n    web1:\n").unwrap();

        let files = scanner().discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].role, FileRole::Inventory);
    }

    #[test]
    fn test_discover_respects_excludes() {
        let dir = create_test_repo();
        let staging = dir.path().join("staging/inventory");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("hosts.yml"), "old:\n  hosts:\n    x:\n").unwrap();

        let mut config = Config::default();
        config.scan.exclude.push("staging/**".to_string());
        let files = Scanner::new(config).discover(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_discover_order_is_stable() {
        let dir = create_test_repo();
        let first = scanner().discover(dir.path()).unwrap();
        let second = scanner().discover(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_builds_model() {
        let dir = create_test_repo();
        let result = scanner().scan(dir.path(), &[]).unwrap();

        assert!(result.warnings.is_empty());
        let stats = result.model.stats();
        assert_eq!(stats.groups, 2);
        assert_eq!(stats.hosts, 3);
        assert_eq!(stats.playbooks, 1);
        assert_eq!(stats.tasks, 1);

        let web = result.model.group_by_name("webservers").unwrap();
        assert_eq!(result.model.group(web).hosts.len(), 2);
    }

    #[test]
    fn test_scan_isolates_malformed_file() {
        let dir = create_test_repo();
        fs::write(
            dir.path().join("inventory/broken.yml"),
            "web:\n  hosts: [unclosed\n",
        )
        .unwrap();

        let result = scanner().scan(dir.path(), &[]).unwrap();

        // Exactly one parse failure, everything else intact
        let failures: Vec<&ScanWarning> = result
            .warnings
            .iter()
            .filter(|w| matches!(w, ScanWarning::ParseFailure { .. }))
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(result.model.group_by_name("webservers").is_some());
        assert_eq!(result.model.playbooks.len(), 1);
    }

    #[test]
    fn test_scan_warns_on_unreadable_candidate() {
        let dir = create_test_repo();
        // Invalid UTF-8 makes the read itself fail
        fs::write(dir.path().join("playbooks/binary.yml"), b"hosts:\n\xff\xfe").unwrap();

        let result = scanner().scan(dir.path(), &[]).unwrap();

        assert!(result.warnings.iter().any(|w| matches!(
            w,
            ScanWarning::ParseFailure { path, .. } if path.ends_with("binary.yml")
        )));
        assert_eq!(result.model.playbooks.len(), 1);
        assert!(result.model.group_by_name("webservers").is_some());
    }

    #[test]
    fn test_scan_reports_malformed_plays() {
        let dir = create_test_repo();
        fs::write(
            dir.path().join("playbooks/broken.yml"),
            "# hosts: in a comment only\n- tasks:\n    - shell: ls\n- hosts: webservers\n  tasks: []\n",
        )
        .unwrap();

        let result = scanner().scan(dir.path(), &[]).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, ScanWarning::MalformedPlay { index: 0, .. })));
        assert_eq!(result.model.playbooks.len(), 2);
    }

    #[test]
    fn test_scan_selection_filters() {
        let dir = create_test_repo();
        let result = scanner()
            .scan(dir.path(), &[PathBuf::from("playbooks/site.yml")])
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.model.playbooks.len(), 1);
        assert!(result.model.groups.is_empty());
    }

    #[test]
    fn test_scan_empty_selection_fails() {
        let dir = create_test_repo();
        let result = scanner().scan(dir.path(), &[PathBuf::from("no/such/file.yml")]);
        assert!(matches!(result, Err(Error::EmptySelection)));
    }

    #[test]
    fn test_scan_empty_repo_fails() {
        let dir = TempDir::new().unwrap();
        let result = scanner().scan(dir.path(), &[]);
        assert!(matches!(result, Err(Error::EmptySelection)));
    }

    #[test]
    fn test_scan_files_merges_inventories() {
        let files = vec![
            RawFile::new(
                "inventory/a.yml",
                FileRole::Inventory,
                "web:\n  hosts:\n    web1:\n",
            ),
            RawFile::new(
                "inventory/b.yml",
                FileRole::Inventory,
                "web:\n  hosts:\n    web2:\ndb:\n  hosts:\n    db1:\n",
            ),
        ];
        let result = scanner().scan_files(&files);

        let web = result.model.group_by_name("web").unwrap();
        assert_eq!(result.model.group(web).hosts.len(), 2);
        assert_eq!(result.model.groups.len(), 2);
    }

    #[test]
    fn test_scan_files_deterministic_merge_order() {
        let files: Vec<RawFile> = (0..20)
            .map(|i| {
                RawFile::new(
                    format!("inventory/{:02}.yml", i),
                    FileRole::Inventory,
                    format!("group{:02}:\n  hosts:\n    host{:02}:\n", i, i),
                )
            })
            .collect();

        let first = scanner().scan_files(&files);
        let second = scanner().scan_files(&files);
        let names = |r: &ScanResult| -> Vec<String> {
            r.model.groups.iter().map(|g| g.name.clone()).collect()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first)[0], "group00");
        assert_eq!(names(&first)[19], "group19");
    }

    #[test]
    fn test_warning_display() {
        let warning = ScanWarning::MalformedPlay {
            path: PathBuf::from("playbooks/site.yml"),
            index: 2,
        };
        assert_eq!(
            warning.to_string(),
            "malformed play #2 in playbooks/site.yml"
        );
    }
}
