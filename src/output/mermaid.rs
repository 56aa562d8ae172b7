// Mermaid synthesis
//
// Compiles the scan model into a Mermaid graph description. Emission
// order is fixed (playbooks in discovery order, their tasks in document
// order, then groups and hosts in first-seen order) so identical input
// produces byte-identical output.

use crate::error::{Error, Result};
use crate::model::ScanModel;
use crate::scan::ScanWarning;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Diagram orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Layout {
    /// Top-down
    #[default]
    Td,
    /// Left-right
    Lr,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Td => "TD",
            Layout::Lr => "LR",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TD" => Ok(Layout::Td),
            "LR" => Ok(Layout::Lr),
            other => Err(Error::invalid_layout(other)),
        }
    }
}

/// Node category, used to pick shape, style class and identifier prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeCategory {
    Playbook,
    Group,
    Host,
    Task,
}

impl NodeCategory {
    fn prefix(self) -> char {
        match self {
            NodeCategory::Playbook => 'p',
            NodeCategory::Group => 'g',
            NodeCategory::Host => 'h',
            NodeCategory::Task => 't',
        }
    }

    fn class_name(self) -> &'static str {
        match self {
            NodeCategory::Playbook => "playbookClass",
            NodeCategory::Group => "groupClass",
            NodeCategory::Host => "hostClass",
            NodeCategory::Task => "taskClass",
        }
    }
}

const STYLES: &[&str] = &[
    "    classDef groupClass fill:#e1f5fe,stroke:#01579b,stroke-width:2px",
    "    classDef hostClass fill:#fff3e0,stroke:#e65100,stroke-width:1px",
    "    classDef playbookClass fill:#e8f5e9,stroke:#1b5e20,stroke-width:3px",
    "    classDef taskClass fill:#fafafa,stroke:#616161,stroke-width:1px",
];

/// Sanitize a label into a Mermaid-safe node identifier.
///
/// Pure: collision handling lives in [`IdRegistry`], owned by one
/// synthesis run.
pub fn sanitize(label: &str, category: NodeCategory) -> String {
    let mut out = String::with_capacity(label.len());
    let mut last_underscore = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    let trimmed = out.trim_matches('_');

    if trimmed.is_empty() {
        return "node".to_string();
    }

    let first = trimmed.chars().next().unwrap_or('_');
    if first.is_ascii_alphabetic() {
        trimmed.to_string()
    } else {
        // Identifiers must not start with a digit
        format!("{}_{}", category.prefix(), trimmed)
    }
}

/// Escape double quotes in display labels
pub fn escape_label(label: &str) -> String {
    label.replace('"', "'")
}

/// Identifier state for one synthesis run.
///
/// Issues `_2`, `_3`, ... suffixes in first-seen order when distinct
/// labels sanitize to the same base.
#[derive(Debug, Default)]
struct IdRegistry {
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
    by_category: HashMap<NodeCategory, Vec<String>>,
}

impl IdRegistry {
    fn new() -> Self {
        let mut registry = Self::default();
        // Subgraph anchors are identifiers too
        registry.taken.insert("playbooks_section".to_string());
        registry.taken.insert("inventory_section".to_string());
        registry
    }

    fn issue(&mut self, label: &str, category: NodeCategory) -> String {
        let base = sanitize(label, category);
        let count = self.counts.entry(base.clone()).or_insert(0);
        *count += 1;
        let mut candidate = if *count == 1 {
            base.clone()
        } else {
            format!("{}_{}", base, *count)
        };
        while !self.taken.insert(candidate.clone()) {
            let count = self.counts.get_mut(&base).unwrap();
            *count += 1;
            candidate = format!("{}_{}", base, *count);
        }
        self.by_category
            .entry(category)
            .or_default()
            .push(candidate.clone());
        candidate
    }

    fn issued_for(&self, category: NodeCategory) -> &[String] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Which branch of the target fallback chain fired for a play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetOutcome {
    /// Single token matched a known group or host
    ResolvedExact,
    /// Comma list, at least one segment matched
    ResolvedList,
    /// `all`: fanned out to every top-level group
    ResolvedFanout,
    /// Nothing matched; attached to the literal target string
    Unresolved,
}

/// Resolution record for one play, for callers that want to know which
/// fallback fired
#[derive(Debug, Clone, Serialize)]
pub struct PlayResolution {
    pub playbook: String,
    pub play_index: usize,
    pub target: String,
    pub outcome: TargetOutcome,
}

/// A synthesized diagram plus synthesis-time warnings
#[derive(Debug)]
pub struct Diagram {
    pub text: String,
    pub warnings: Vec<ScanWarning>,
    pub resolutions: Vec<PlayResolution>,
}

/// Mermaid generator for one scan model
pub struct MermaidGenerator {
    layout: Layout,
}

impl MermaidGenerator {
    pub fn new() -> Self {
        Self {
            layout: Layout::default(),
        }
    }

    /// Set the diagram orientation
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Synthesize the diagram text for a model.
    ///
    /// Fails with `EmptySelection` when the model holds nothing to draw.
    pub fn generate(&self, model: &ScanModel) -> Result<Diagram> {
        if model.playbooks.is_empty() && model.groups.is_empty() {
            return Err(Error::EmptySelection);
        }

        let mut ids = IdRegistry::new();
        let mut warnings = Vec::new();
        let mut resolutions = Vec::new();

        // Node declaration: playbooks and their tasks first
        let mut playbook_lines = Vec::new();
        let mut playbook_ids = Vec::new();
        let mut task_ids: Vec<Vec<Vec<String>>> = Vec::new();
        let mut import_ids: Vec<Vec<String>> = Vec::new();

        for playbook in &model.playbooks {
            let pb_id = ids.issue(&playbook.name, NodeCategory::Playbook);
            playbook_lines.push(format!(
                "        {}[\"{}\"]",
                pb_id,
                escape_label(&playbook.name)
            ));

            let mut plays = Vec::new();
            for play in &playbook.plays {
                let mut tasks = Vec::new();
                for task in &play.tasks {
                    let task_id = ids.issue(&task.name, NodeCategory::Task);
                    playbook_lines.push(format!(
                        "        {}(\"{}\")",
                        task_id,
                        escape_label(&task.name)
                    ));
                    tasks.push(task_id);
                }
                plays.push(tasks);
            }

            let mut imports = Vec::new();
            for import in &playbook.imports {
                let label = format!("import_playbook: {}", import);
                let import_id = ids.issue(&label, NodeCategory::Task);
                playbook_lines.push(format!(
                    "        {}(\"{}\")",
                    import_id,
                    escape_label(&label)
                ));
                imports.push(import_id);
            }

            playbook_ids.push(pb_id);
            task_ids.push(plays);
            import_ids.push(imports);
        }

        // Then groups and hosts in first-seen order
        let mut inventory_lines = Vec::new();
        let mut group_ids = Vec::new();
        for group in &model.groups {
            let group_id = ids.issue(&group.name, NodeCategory::Group);
            inventory_lines.push(format!(
                "        {}[[\"{}\"]]",
                group_id,
                escape_label(&group.name)
            ));
            group_ids.push(group_id);
        }

        let mut host_ids = Vec::new();
        for host in &model.hosts {
            let host_id = ids.issue(&host.name, NodeCategory::Host);
            inventory_lines.push(format!(
                "        {}((\"{}\"))",
                host_id,
                escape_label(&host.name)
            ));
            host_ids.push(host_id);
        }

        // Edge construction; unresolved targets add literal nodes to the
        // inventory column as they are first seen
        let mut connections = Vec::new();
        let mut literal_ids: HashMap<String, String> = HashMap::new();
        let top_level = model.top_level_groups();

        for (pb_index, playbook) in model.playbooks.iter().enumerate() {
            let pb_id = &playbook_ids[pb_index];

            for (play_index, play) in playbook.plays.iter().enumerate() {
                let tasks = &task_ids[pb_index][play_index];
                let outcome = self.resolve_target(
                    model,
                    &play.target,
                    pb_id,
                    tasks,
                    &group_ids,
                    &host_ids,
                    &top_level,
                    &mut ids,
                    &mut literal_ids,
                    &mut inventory_lines,
                    &mut connections,
                );
                if outcome == TargetOutcome::Unresolved {
                    warnings.push(ScanWarning::UnresolvedTarget {
                        playbook: playbook.name.clone(),
                        target: play.target.clone(),
                    });
                }
                resolutions.push(PlayResolution {
                    playbook: playbook.name.clone(),
                    play_index,
                    target: play.target.clone(),
                    outcome,
                });
            }

            for import_id in &import_ids[pb_index] {
                connections.push(format!("    {} -->|\"imports\"| {}", pb_id, import_id));
            }
        }

        // Group nesting, cycle-safe
        for (parent, child) in model.nesting_edges() {
            connections.push(format!(
                "    {} -->|\"contains\"| {}",
                group_ids[parent.0], group_ids[child.0]
            ));
        }

        // Group membership
        for (index, group) in model.groups.iter().enumerate() {
            for &host in &group.hosts {
                connections.push(format!("    {} --- {}", group_ids[index], host_ids[host.0]));
            }
        }

        // Assemble
        let mut lines = vec![format!("graph {}", self.layout)];
        lines.push("    subgraph playbooks_section[\"Playbooks\"]".to_string());
        lines.push("    direction TB".to_string());
        lines.extend(playbook_lines);
        lines.push("    end".to_string());
        lines.push("    subgraph inventory_section[\"Inventory\"]".to_string());
        lines.push("    direction TB".to_string());
        lines.extend(inventory_lines);
        lines.push("    end".to_string());
        lines.extend(connections);
        lines.extend(STYLES.iter().map(|s| s.to_string()));
        for category in [
            NodeCategory::Playbook,
            NodeCategory::Group,
            NodeCategory::Host,
            NodeCategory::Task,
        ] {
            let issued = ids.issued_for(category);
            if !issued.is_empty() {
                lines.push(format!(
                    "    class {} {}",
                    issued.join(","),
                    category.class_name()
                ));
            }
        }

        Ok(Diagram {
            text: lines.join("\n"),
            warnings,
            resolutions,
        })
    }

    /// Resolve one play target and emit its edges.
    ///
    /// Fallback chain: exact group/host match, comma-list per-segment
    /// match, `all` fan-out to top-level groups, literal-string node.
    #[allow(clippy::too_many_arguments)]
    fn resolve_target(
        &self,
        model: &ScanModel,
        target: &str,
        pb_id: &str,
        tasks: &[String],
        group_ids: &[String],
        host_ids: &[String],
        top_level: &[crate::model::GroupId],
        ids: &mut IdRegistry,
        literal_ids: &mut HashMap<String, String>,
        inventory_lines: &mut Vec<String>,
        connections: &mut Vec<String>,
    ) -> TargetOutcome {
        let lookup = |name: &str| -> Option<&str> {
            if let Some(group) = model.group_by_name(name) {
                Some(group_ids[group.0].as_str())
            } else if let Some(host) = model.host_by_name(name) {
                Some(host_ids[host.0].as_str())
            } else {
                None
            }
        };

        let tokens: Vec<&str> = target
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        // `all` fans out to every top-level group
        if target.trim() == "all" && !top_level.is_empty() {
            for &group in top_level {
                let node = group_ids[group.0].as_str();
                connections.push(format!("    {} -->|\"targets\"| {}", pb_id, node));
                for task_id in tasks {
                    connections.push(format!("    {} -->|\"runs\"| {}", node, task_id));
                }
            }
            return TargetOutcome::ResolvedFanout;
        }

        if tokens.len() == 1 {
            if let Some(node) = lookup(tokens[0]) {
                connections.push(format!("    {} -->|\"targets\"| {}", pb_id, node));
                for task_id in tasks {
                    connections.push(format!("    {} -->|\"runs\"| {}", node, task_id));
                }
                return TargetOutcome::ResolvedExact;
            }
        } else {
            let resolved: Vec<&str> = tokens.iter().filter_map(|t| lookup(t)).collect();
            if !resolved.is_empty() {
                for node in &resolved {
                    connections.push(format!("    {} -->|\"targets\"| {}", pb_id, node));
                    for task_id in tasks {
                        connections.push(format!("    {} -->|\"runs\"| {}", node, task_id));
                    }
                }
                return TargetOutcome::ResolvedList;
            }
        }

        // Nothing matched: attach to the literal target string
        let literal = literal_ids.entry(target.to_string()).or_insert_with(|| {
            let id = ids.issue(target, NodeCategory::Group);
            inventory_lines.push(format!("        {}[[\"{}\"]]", id, escape_label(target)));
            id
        });
        connections.push(format!("    {} -->|\"targets\"| {}", pb_id, literal));
        for task_id in tasks {
            connections.push(format!("    {} -->|\"runs\"| {}", literal, task_id));
        }
        TargetOutcome::Unresolved
    }
}

impl Default for MermaidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupEntry, Play, Playbook, ScanModel, Task};
    use std::path::PathBuf;

    fn entry(name: &str, hosts: &[&str], children: &[&str]) -> GroupEntry {
        GroupEntry {
            name: name.to_string(),
            hosts: hosts.iter().map(|s| s.to_string()).collect(),
            children: children.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn playbook(name: &str, target: &str, tasks: &[&str]) -> Playbook {
        Playbook {
            path: PathBuf::from(format!("playbooks/{}", name)),
            name: name.to_string(),
            plays: vec![Play {
                target: target.to_string(),
                tasks: tasks
                    .iter()
                    .map(|t| Task {
                        name: t.to_string(),
                    })
                    .collect(),
            }],
            imports: Vec::new(),
        }
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!(Layout::from_str("TD").unwrap(), Layout::Td);
        assert_eq!(Layout::from_str("LR").unwrap(), Layout::Lr);
        assert!(matches!(
            Layout::from_str("XY"),
            Err(Error::InvalidLayout { value }) if value == "XY"
        ));
    }

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize("webservers", NodeCategory::Group), "webservers");
        assert_eq!(sanitize("install nginx", NodeCategory::Task), "install_nginx");
        assert_eq!(sanitize("web-1.example.com", NodeCategory::Host), "web_1_example_com");
    }

    #[test]
    fn test_sanitize_trims_and_collapses() {
        assert_eq!(sanitize("web!", NodeCategory::Group), "web");
        assert_eq!(sanitize("!!web!!", NodeCategory::Group), "web");
        assert_eq!(sanitize("a  b", NodeCategory::Task), "a_b");
    }

    #[test]
    fn test_sanitize_leading_digit_gets_prefix() {
        assert_eq!(sanitize("1web", NodeCategory::Host), "h_1web");
        assert_eq!(sanitize("42", NodeCategory::Group), "g_42");
    }

    #[test]
    fn test_sanitize_empty_placeholder() {
        assert_eq!(sanitize("", NodeCategory::Task), "node");
        assert_eq!(sanitize("!!!", NodeCategory::Task), "node");
    }

    #[test]
    fn test_sanitize_is_pure() {
        for label in ["web!", "", "1web", "a b c"] {
            assert_eq!(
                sanitize(label, NodeCategory::Group),
                sanitize(label, NodeCategory::Group)
            );
        }
    }

    #[test]
    fn test_sanitize_output_charset() {
        for label in ["web servers!", "öäü", "a.b-c", "100%"] {
            let id = sanitize(label, NodeCategory::Group);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("say \"hi\""), "say 'hi'");
    }

    #[test]
    fn test_registry_collision_suffixes() {
        let mut ids = IdRegistry::new();
        assert_eq!(ids.issue("web", NodeCategory::Group), "web");
        assert_eq!(ids.issue("web!", NodeCategory::Group), "web_2");
        assert_eq!(ids.issue("web?", NodeCategory::Group), "web_3");
    }

    #[test]
    fn test_registry_avoids_taken_finals() {
        let mut ids = IdRegistry::new();
        assert_eq!(ids.issue("web_2", NodeCategory::Group), "web_2");
        assert_eq!(ids.issue("web", NodeCategory::Group), "web");
        // "web_2" is taken by the literal label, so the collision skips it
        assert_eq!(ids.issue("web!", NodeCategory::Group), "web_3");
    }

    #[test]
    fn test_generate_empty_model_fails() {
        let model = ScanModel::new();
        let result = MermaidGenerator::new().generate(&model);
        assert!(matches!(result, Err(Error::EmptySelection)));
    }

    #[test]
    fn test_generate_header_layout() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);

        let td = MermaidGenerator::new().generate(&model).unwrap();
        assert!(td.text.starts_with("graph TD\n"));

        let lr = MermaidGenerator::new()
            .with_layout(Layout::Lr)
            .generate(&model)
            .unwrap();
        assert!(lr.text.starts_with("graph LR\n"));
    }

    #[test]
    fn test_generate_group_host_edges() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("webservers", &["web1", "web2"], &[])]);

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("webservers[[\"webservers\"]]"));
        assert!(diagram.text.contains("web1((\"web1\"))"));
        assert!(diagram.text.contains("    webservers --- web1"));
        assert!(diagram.text.contains("    webservers --- web2"));
    }

    #[test]
    fn test_generate_exact_target() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("webservers", &["web1"], &[])]);
        model.add_playbook(playbook("site.yml", "webservers", &["install nginx"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("site_yml -->|\"targets\"| webservers"));
        assert!(diagram.text.contains("webservers -->|\"runs\"| install_nginx"));
        assert_eq!(diagram.resolutions[0].outcome, TargetOutcome::ResolvedExact);
        assert!(diagram.warnings.is_empty());
    }

    #[test]
    fn test_generate_host_target() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);
        model.add_playbook(playbook("host.yml", "web1", &["reboot"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("host_yml -->|\"targets\"| web1"));
        assert_eq!(diagram.resolutions[0].outcome, TargetOutcome::ResolvedExact);
    }

    #[test]
    fn test_generate_list_target() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[]), entry("db", &["db1"], &[])]);
        model.add_playbook(playbook("both.yml", "web, db, ghost", &["ping"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("both_yml -->|\"targets\"| web"));
        assert!(diagram.text.contains("both_yml -->|\"targets\"| db"));
        assert!(!diagram.text.contains("ghost"));
        assert_eq!(diagram.resolutions[0].outcome, TargetOutcome::ResolvedList);
    }

    #[test]
    fn test_generate_all_fans_out_to_top_level() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[
            entry("prod", &[], &["web"]),
            entry("web", &["web1"], &[]),
            entry("db", &["db1"], &[]),
        ]);
        model.add_playbook(playbook("site.yml", "all", &["ping"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        // prod and db are top level; web is nested under prod
        assert!(diagram.text.contains("site_yml -->|\"targets\"| prod"));
        assert!(diagram.text.contains("site_yml -->|\"targets\"| db"));
        assert!(!diagram.text.contains("site_yml -->|\"targets\"| web\n"));
        assert_eq!(diagram.resolutions[0].outcome, TargetOutcome::ResolvedFanout);
    }

    #[test]
    fn test_generate_unresolved_literal_node() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);
        model.add_playbook(playbook("site.yml", "mailservers", &["ping"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("mailservers[[\"mailservers\"]]"));
        assert!(diagram.text.contains("site_yml -->|\"targets\"| mailservers"));
        assert!(diagram.text.contains("mailservers -->|\"runs\"| ping"));
        assert_eq!(diagram.resolutions[0].outcome, TargetOutcome::Unresolved);
        assert!(matches!(
            &diagram.warnings[0],
            ScanWarning::UnresolvedTarget { playbook, target }
                if playbook == "site.yml" && target == "mailservers"
        ));
    }

    #[test]
    fn test_generate_all_without_groups_is_unresolved() {
        let mut model = ScanModel::new();
        model.add_playbook(playbook("site.yml", "all", &["ping"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert_eq!(diagram.resolutions[0].outcome, TargetOutcome::Unresolved);
        assert!(diagram.text.contains("all[[\"all\"]]"));
    }

    #[test]
    fn test_task_edge_count_matches_tasks() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);
        model.add_playbook(playbook("site.yml", "web", &["a", "b", "c"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        let runs = diagram
            .text
            .lines()
            .filter(|l| l.contains("-->|\"runs\"|"))
            .count();
        assert_eq!(runs, 3);
    }

    #[test]
    fn test_tasks_not_deduplicated_across_plays() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);
        let mut pb = playbook("site.yml", "web", &["restart"]);
        pb.plays.push(Play {
            target: "web".to_string(),
            tasks: vec![Task {
                name: "restart".to_string(),
            }],
        });
        model.add_playbook(pb);

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("restart(\"restart\")"));
        assert!(diagram.text.contains("restart_2(\"restart\")"));
    }

    #[test]
    fn test_nesting_edges_emitted() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[
            entry("prod", &[], &["web"]),
            entry("web", &["web1"], &[]),
        ]);

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("    prod -->|\"contains\"| web"));
    }

    #[test]
    fn test_import_rendered_as_opaque_task() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);
        let mut pb = playbook("site.yml", "web", &[]);
        pb.imports.push("common.yml".to_string());
        model.add_playbook(pb);

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("import_playbook: common.yml"));
        assert!(diagram.text.contains("-->|\"imports\"|"));
    }

    #[test]
    fn test_class_lines_present() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[entry("web", &["web1"], &[])]);
        model.add_playbook(playbook("site.yml", "web", &["ping"]));

        let diagram = MermaidGenerator::new().generate(&model).unwrap();
        assert!(diagram.text.contains("classDef groupClass"));
        assert!(diagram.text.contains("class web groupClass"));
        assert!(diagram.text.contains("class web1 hostClass"));
        assert!(diagram.text.contains("class site_yml playbookClass"));
        assert!(diagram.text.contains("class ping taskClass"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let mut model = ScanModel::new();
        model.merge_inventory(&[
            entry("prod", &[], &["web", "db"]),
            entry("web", &["web1", "web2"], &[]),
            entry("db", &["db1"], &[]),
        ]);
        model.add_playbook(playbook("site.yml", "web", &["install nginx", "start nginx"]));
        model.add_playbook(playbook("db.yml", "all", &["backup"]));

        let gen = MermaidGenerator::new();
        let first = gen.generate(&model).unwrap();
        let second = gen.generate(&model).unwrap();
        assert_eq!(first.text, second.text);
    }
}
