// Scan-wide model of groups, hosts and playbooks

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Unique identifier for a group in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupId(pub usize);

/// Unique identifier for a host in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HostId(pub usize);

/// Unique identifier for a playbook in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlaybookId(pub usize);

/// A group of hosts, possibly nesting other groups
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub name: String,
    /// Direct member hosts, in first-seen order
    pub hosts: Vec<HostId>,
    /// Direct child groups, in first-seen order
    pub children: Vec<GroupId>,
}

/// A target host
#[derive(Debug, Clone, Serialize)]
pub struct Host {
    pub name: String,
    /// Groups that directly claim this host
    pub groups: Vec<GroupId>,
}

/// One playbook file with its ordered plays
#[derive(Debug, Clone, Serialize)]
pub struct Playbook {
    pub path: PathBuf,
    /// File name used as the display label
    pub name: String,
    pub plays: Vec<Play>,
    /// `import_playbook` directives, kept opaque (never expanded)
    pub imports: Vec<String>,
}

/// One play: a target plus its ordered tasks
#[derive(Debug, Clone, Serialize)]
pub struct Play {
    /// Raw target string as authored (`webservers`, `web,db`, `all`, ...)
    pub target: String,
    pub tasks: Vec<Task>,
}

/// One named unit of work inside a play
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub name: String,
}

/// A group entry as interpreted from one inventory document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub hosts: Vec<String>,
    pub children: Vec<String>,
}

impl GroupEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// The merged model for one scan.
///
/// Groups and hosts keep first-seen order so that synthesis is
/// deterministic regardless of which file mentioned them when.
#[derive(Debug, Default, Serialize)]
pub struct ScanModel {
    pub groups: Vec<Group>,
    pub hosts: Vec<Host>,
    pub playbooks: Vec<Playbook>,
    #[serde(skip)]
    group_index: HashMap<String, GroupId>,
    #[serde(skip)]
    host_index: HashMap<String, HostId>,
}

impl ScanModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a group by name
    pub fn ensure_group(&mut self, name: &str) -> GroupId {
        if let Some(&id) = self.group_index.get(name) {
            return id;
        }
        let id = GroupId(self.groups.len());
        self.groups.push(Group {
            name: name.to_string(),
            hosts: Vec::new(),
            children: Vec::new(),
        });
        self.group_index.insert(name.to_string(), id);
        id
    }

    /// Get or create a host by name
    pub fn ensure_host(&mut self, name: &str) -> HostId {
        if let Some(&id) = self.host_index.get(name) {
            return id;
        }
        let id = HostId(self.hosts.len());
        self.hosts.push(Host {
            name: name.to_string(),
            groups: Vec::new(),
        });
        self.host_index.insert(name.to_string(), id);
        id
    }

    /// Record a host as a direct member of a group
    pub fn add_membership(&mut self, group: GroupId, host_name: &str) {
        let host = self.ensure_host(host_name);
        let group_node = &mut self.groups[group.0];
        if !group_node.hosts.contains(&host) {
            group_node.hosts.push(host);
        }
        let host_node = &mut self.hosts[host.0];
        if !host_node.groups.contains(&group) {
            host_node.groups.push(group);
        }
    }

    /// Record a group as a direct child of another group
    pub fn add_child_group(&mut self, parent: GroupId, child_name: &str) {
        let child = self.ensure_group(child_name);
        if child == parent {
            return;
        }
        let parent_node = &mut self.groups[parent.0];
        if !parent_node.children.contains(&child) {
            parent_node.children.push(child);
        }
    }

    /// Merge one interpreted inventory document into the model (union)
    pub fn merge_inventory(&mut self, entries: &[GroupEntry]) {
        for entry in entries {
            let group = self.ensure_group(&entry.name);
            for host in &entry.hosts {
                self.add_membership(group, host);
            }
            for child in &entry.children {
                self.add_child_group(group, child);
            }
        }
    }

    /// Append a playbook (discovery order is preserved by call order)
    pub fn add_playbook(&mut self, playbook: Playbook) -> PlaybookId {
        let id = PlaybookId(self.playbooks.len());
        self.playbooks.push(playbook);
        id
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.0]
    }

    pub fn group_by_name(&self, name: &str) -> Option<GroupId> {
        self.group_index.get(name).copied()
    }

    pub fn host_by_name(&self, name: &str) -> Option<HostId> {
        self.host_index.get(name).copied()
    }

    /// Groups that are no other group's child, in first-seen order
    pub fn top_level_groups(&self) -> Vec<GroupId> {
        let mut is_child = vec![false; self.groups.len()];
        for group in &self.groups {
            for &child in &group.children {
                is_child[child.0] = true;
            }
        }
        (0..self.groups.len())
            .filter(|&i| !is_child[i])
            .map(GroupId)
            .collect()
    }

    /// Parent→child nesting edges reachable from the top level.
    ///
    /// Traversal tracks the ancestor path and ignores any back-edge whose
    /// target is already an ancestor, so cycles merged from multiple
    /// documents never reach the renderer.
    pub fn nesting_edges(&self) -> Vec<(GroupId, GroupId)> {
        let mut edges = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut ancestors = Vec::new();
        for top in self.top_level_groups() {
            self.collect_nesting(top, &mut ancestors, &mut seen, &mut edges);
        }
        edges
    }

    fn collect_nesting(
        &self,
        group: GroupId,
        ancestors: &mut Vec<GroupId>,
        seen: &mut std::collections::HashSet<(GroupId, GroupId)>,
        edges: &mut Vec<(GroupId, GroupId)>,
    ) {
        ancestors.push(group);
        for &child in &self.groups[group.0].children {
            if ancestors.contains(&child) {
                continue;
            }
            if seen.insert((group, child)) {
                edges.push((group, child));
            }
            self.collect_nesting(child, ancestors, seen, edges);
        }
        ancestors.pop();
    }

    /// Get statistics about the model
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            groups: self.groups.len(),
            hosts: self.hosts.len(),
            playbooks: self.playbooks.len(),
            plays: self.playbooks.iter().map(|p| p.plays.len()).sum(),
            tasks: self
                .playbooks
                .iter()
                .flat_map(|p| &p.plays)
                .map(|p| p.tasks.len())
                .sum(),
        }
    }
}

/// Statistics about the scan model
#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub groups: usize,
    pub hosts: usize,
    pub playbooks: usize,
    pub plays: usize,
    pub tasks: usize,
}
