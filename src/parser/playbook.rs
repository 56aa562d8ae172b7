// Playbook interpretation
//
// Walks a parsed playbook document and extracts plays with their target
// and ordered task names. Inclusion constructs (`include_tasks`,
// `import_playbook`, roles, blocks) surface as single opaque task nodes
// and are never expanded.

use crate::model::{Play, Task};
use crate::parser::document::scalar_str;
use serde_yaml::Value;

/// Control keys that never identify a task's action
const RESERVED_KEYS: &[&str] = &[
    "name",
    "when",
    "tags",
    "become",
    "become_user",
    "vars",
    "register",
    "notify",
    "loop",
    "with_items",
    "delegate_to",
    "environment",
    "ignore_errors",
    "changed_when",
    "failed_when",
    "no_log",
    "until",
    "retries",
    "delay",
    "args",
    "any_errors_fatal",
    "run_once",
];

/// Result of interpreting one playbook document
#[derive(Debug, Default)]
pub struct PlaybookDoc {
    pub plays: Vec<Play>,
    /// `import_playbook` directives in document order, kept opaque
    pub imports: Vec<String>,
    /// Indices of play entries skipped as malformed
    pub malformed: Vec<usize>,
}

/// Interpret one playbook document.
///
/// A null root is an empty playbook; any other non-sequence root is a
/// shape failure reported via the reason string. Individual malformed
/// play entries are skipped and recorded by index.
pub fn interpret_playbook(doc: &Value) -> std::result::Result<PlaybookDoc, String> {
    let mut result = PlaybookDoc::default();

    let entries = match doc {
        Value::Null => return Ok(result),
        Value::Sequence(entries) => entries,
        _ => return Err("expected a sequence of plays".to_string()),
    };

    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_mapping() {
            result.malformed.push(index);
            continue;
        }

        if let Some(import) = entry.get("import_playbook") {
            match scalar_str(import) {
                Some(path) => result.imports.push(path),
                None => result.malformed.push(index),
            }
            continue;
        }

        let Some(target) = entry.get("hosts").and_then(target_str) else {
            result.malformed.push(index);
            continue;
        };

        let mut tasks = Vec::new();
        collect_role_tasks(entry.get("pre_tasks"), &mut tasks);
        collect_roles(entry.get("roles"), &mut tasks);
        collect_role_tasks(entry.get("tasks"), &mut tasks);
        collect_role_tasks(entry.get("post_tasks"), &mut tasks);

        result.plays.push(Play { target, tasks });
    }

    Ok(result)
}

/// Normalize a `hosts` value to a target string; a sequence becomes a
/// comma-separated list.
fn target_str(hosts: &Value) -> Option<String> {
    match hosts {
        Value::Sequence(items) => {
            let segments: Vec<String> = items.iter().filter_map(scalar_str).collect();
            if segments.is_empty() {
                None
            } else {
                Some(segments.join(","))
            }
        }
        _ => scalar_str(hosts).filter(|s| !s.is_empty()),
    }
}

fn collect_role_tasks(section: Option<&Value>, into: &mut Vec<Task>) {
    let Some(Value::Sequence(entries)) = section else {
        return;
    };
    for entry in entries {
        if let Some(map) = entry.as_mapping() {
            into.push(Task {
                name: task_name(map),
            });
        }
    }
}

fn collect_roles(roles: Option<&Value>, into: &mut Vec<Task>) {
    let Some(Value::Sequence(entries)) = roles else {
        return;
    };
    for entry in entries {
        let name = match entry {
            Value::Mapping(map) => map
                .get(&Value::String("role".to_string()))
                .or_else(|| map.get(&Value::String("name".to_string())))
                .and_then(scalar_str),
            _ => scalar_str(entry),
        };
        if let Some(name) = name {
            into.push(Task {
                name: format!("role: {}", name),
            });
        }
    }
}

/// Resolve a task's display name: explicit non-empty `name`, else the
/// first non-reserved key (the action), else a placeholder.
fn task_name(task: &serde_yaml::Mapping) -> String {
    if let Some(name) = task.get(&Value::String("name".to_string())).and_then(scalar_str) {
        if !name.is_empty() {
            return name;
        }
    }

    for (key, _) in task {
        if let Some(key) = key.as_str() {
            if !RESERVED_KEYS.contains(&key) {
                return key.to_string();
            }
        }
    }

    "unnamed_task".to_string()
}
