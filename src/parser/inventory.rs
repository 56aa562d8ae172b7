// Inventory interpretation
//
// Walks a parsed inventory document and extracts groups, hosts and
// group nesting. Two author conventions are recognized per group body,
// detected at runtime:
//   - a mapping with optional `hosts` and `children` mappings
//   - a flat sequence of host names

use crate::model::GroupEntry;
use crate::parser::document::scalar_str;
use serde_yaml::Value;

/// Interpret one inventory document into ordered group entries.
///
/// A non-mapping root yields no entries. Malformed pieces inside the
/// document are skipped rather than failing the file.
pub fn interpret_inventory(doc: &Value) -> Vec<GroupEntry> {
    let mut entries = Vec::new();
    let Some(mapping) = doc.as_mapping() else {
        return entries;
    };

    let mut ancestors = Vec::new();
    for (key, body) in mapping {
        let Some(name) = scalar_str(key) else {
            continue;
        };
        if name == "all" && body.is_mapping() && !has_own_hosts(body) {
            // Conventional wrapper: its children are the real top level.
            if let Some(children) = body.get("children").and_then(Value::as_mapping) {
                for (child_key, child_body) in children {
                    if let Some(child_name) = scalar_str(child_key) {
                        walk_group(&child_name, child_body, &mut ancestors, &mut entries);
                    }
                }
            }
            continue;
        }
        walk_group(&name, body, &mut ancestors, &mut entries);
    }
    entries
}

fn has_own_hosts(body: &Value) -> bool {
    match body.get("hosts") {
        Some(Value::Mapping(m)) => !m.is_empty(),
        Some(Value::Sequence(s)) => !s.is_empty(),
        _ => false,
    }
}

fn walk_group(name: &str, body: &Value, ancestors: &mut Vec<String>, entries: &mut Vec<GroupEntry>) {
    if ancestors.iter().any(|a| a == name) {
        // Back-edge to an ancestor group
        return;
    }

    let mut entry = GroupEntry::new(name);
    match body {
        Value::Mapping(_) => {
            collect_hosts(body.get("hosts"), &mut entry.hosts);

            let children = body.get("children").and_then(Value::as_mapping);
            if let Some(children) = children {
                for (child_key, _) in children {
                    if let Some(child) = scalar_str(child_key) {
                        if child != name && !ancestors.iter().any(|a| a == &child) {
                            entry.children.push(child);
                        }
                    }
                }
            }
            entries.push(entry);

            if let Some(children) = children {
                ancestors.push(name.to_string());
                for (child_key, child_body) in children {
                    if let Some(child) = scalar_str(child_key) {
                        walk_group(&child, child_body, ancestors, entries);
                    }
                }
                ancestors.pop();
            }
        }
        Value::Sequence(items) => {
            // Flat layout: the group body is a host list
            for item in items {
                if let Some(host) = scalar_str(item) {
                    entry.hosts.push(host);
                }
            }
            entries.push(entry);
        }
        // Null or scalar body: the group exists, empty
        _ => entries.push(entry),
    }
}

fn collect_hosts(hosts: Option<&Value>, into: &mut Vec<String>) {
    match hosts {
        Some(Value::Mapping(map)) => {
            for (host_key, _) in map {
                if let Some(host) = scalar_str(host_key) {
                    into.push(host);
                }
            }
        }
        // Authors sometimes write `hosts` as a list
        Some(Value::Sequence(items)) => {
            for item in items {
                if let Some(host) = scalar_str(item) {
                    into.push(host);
                }
            }
        }
        _ => {}
    }
}
