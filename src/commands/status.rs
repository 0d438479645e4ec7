//! Effective status of every task
//!
//! Usage:
//!   orrery status                # One line per task
//!   orrery status --focus <id>   # Treat <id> as the task being worked on
//!   orrery status --json         # Machine-readable JSON output

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use orrery::graph::Status;
use orrery::status::{EffectiveStatus, resolve_all, unlocked_by};

#[derive(Debug, Serialize)]
struct TaskStatusInfo {
    id: String,
    title: String,
    stored: Status,
    effective: EffectiveStatus,
    pinned: bool,
}

#[derive(Debug, Serialize)]
struct StatusJsonOutput {
    tasks: Vec<TaskStatusInfo>,
    counts: BTreeMap<&'static str, usize>,
    /// Tasks that completing the focused task would unlock
    #[serde(skip_serializing_if = "Option::is_none")]
    unlocks: Option<Vec<String>>,
}

pub fn run(dir: &Path, focus: Option<&str>, json: bool) -> Result<()> {
    let (graph, _path) = super::load_project(dir)?;

    if let Some(id) = focus {
        if !graph.contains(id) {
            anyhow::bail!("Task '{}' not found", id);
        }
    }

    let resolved = resolve_all(&graph, focus);
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let tasks: Vec<TaskStatusInfo> = resolved
        .into_iter()
        .filter_map(|(id, effective)| {
            let task = graph.get_task(id)?;
            *counts.entry(effective.as_str()).or_default() += 1;
            Some(TaskStatusInfo {
                id: task.id.clone(),
                title: task.title.clone(),
                stored: task.status,
                effective,
                pinned: task.is_pinned(),
            })
        })
        .collect();

    let unlocks = focus.map(|id| {
        unlocked_by(&graph, id)
            .into_iter()
            .map(|t| t.id.clone())
            .collect::<Vec<_>>()
    });

    if json {
        let output = StatusJsonOutput {
            tasks,
            counts,
            unlocks,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    let width = tasks.iter().map(|t| t.id.len()).max().unwrap_or(0);
    for task in &tasks {
        let pin = if task.pinned { " (pinned)" } else { "" };
        println!(
            "  {:<12} {:<width$}  {}{}",
            format!("[{}]", task.effective.as_str()),
            task.id,
            task.title,
            pin,
            width = width
        );
    }

    let summary: Vec<String> = counts
        .iter()
        .map(|(status, n)| format!("{} {}", n, status))
        .collect();
    println!("\n{} task(s): {}", tasks.len(), summary.join(", "));

    if let (Some(id), Some(unlocks)) = (focus, unlocks) {
        if unlocks.is_empty() {
            println!("Completing '{}' unlocks nothing new", id);
        } else {
            println!("Completing '{}' unlocks: {}", id, unlocks.join(", "));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery::test_helpers::{graph_from, setup_project};
    use tempfile::TempDir;

    #[test]
    fn test_status_runs_on_graph() {
        let tmp = TempDir::new().unwrap();
        setup_project(tmp.path(), &graph_from(&["a", "b"], &[("a", "b")]));
        run(tmp.path(), None, false).unwrap();
        run(tmp.path(), Some("a"), true).unwrap();
    }

    #[test]
    fn test_status_unknown_focus() {
        let tmp = TempDir::new().unwrap();
        setup_project(tmp.path(), &graph_from(&["a"], &[]));
        assert!(run(tmp.path(), Some("ghost"), false).is_err());
    }
}
