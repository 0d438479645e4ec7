use anyhow::{Context, Result};
use std::path::Path;

use orrery::graph::{Graph, Status, Task};
use orrery::parser::save_graph;

pub fn run(
    dir: &Path,
    title: &str,
    id: Option<&str>,
    after: &[String],
    status: Option<Status>,
    quests: &[String],
) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Task title cannot be empty");
    }

    let (mut graph, path) = super::load_project(dir)?;

    let task_id = match id {
        Some(id) => {
            if graph.contains(id) {
                anyhow::bail!("Task with ID '{}' already exists", id);
            }
            id.to_string()
        }
        None => generate_id(title, &graph),
    };

    for upstream in after {
        if upstream == &task_id {
            anyhow::bail!("Task '{}' cannot depend on itself", task_id);
        }
        if !graph.contains(upstream) {
            anyhow::bail!("Upstream task '{}' not found", upstream);
        }
    }

    graph.add_task(Task {
        status: status.unwrap_or_default(),
        quests: quests.to_vec(),
        ..Task::new(&task_id, title)
    });
    for upstream in after {
        if !graph.has_edge(upstream, &task_id) {
            graph.add_edge(upstream, &task_id)?;
        }
    }

    save_graph(&graph, &path).context("Failed to save graph")?;
    println!("Added task: {} ({})", title, task_id);
    Ok(())
}

/// Slug of the first three words of the title, suffixed until unique
fn generate_id(title: &str, graph: &Graph) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .take(3)
        .collect::<Vec<_>>()
        .join("-");

    let base_id = if slug.is_empty() {
        "task".to_string()
    } else {
        slug
    };

    if !graph.contains(&base_id) {
        return base_id;
    }

    let mut i = 2;
    loop {
        let candidate = format!("{}-{}", base_id, i);
        if !graph.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
