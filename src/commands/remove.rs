use anyhow::{Context, Result};
use std::path::Path;

use orrery::parser::save_graph;

pub fn run(dir: &Path, id: &str) -> Result<()> {
    let (mut graph, path) = super::load_project(dir)?;
    let edges_before = graph.edges().len();

    let task = graph
        .remove_task(id)
        .ok_or_else(|| anyhow::anyhow!("Task '{}' not found", id))?;
    let dropped = edges_before - graph.edges().len();

    save_graph(&graph, &path).context("Failed to save graph")?;
    println!(
        "Removed task: {} ({}), {} edge(s) dropped",
        task.title, task.id, dropped
    );
    Ok(())
}
