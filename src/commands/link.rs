use anyhow::{Context, Result};
use std::path::Path;

use orrery::check::check_cycles;
use orrery::parser::save_graph;

/// Add a dependency: `target` waits on `source`
pub fn link(dir: &Path, source: &str, target: &str) -> Result<()> {
    let (mut graph, path) = super::load_project(dir)?;
    graph.add_edge(source, target)?;

    if check_cycles(&graph)
        .iter()
        .any(|c| c.iter().any(|id| id == source) && c.iter().any(|id| id == target))
    {
        eprintln!(
            "Warning: {} -> {} closes a cycle; tasks on it will stay locked",
            source, target
        );
    }

    save_graph(&graph, &path).context("Failed to save graph")?;
    println!("Linked {} -> {}", source, target);
    Ok(())
}

pub fn unlink(dir: &Path, source: &str, target: &str) -> Result<()> {
    let (mut graph, path) = super::load_project(dir)?;
    if graph.remove_edge(source, target).is_none() {
        anyhow::bail!("No edge {} -> {}", source, target);
    }
    save_graph(&graph, &path).context("Failed to save graph")?;
    println!("Unlinked {} -> {}", source, target);
    Ok(())
}
