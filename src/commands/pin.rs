use anyhow::{Context, Result};
use std::path::Path;

use orrery::parser::save_graph;

/// Store a manual position. The task keeps it in every layout until unpinned.
pub fn pin(dir: &Path, id: &str, x: f64, y: f64) -> Result<()> {
    let point = super::check_finite_point(x, y)?;
    let (mut graph, path) = super::load_project(dir)?;
    graph.set_position(id, point)?;
    save_graph(&graph, &path).context("Failed to save graph")?;
    println!("Pinned '{}' at ({}, {})", id, point.x, point.y);
    Ok(())
}

pub fn unpin(dir: &Path, id: &str) -> Result<()> {
    let (mut graph, path) = super::load_project(dir)?;
    match graph.clear_position(id)? {
        Some(_) => {
            save_graph(&graph, &path).context("Failed to save graph")?;
            println!("Unpinned '{}'", id);
        }
        None => println!("Task '{}' was not pinned", id),
    }
    Ok(())
}
