//! Run the force simulation frame by frame, optionally replaying a drag
//!
//! Usage:
//!   orrery simulate                               # Settle and print positions
//!   orrery simulate --drag a --to 300,200         # Drag 'a', release, resettle
//!   orrery simulate --drag a --to 300,200 --stick # Keep 'a' where it was dropped

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use orrery::config::Config;
use orrery::graph::Point;
use orrery::layout::{Bounds, Simulation};
use orrery::parser::save_graph;

use super::layout::{PositionInfo, print_positions};

/// Ticks spent moving the cursor from the body to the drop point
const DRAG_FRAMES: usize = 30;

#[derive(Debug, Serialize)]
struct SimulateJsonOutput {
    steps: usize,
    settled: bool,
    alpha: f64,
    kinetic_energy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_at: Option<Point>,
    positions: Vec<PositionInfo>,
}

pub fn run(
    dir: &Path,
    max_steps: Option<usize>,
    drag: Option<&str>,
    to: Option<Point>,
    stick: bool,
    json: bool,
) -> Result<()> {
    let (mut graph, path) = super::load_project(dir)?;
    let config = Config::load(dir)?.layout;
    let max_steps = max_steps.unwrap_or(config.force.max_iterations);
    let center = Bounds::new(config.width, config.height).center();

    let mut sim = Simulation::new(graph.tasks(), graph.edges(), &config.force, center);
    let mut steps = sim.run_until_settled(max_steps);

    let mut pinned_at = None;
    if let Some(id) = drag {
        let to = to.context("--drag needs a drop point, e.g. --to 300,200")?;
        let from = sim
            .position(id)
            .with_context(|| format!("Task '{}' not found", id))?;

        sim.drag_start(id)?;
        for frame in 1..=DRAG_FRAMES {
            let cursor = if frame == DRAG_FRAMES {
                to
            } else {
                let t = frame as f64 / DRAG_FRAMES as f64;
                Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
            };
            sim.drag_move(id, cursor)?;
            if sim.step() {
                steps += 1;
            }
        }
        pinned_at = sim.drag_end(id, stick)?;
        steps += sim.run_until_settled(max_steps);

        if let Some(point) = pinned_at {
            graph.set_position(id, point)?;
            save_graph(&graph, &path).context("Failed to save graph")?;
        }
    }

    let positions = sim.positions();
    let infos: Vec<PositionInfo> = graph
        .tasks()
        .iter()
        .filter_map(|task| {
            positions.get(&task.id).map(|p| PositionInfo {
                id: task.id.clone(),
                x: p.x,
                y: p.y,
                pinned: task.is_pinned(),
            })
        })
        .collect();

    if json {
        let output = SimulateJsonOutput {
            steps,
            settled: sim.is_settled(),
            alpha: sim.alpha(),
            kinetic_energy: sim.kinetic_energy(),
            pinned_at,
            positions: infos,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_positions(&infos);
    println!(
        "\n{} step(s), {}",
        steps,
        if sim.is_settled() {
            "settled"
        } else {
            "not settled (raise --max-steps)"
        }
    );
    if let (Some(id), Some(point)) = (drag, pinned_at) {
        println!("Pinned '{}' at ({:.1}, {:.1})", id, point.x, point.y);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery::parser::load_graph;
    use orrery::test_helpers::{graph_from, setup_project};
    use tempfile::TempDir;

    #[test]
    fn test_simulate_without_drag_leaves_graph_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = setup_project(tmp.path(), &graph_from(&["a", "b"], &[("a", "b")]));
        run(tmp.path(), None, None, None, false, false).unwrap();
        assert!(load_graph(&path).unwrap().tasks().iter().all(|t| t.position.is_none()));
    }

    #[test]
    fn test_simulate_drag_stick_persists_position() {
        let tmp = TempDir::new().unwrap();
        let path = setup_project(tmp.path(), &graph_from(&["a", "b"], &[("a", "b")]));
        let to = Point::new(900.0, 100.0);
        run(tmp.path(), None, Some("a"), Some(to), true, true).unwrap();

        let graph = load_graph(&path).unwrap();
        assert_eq!(graph.get_task("a").unwrap().position, Some(to));
        assert!(graph.get_task("b").unwrap().position.is_none());
    }

    #[test]
    fn test_simulate_drag_without_stick_does_not_persist() {
        let tmp = TempDir::new().unwrap();
        let path = setup_project(tmp.path(), &graph_from(&["a", "b"], &[]));
        run(tmp.path(), Some(50), Some("a"), Some(Point::new(1.0, 1.0)), false, false).unwrap();
        assert!(load_graph(&path).unwrap().get_task("a").unwrap().position.is_none());
    }

    #[test]
    fn test_simulate_drag_errors() {
        let tmp = TempDir::new().unwrap();
        setup_project(tmp.path(), &graph_from(&["a"], &[]));
        assert!(run(tmp.path(), None, Some("ghost"), Some(Point::default()), false, false).is_err());
        assert!(run(tmp.path(), None, Some("a"), None, false, false).is_err());
    }
}
