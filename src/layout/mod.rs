//! Auto-layout for the task graph.
//!
//! Two interchangeable strategies compute a position per task:
//!
//! - [`dag`]: deterministic layered layout with barycentric crossing reduction
//! - [`force`]: force-directed relaxation, single shot or stepped per frame
//!
//! [`resolve_positions`] runs one of them and overlays manual placements.

pub mod dag;
pub mod depth;
pub mod force;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::graph::Graph;
pub use crate::graph::Point;

pub use dag::{DagLayout, layout_dag};
pub use force::{Simulation, compute_layout};

/// Position per task id. Exactly one entry per input task.
pub type Positions = BTreeMap<String, Point>;

#[derive(Error, Debug, PartialEq)]
pub enum LayoutError {
    #[error("Node '{0}' is not part of the simulation")]
    UnknownNode(String),
    #[error("Invalid layout config: {0}")]
    InvalidConfig(String),
}

/// Viewport size for the force layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Layout strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    /// Layered columns by dependency depth
    #[default]
    Dag,
    /// Force-directed relaxation
    Force,
}

impl std::str::FromStr for LayoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dag" | "layered" => Ok(LayoutStrategy::Dag),
            "force" | "physics" => Ok(LayoutStrategy::Force),
            _ => Err(format!("Unknown strategy: {}. Use 'dag' or 'force'.", s)),
        }
    }
}

/// Auto layout only, ignoring manual positions in the output
pub fn layout(graph: &Graph, strategy: LayoutStrategy, config: &LayoutConfig) -> Positions {
    match strategy {
        LayoutStrategy::Dag => layout_dag(graph.tasks(), graph.edges(), &config.dag),
        LayoutStrategy::Force => compute_layout(
            graph.tasks(),
            graph.edges(),
            Bounds::new(config.width, config.height),
            &config.force,
        ),
    }
}

/// Final position of every task: auto layout with manual positions on top.
///
/// In the force strategy pinned tasks also act as fixed obstacles while the
/// rest of the graph settles around them.
pub fn resolve_positions(
    graph: &Graph,
    strategy: LayoutStrategy,
    config: &LayoutConfig,
) -> Positions {
    let mut positions = layout(graph, strategy, config);
    overlay_manual(graph, &mut positions);
    positions
}

/// Replace auto positions with each task's stored manual position
pub fn overlay_manual(graph: &Graph, positions: &mut Positions) {
    for task in graph.tasks() {
        if let Some(point) = task.position {
            positions.insert(task.id.clone(), point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Task;

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        for id in ["a", "b", "c"] {
            graph.add_task(Task::new(id, id));
        }
        graph.add_edge("a", "b").unwrap();
        graph.add_edge("b", "c").unwrap();
        graph
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("dag".parse::<LayoutStrategy>().unwrap(), LayoutStrategy::Dag);
        assert_eq!(
            "FORCE".parse::<LayoutStrategy>().unwrap(),
            LayoutStrategy::Force
        );
        assert!("grid".parse::<LayoutStrategy>().is_err());
    }

    #[test]
    fn test_bounds_center() {
        assert_eq!(Bounds::new(100.0, 50.0).center(), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_manual_position_wins_in_both_strategies() {
        let mut graph = sample_graph();
        let manual = Point::new(-999.5, 1234.25);
        graph.set_position("b", manual).unwrap();

        let config = LayoutConfig::default();
        for strategy in [LayoutStrategy::Dag, LayoutStrategy::Force] {
            let positions = resolve_positions(&graph, strategy, &config);
            assert_eq!(positions.len(), 3);
            assert_eq!(positions["b"], manual);
        }
    }

    #[test]
    fn test_overlay_on_layered_output_matches_resolve() {
        let mut graph = sample_graph();
        graph.set_position("c", Point::new(7.0, -3.5)).unwrap();
        let config = LayoutConfig::default();

        let dag = dag::layered(graph.tasks(), graph.edges(), &config.dag);
        let mut positions = dag.positions.clone();
        overlay_manual(&graph, &mut positions);

        assert_eq!(positions["c"], Point::new(7.0, -3.5));
        assert_eq!(positions["a"], dag.positions["a"]);
        assert_eq!(positions, resolve_positions(&graph, LayoutStrategy::Dag, &config));
    }

    #[test]
    fn test_resolve_positions_empty_graph() {
        let graph = Graph::new();
        let config = LayoutConfig::default();
        for strategy in [LayoutStrategy::Dag, LayoutStrategy::Force] {
            assert!(resolve_positions(&graph, strategy, &config).is_empty());
        }
    }
}
