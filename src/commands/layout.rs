//! Print the resolved position of every task
//!
//! Usage:
//!   orrery layout                       # Strategy from config.toml (default dag)
//!   orrery layout --strategy force      # Force-directed, run to settlement
//!   orrery layout --width 1600 --height 900 --json

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use orrery::config::Config;
use orrery::layout::dag::layered;
use orrery::layout::{LayoutStrategy, overlay_manual, resolve_positions};

#[derive(Debug, Serialize)]
pub(crate) struct PositionInfo {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub pinned: bool,
}

#[derive(Debug, Serialize)]
struct LayoutJsonOutput {
    strategy: LayoutStrategy,
    positions: Vec<PositionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crossings: Option<usize>,
}

pub fn run(
    dir: &Path,
    strategy: Option<LayoutStrategy>,
    width: Option<f64>,
    height: Option<f64>,
    json: bool,
) -> Result<()> {
    let (graph, _path) = super::load_project(dir)?;
    let mut config = Config::load(dir)?.layout;
    if let Some(width) = width {
        config.width = width;
    }
    if let Some(height) = height {
        config.height = height;
    }
    config.validate().context("Invalid layout settings")?;
    let strategy = strategy.unwrap_or(config.strategy);

    let (positions, dag) = match strategy {
        LayoutStrategy::Dag => {
            let dag = layered(graph.tasks(), graph.edges(), &config.dag);
            let mut positions = dag.positions.clone();
            overlay_manual(&graph, &mut positions);
            (positions, Some(dag))
        }
        LayoutStrategy::Force => (resolve_positions(&graph, strategy, &config), None),
    };
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

    let crossings = dag.as_ref().map(|d| d.crossings(graph.edges()));

    if json {
        let output = LayoutJsonOutput {
            strategy,
            positions: infos,
            columns: dag.map(|d| d.columns),
            crossings,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_positions(&infos);
    if let (Some(dag), Some(crossings)) = (&dag, crossings) {
        println!(
            "\n{} column(s), {} crossing(s) between adjacent columns",
            dag.columns.len(),
            crossings
        );
    }
    Ok(())
}

pub(crate) fn print_positions(infos: &[PositionInfo]) {
    if infos.is_empty() {
        println!("No tasks");
        return;
    }
    let width = infos.iter().map(|p| p.id.len()).max().unwrap_or(0);
    for info in infos {
        let pin = if info.pinned { "  (pinned)" } else { "" };
        println!(
            "  {:<width$}  {:>9.1} {:>9.1}{}",
            info.id,
            info.x,
            info.y,
            pin,
            width = width
        );
    }
}
