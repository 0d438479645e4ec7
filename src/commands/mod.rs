pub mod add;
pub mod check;
pub mod init;
pub mod layout;
pub mod link;
pub mod pin;
pub mod remove;
pub mod simulate;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orrery::graph::{Graph, Point};
use orrery::parser::load_graph;

pub fn graph_path(dir: &Path) -> PathBuf {
    dir.join("graph.jsonl")
}

/// Load the graph from the given project directory.
/// Returns the graph and the path to the graph file (needed for save_graph).
pub fn load_project(dir: &Path) -> Result<(Graph, PathBuf)> {
    let path = graph_path(dir);
    if !path.exists() {
        anyhow::bail!("Orrery not initialized. Run 'orrery init' first.");
    }
    let graph = load_graph(&path).context("Failed to load graph")?;
    Ok((graph, path))
}

/// Parse an `x,y` pair as given on the command line
pub fn parse_point(s: &str) -> Result<Point> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("Expected 'x,y', got '{}'", s))?;
    let x: f64 = x.trim().parse().with_context(|| format!("Invalid x coordinate '{}'", x))?;
    let y: f64 = y.trim().parse().with_context(|| format!("Invalid y coordinate '{}'", y))?;
    check_finite_point(x, y)
}

pub fn check_finite_point(x: f64, y: f64) -> Result<Point> {
    if !x.is_finite() || !y.is_finite() {
        anyhow::bail!("Coordinates must be finite numbers");
    }
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,-2.5").unwrap(), Point::new(10.0, -2.5));
        assert_eq!(parse_point(" 1 , 2 ").unwrap(), Point::new(1.0, 2.0));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
        assert!(parse_point("inf,0").is_err());
    }

    #[test]
    fn test_load_project_requires_init() {
        let tmp = TempDir::new().unwrap();
        let err = load_project(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }
}
