//! Layered DAG layout.
//!
//! 1. Depth assignment: longest path from roots (see [`super::depth`])
//! 2. Columns: one per depth, `x = padding + depth * column_width`
//! 3. Rows: input order, `y = padding + index * row_height`
//! 4. Crossing reduction: alternating barycenter sweeps over neighbours in
//!    the adjacent column
//! 5. Each column centred on the tallest one
//!
//! Deterministic for a fixed input order. The sweeps only improve crossings
//! locally; zero crossings are not guaranteed.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::config::DagConfig;
use crate::graph::{Edge, Point, Task};

use super::Positions;
use super::depth::compute_depths;

/// Result of a layered layout, with the column structure kept for inspection.
#[derive(Debug, Clone)]
pub struct DagLayout {
    pub positions: Positions,
    /// Task ids per depth, top to bottom
    pub columns: Vec<Vec<String>>,
    pub depths: HashMap<String, usize>,
}

impl DagLayout {
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.depths.get(id).copied()
    }

    /// Number of crossing pairs among edges that join adjacent columns
    pub fn crossings(&self, edges: &[Edge]) -> usize {
        let spans: Vec<(usize, f64, f64)> = edges
            .iter()
            .filter_map(|e| {
                let ds = self.depth_of(&e.source)?;
                let dt = self.depth_of(&e.target)?;
                if dt != ds + 1 {
                    return None;
                }
                let ys = self.positions.get(&e.source)?.y;
                let yt = self.positions.get(&e.target)?.y;
                Some((ds, ys, yt))
            })
            .collect();

        let mut count = 0;
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                if a.0 == b.0 && (a.1 - b.1) * (a.2 - b.2) < 0.0 {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Positions only
pub fn layout_dag(tasks: &[Task], edges: &[Edge], config: &DagConfig) -> Positions {
    layered(tasks, edges, config).positions
}

/// Compute a layered layout. Edges with unknown endpoints are ignored.
pub fn layered(tasks: &[Task], edges: &[Edge], config: &DagConfig) -> DagLayout {
    if tasks.is_empty() {
        return DagLayout {
            positions: Positions::new(),
            columns: Vec::new(),
            depths: HashMap::new(),
        };
    }

    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let known: HashSet<&str> = ids.iter().copied().collect();

    // 1. Depth assignment
    let depths = compute_depths(&ids, edges);

    // Only edges spanning one column pull during crossing reduction
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        let (s, t) = (edge.source.as_str(), edge.target.as_str());
        if known.contains(s) && known.contains(t) && depths[t] == depths[s] + 1 {
            parents.entry(t).or_default().push(s);
            children.entry(s).or_default().push(t);
        }
    }

    // 2. Group into columns, keeping input order
    let max_depth = depths.values().copied().max().unwrap_or(0);
    let mut columns: Vec<Vec<&str>> = vec![Vec::new(); max_depth + 1];
    let mut placed: HashSet<&str> = HashSet::new();
    for &id in &ids {
        if placed.insert(id) {
            columns[depths[id]].push(id);
        }
    }

    // 3. Initial rows
    let mut ys: HashMap<&str, f64> = HashMap::new();
    for column in &columns {
        assign_rows(column, &mut ys, config);
    }

    // 4. Crossing reduction
    if columns.len() > 1 {
        for sweep in 0..config.sweeps {
            if sweep % 2 == 0 {
                for idx in 1..columns.len() {
                    reorder_by_barycenter(&mut columns[idx], &parents, &mut ys, config);
                }
            } else {
                for idx in (0..columns.len() - 1).rev() {
                    reorder_by_barycenter(&mut columns[idx], &children, &mut ys, config);
                }
            }
        }
    }

    // 5. Vertical centering on the tallest column
    let span = |column: &Vec<&str>| column.len().saturating_sub(1) as f64 * config.row_height;
    let tallest = columns.iter().map(span).fold(0.0, f64::max);
    for column in &columns {
        let offset = (tallest - span(column)) / 2.0;
        for &id in column {
            if let Some(y) = ys.get_mut(id) {
                *y += offset;
            }
        }
    }

    let mut positions = Positions::new();
    for &id in &ids {
        let depth = depths[id];
        let x = config.padding + depth as f64 * config.column_width;
        positions.insert(id.to_string(), Point::new(x, ys[id]));
    }

    tracing::debug!(
        nodes = ids.len(),
        columns = columns.len(),
        sweeps = config.sweeps,
        "computed layered layout"
    );

    DagLayout {
        positions,
        columns: columns
            .into_iter()
            .map(|c| c.into_iter().map(str::to_string).collect())
            .collect(),
        depths: depths
            .into_iter()
            .map(|(id, d)| (id.to_string(), d))
            .collect(),
    }
}

fn assign_rows<'a>(column: &[&'a str], ys: &mut HashMap<&'a str, f64>, config: &DagConfig) {
    for (i, &id) in column.iter().enumerate() {
        ys.insert(id, config.padding + i as f64 * config.row_height);
    }
}

/// Sort a column by the mean y of each node's neighbours. Nodes without
/// neighbours go last; the sort is stable.
fn reorder_by_barycenter<'a>(
    column: &mut Vec<&'a str>,
    neighbours: &HashMap<&str, Vec<&str>>,
    ys: &mut HashMap<&'a str, f64>,
    config: &DagConfig,
) {
    let mut keyed: Vec<(&'a str, Option<f64>)> = column
        .iter()
        .map(|&id| {
            let bc = neighbours.get(id).and_then(|ns| {
                let coords: Vec<f64> = ns.iter().filter_map(|n| ys.get(*n).copied()).collect();
                if coords.is_empty() {
                    None
                } else {
                    Some(coords.iter().sum::<f64>() / coords.len() as f64)
                }
            });
            (id, bc)
        })
        .collect();

    keyed.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    *column = keyed.into_iter().map(|(id, _)| id).collect();
    assign_rows(column, ys, config);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(ids: &[&str]) -> Vec<Task> {
        ids.iter().map(|id| Task::new(id, id)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().map(|(s, t)| Edge::new(s, t)).collect()
    }

    #[test]
    fn test_empty_input() {
        let layout = layered(&[], &[], &DagConfig::default());
        assert!(layout.positions.is_empty());
        assert!(layout.columns.is_empty());
    }

    #[test]
    fn test_no_edges_single_column() {
        let config = DagConfig::default();
        let layout = layered(&tasks(&["a", "b", "c"]), &[], &config);
        assert_eq!(layout.columns.len(), 1);
        for p in layout.positions.values() {
            assert_eq!(p.x, config.padding);
        }
        assert_eq!(layout.positions["a"].y, config.padding);
        assert_eq!(layout.positions["c"].y, config.padding + 2.0 * config.row_height);
    }

    #[test]
    fn test_column_x_follows_depth() {
        let config = DagConfig::default();
        let t = tasks(&["a", "b", "c"]);
        let e = edges(&[("a", "b"), ("b", "c")]);
        let positions = layout_dag(&t, &e, &config);
        assert_eq!(positions["a"].x, config.padding);
        assert_eq!(positions["b"].x, config.padding + config.column_width);
        assert_eq!(positions["c"].x, config.padding + 2.0 * config.column_width);
    }

    #[test]
    fn test_sweep_removes_simple_crossing() {
        // a -> c, b -> d, but c and d inserted in the crossing order
        let t = tasks(&["a", "b", "d", "c"]);
        let e = edges(&[("a", "c"), ("b", "d")]);

        let unswept = layered(
            &t,
            &e,
            &DagConfig {
                sweeps: 0,
                ..DagConfig::default()
            },
        );
        assert_eq!(unswept.crossings(&e), 1);

        let swept = layered(&t, &e, &DagConfig::default());
        assert_eq!(swept.crossings(&e), 0);
        assert_eq!(swept.columns[1], vec!["c", "d"]);
    }

    #[test]
    fn test_neighbourless_nodes_sort_last() {
        // lonely has no children, so the R->L sweep pushes it below a
        let t = tasks(&["lonely", "a", "b"]);
        let e = edges(&[("a", "b")]);
        let layout = layered(&t, &e, &DagConfig::default());
        assert_eq!(layout.columns[0], vec!["a", "lonely"]);
        assert_eq!(layout.columns[1], vec!["b"]);
    }

    #[test]
    fn test_shared_parent_pulls_children_together() {
        let t = tasks(&["root", "x", "z", "y"]);
        let e = edges(&[("root", "x"), ("root", "y"), ("z", "y")]);
        let layout = layered(&t, &e, &DagConfig::default());
        assert_eq!(layout.columns[0], vec!["root", "z"]);
        assert_eq!(layout.columns[1], vec!["x", "y"]);
    }

    #[test]
    fn test_long_edges_do_not_pull_in_sweeps() {
        // c, d and e reach y across two columns; only m and n count
        let t = tasks(&["a", "b", "c", "d", "e", "m", "n", "x", "y"]);
        let e = edges(&[
            ("a", "m"),
            ("b", "n"),
            ("m", "y"),
            ("n", "x"),
            ("c", "y"),
            ("d", "y"),
            ("e", "y"),
        ]);
        let layout = layered(&t, &e, &DagConfig::default());
        assert_eq!(layout.depth_of("y"), Some(2));
        assert_eq!(layout.columns[1], vec!["m", "n"]);
        assert_eq!(layout.columns[2], vec!["y", "x"]);
        assert_eq!(layout.crossings(&e), 0);
    }

    #[test]
    fn test_columns_are_centred() {
        let config = DagConfig::default();
        let t = tasks(&["a", "b", "c", "d"]);
        let e = edges(&[("a", "d")]);
        let layout = layered(&t, &e, &config);
        // Column 0 holds a, b, c; column 1 holds d alone at the middle row
        let mid = config.padding + config.row_height;
        assert_eq!(layout.positions["d"].y, mid);
        let ys: Vec<f64> = layout.columns[0]
            .iter()
            .map(|id| layout.positions[id].y)
            .collect();
        let mean = ys.iter().sum::<f64>() / ys.len() as f64;
        assert!((mean - mid).abs() < 1e-9);
    }

    #[test]
    fn test_dangling_edges_do_not_add_nodes() {
        let t = tasks(&["a"]);
        let e = edges(&[("ghost", "a"), ("a", "phantom")]);
        let positions = layout_dag(&t, &e, &DagConfig::default());
        assert_eq!(positions.len(), 1);
        assert!(positions.contains_key("a"));
    }
}
