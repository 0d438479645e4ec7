use crate::graph::{Graph, Status};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use serde::Serialize;
use std::collections::HashMap;

/// Result of checking the graph for issues
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub cycles: Vec<Vec<String>>,
    pub orphan_refs: Vec<OrphanRef>,
    pub completed_ahead: Vec<CompletedAhead>,
    pub ok: bool,
}

/// An edge endpoint naming a task that does not exist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanRef {
    pub source: String,
    pub target: String,
    /// Which side of the edge is missing: "source" or "target"
    pub missing: String,
}

/// A completed task whose upstream is not completed, typically because the
/// edge was added afterwards. The task still displays as completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedAhead {
    pub task_id: String,
    pub pending_upstream: Vec<String>,
}

/// Strongly connected groups of two or more tasks, each listed in graph order.
/// Layout tolerates these; they are reported so they can be fixed at the source.
pub fn check_cycles(graph: &Graph) -> Vec<Vec<String>> {
    let mut pg: DiGraph<usize, ()> = DiGraph::new();
    let mut nodes = HashMap::new();
    for (order, task) in graph.tasks().iter().enumerate() {
        nodes.insert(task.id.as_str(), pg.add_node(order));
    }
    for edge in graph.edges() {
        if let (Some(&s), Some(&t)) = (
            nodes.get(edge.source.as_str()),
            nodes.get(edge.target.as_str()),
        ) {
            pg.add_edge(s, t, ());
        }
    }

    let mut cycles: Vec<Vec<usize>> = tarjan_scc(&pg)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut orders: Vec<usize> = scc.into_iter().map(|ix| pg[ix]).collect();
            orders.sort_unstable();
            orders
        })
        .collect();
    cycles.sort();

    let tasks = graph.tasks();
    cycles
        .into_iter()
        .map(|c| c.into_iter().map(|i| tasks[i].id.clone()).collect())
        .collect()
}

/// Check for edges pointing at non-existent tasks
pub fn check_orphans(graph: &Graph) -> Vec<OrphanRef> {
    let mut orphans = Vec::new();

    for edge in graph.edges() {
        for (side, id) in [("source", &edge.source), ("target", &edge.target)] {
            if !graph.contains(id) {
                orphans.push(OrphanRef {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    missing: side.to_string(),
                });
            }
        }
    }

    orphans
}

/// Check for completed tasks that sit downstream of unfinished ones
pub fn check_completed_ahead(graph: &Graph) -> Vec<CompletedAhead> {
    graph
        .tasks()
        .iter()
        .filter(|t| t.status == Status::Completed)
        .filter_map(|task| {
            let pending: Vec<String> = graph
                .incoming(&task.id)
                .filter(|e| {
                    graph
                        .get_task(&e.source)
                        .is_some_and(|s| s.status != Status::Completed)
                })
                .map(|e| e.source.clone())
                .collect();
            if pending.is_empty() {
                None
            } else {
                Some(CompletedAhead {
                    task_id: task.id.clone(),
                    pending_upstream: pending,
                })
            }
        })
        .collect()
}

/// Run all checks and return a summary
pub fn check_all(graph: &Graph) -> CheckResult {
    let cycles = check_cycles(graph);
    let orphan_refs = check_orphans(graph);
    let completed_ahead = check_completed_ahead(graph);

    // Cycles and completed-ahead tasks are warnings; only dangling edges
    // make the graph invalid
    let ok = orphan_refs.is_empty();

    CheckResult {
        cycles,
        orphan_refs,
        completed_ahead,
        ok,
    }
}
