use crate::graph::{Edge, Graph, Status, StatusLookup, Task};
use serde::Serialize;

/// Display status derived from stored status and upstream completion.
/// Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Locked,
    Available,
    InProgress,
    Completed,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Locked => "locked",
            EffectiveStatus::Available => "available",
            EffectiveStatus::InProgress => "in_progress",
            EffectiveStatus::Completed => "completed",
        }
    }
}

/// True if some upstream source of `task` exists and is not completed.
/// Sources missing from `lookup` count as satisfied.
pub fn is_locked<L: StatusLookup + ?Sized>(task: &Task, lookup: &L, edges: &[Edge]) -> bool {
    edges
        .iter()
        .filter(|e| e.target == task.id)
        .any(|e| match lookup.stored_status(&e.source) {
            Some(status) => status != Status::Completed,
            None => false,
        })
}

/// Resolve the effective status of one task.
///
/// Precedence: completed, then locked, then in progress (stored or focused),
/// then available.
pub fn resolve_status<L: StatusLookup + ?Sized>(
    task: &Task,
    lookup: &L,
    edges: &[Edge],
    focus: Option<&str>,
) -> EffectiveStatus {
    if task.status == Status::Completed {
        return EffectiveStatus::Completed;
    }
    if is_locked(task, lookup, edges) {
        return EffectiveStatus::Locked;
    }
    if focus == Some(task.id.as_str()) || task.status == Status::InProgress {
        return EffectiveStatus::InProgress;
    }
    EffectiveStatus::Available
}

/// Effective status of every task, in graph order
pub fn resolve_all<'a>(graph: &'a Graph, focus: Option<&str>) -> Vec<(&'a str, EffectiveStatus)> {
    graph
        .tasks()
        .iter()
        .map(|t| {
            (
                t.id.as_str(),
                resolve_status(t, graph, graph.edges(), focus),
            )
        })
        .collect()
}

/// Tasks currently locked that would unlock if `id` were completed
pub fn unlocked_by<'a>(graph: &'a Graph, id: &str) -> Vec<&'a Task> {
    let mut completed = std::collections::HashMap::new();
    for task in graph.tasks() {
        let status = if task.id == id {
            Status::Completed
        } else {
            task.status
        };
        completed.insert(task.id.clone(), status);
    }

    graph
        .outgoing(id)
        .filter_map(|e| graph.get_task(&e.target))
        .filter(|t| t.status != Status::Completed)
        .filter(|t| is_locked(t, graph, graph.edges()))
        .filter(|t| !is_locked(t, &completed, graph.edges()))
        .collect()
}
