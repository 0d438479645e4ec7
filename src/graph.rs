use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A 2D coordinate in layout space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Stored task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Available,
    InProgress,
    Completed,
    Abandoned,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Available => "available",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::Abandoned => "abandoned",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" | "designed" => Ok(Status::Available),
            "in-progress" | "in_progress" | "running" => Ok(Status::InProgress),
            "completed" | "concluded" | "done" => Ok(Status::Completed),
            "abandoned" => Ok(Status::Abandoned),
            _ => Err(format!(
                "Unknown status: {}. Use 'available', 'in-progress', 'completed', or 'abandoned'.",
                s
            )),
        }
    }
}

/// A task node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Status,
    /// Manual placement. A task with a position is pinned during layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Quest ids this task is grouped under
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quests: Vec<String>,
}

impl Task {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Task::default()
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.position.is_some()
    }
}

/// A directed dependency: `source` must be completed before `target` unlocks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Task '{0}' cannot depend on itself")]
    SelfLoop(String),
    #[error("Edge {0} -> {1} already exists")]
    DuplicateEdge(String, String),
    #[error("Task '{0}' not found")]
    UnknownTask(String),
}

/// Lookup of stored status by task id
pub trait StatusLookup {
    fn stored_status(&self, id: &str) -> Option<Status>;
}

impl StatusLookup for HashMap<String, Status> {
    fn stored_status(&self, id: &str) -> Option<Status> {
        self.get(id).copied()
    }
}

/// The task graph. Tasks and edges keep their insertion order so layouts are
/// reproducible for identical input.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    tasks: Vec<Task>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing any existing task with the same id in place
    pub fn add_task(&mut self, task: Task) {
        match self.index.get(&task.id) {
            Some(&idx) => self.tasks[idx] = task,
            None => {
                self.index.insert(task.id.clone(), self.tasks.len());
                self.tasks.push(task);
            }
        }
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&idx| &self.tasks[idx])
    }

    pub fn get_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        match self.index.get(id) {
            Some(&idx) => Some(&mut self.tasks[idx]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Remove a task along with every edge touching it
    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let idx = self.index.remove(id)?;
        let task = self.tasks.remove(idx);
        self.edges.retain(|e| e.source != id && e.target != id);
        self.reindex();
        Some(task)
    }

    fn reindex(&mut self) {
        self.index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Add a dependency edge. Cycles are allowed; self loops and duplicates are not.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        for id in [source, target] {
            if !self.contains(id) {
                return Err(GraphError::UnknownTask(id.to_string()));
            }
        }
        if self.has_edge(source, target) {
            return Err(GraphError::DuplicateEdge(
                source.to_string(),
                target.to_string(),
            ));
        }
        self.edges.push(Edge::new(source, target));
        Ok(())
    }

    /// Push an edge without endpoint validation. Used when loading snapshots,
    /// which may legitimately carry dangling references.
    pub(crate) fn push_edge_unchecked(&mut self, edge: Edge) -> bool {
        if edge.source == edge.target || self.has_edge(&edge.source, &edge.target) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> Option<Edge> {
        let pos = self
            .edges
            .iter()
            .position(|e| e.source == source && e.target == target)?;
        Some(self.edges.remove(pos))
    }

    /// Edges pointing into `id`
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Edges leaving `id`
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn set_position(&mut self, id: &str, point: Point) -> Result<(), GraphError> {
        let task = self
            .get_task_mut(id)
            .ok_or_else(|| GraphError::UnknownTask(id.to_string()))?;
        task.position = Some(point);
        Ok(())
    }

    pub fn clear_position(&mut self, id: &str) -> Result<Option<Point>, GraphError> {
        let task = self
            .get_task_mut(id)
            .ok_or_else(|| GraphError::UnknownTask(id.to_string()))?;
        Ok(task.position.take())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl StatusLookup for Graph {
    fn stored_status(&self, id: &str) -> Option<Status> {
        self.get_task(id).map(|t| t.status)
    }
}
