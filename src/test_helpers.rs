use crate::graph::{Graph, Status, Task};
use crate::parser::save_graph;
use std::path::{Path, PathBuf};

/// Create a task with the given id and title, with all other fields defaulted.
pub fn make_task(id: &str, title: &str) -> Task {
    Task::new(id, title)
}

/// Create a task with the given id, title, and status.
pub fn make_task_with_status(id: &str, title: &str, status: Status) -> Task {
    Task {
        status,
        ..Task::new(id, title)
    }
}

/// Build a graph from ids (titled after themselves) and dependency pairs.
/// Panics on an invalid edge; meant for tests only.
pub fn graph_from(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for id in ids {
        graph.add_task(make_task(id, id));
    }
    for (source, target) in edges {
        graph.add_edge(source, target).unwrap();
    }
    graph
}

/// Create an `.orrery` directory at `dir`, save `graph` into it, and return
/// the path to the graph file.
pub fn setup_project(dir: &Path, graph: &Graph) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("graph.jsonl");
    save_graph(graph, &path).unwrap();
    path
}
