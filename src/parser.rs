use crate::graph::{Edge, Graph, Task};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// One line of a graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Task(Task),
    Edge(Edge),
}

fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if !obj.contains_key(to) {
        if let Some(v) = obj.remove(from) {
            obj.insert(to.to_string(), v);
        }
    } else {
        obj.remove(from);
    }
}

fn canonical_status(status: &str) -> Option<&'static str> {
    match status {
        "designed" | "available" => Some("available"),
        "running" | "in_progress" | "in-progress" => Some("in-progress"),
        "concluded" | "done" | "completed" => Some("completed"),
        "abandoned" => Some("abandoned"),
        _ => None,
    }
}

/// Field names older snapshots used for quest membership
const QUEST_KEYS: &[&str] = &[
    "quests",
    "questIds",
    "quest_ids",
    "inquiries",
    "inquiryIds",
    "inquiry_ids",
];

/// Rewrite a raw record from the older "experiment/inquiry" vocabulary (or
/// the camelCase API shape) into the canonical task/edge schema. Records
/// already in canonical form pass through unchanged.
pub fn migrate_record(value: Value) -> Value {
    let Value::Object(mut obj) = value else {
        return value;
    };

    let declared = obj.get("kind").and_then(Value::as_str).map(str::to_owned);
    let kind = match declared.as_deref() {
        Some("experiment") | Some("task") => "task",
        Some("dependency") | Some("link") | Some("edge") => "edge",
        // Unknown kinds pass through and fail deserialisation with a line number
        Some(_) => return Value::Object(obj),
        None if (obj.contains_key("source") || obj.contains_key("from"))
            && (obj.contains_key("target") || obj.contains_key("to")) =>
        {
            "edge"
        }
        None => "task",
    };
    obj.insert("kind".to_string(), Value::String(kind.to_string()));

    if kind == "edge" {
        rename_key(&mut obj, "from", "source");
        rename_key(&mut obj, "to", "target");
        return Value::Object(obj);
    }

    rename_key(&mut obj, "name", "title");

    let canonical = obj
        .get("status")
        .and_then(Value::as_str)
        .and_then(canonical_status);
    if let Some(status) = canonical {
        obj.insert("status".to_string(), Value::String(status.to_string()));
    }

    let mut quests: Vec<Value> = Vec::new();
    for key in QUEST_KEYS {
        if let Some(Value::Array(ids)) = obj.remove(*key) {
            for id in ids {
                if !quests.contains(&id) {
                    quests.push(id);
                }
            }
        }
    }
    if !quests.is_empty() {
        obj.insert("quests".to_string(), Value::Array(quests));
    }

    if obj.get("position").is_some_and(Value::is_null) {
        obj.remove("position");
    }

    Value::Object(obj)
}

/// Parse one snapshot line, migrating legacy shapes first
pub fn parse_record(line: &str) -> Result<Record, serde_json::Error> {
    let raw: Value = serde_json::from_str(line)?;
    serde_json::from_value(migrate_record(raw))
}

/// Load a graph from a JSONL snapshot.
///
/// Self loops and repeated edges are dropped with a warning. Edges naming
/// unknown tasks are kept; every consumer tolerates them.
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph, ParseError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut graph = Graph::new();
    let mut edges = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = parse_record(trimmed).map_err(|e| ParseError::Json {
            line: line_num + 1,
            source: e,
        })?;
        match record {
            Record::Task(task) => {
                if graph.contains(&task.id) {
                    tracing::warn!(
                        id = %task.id,
                        line = line_num + 1,
                        "duplicate task id, overwriting previous definition"
                    );
                }
                graph.add_task(task);
            }
            Record::Edge(edge) => edges.push((line_num + 1, edge)),
        }
    }

    for (line, edge) in edges {
        let (source, target) = (edge.source.clone(), edge.target.clone());
        if !graph.push_edge_unchecked(edge) {
            tracing::warn!(%source, %target, line, "skipping self loop or duplicate edge");
        }
    }

    let dangling = graph
        .edges()
        .iter()
        .filter(|e| !graph.contains(&e.source) || !graph.contains(&e.target))
        .count();
    if dangling > 0 {
        tracing::warn!(dangling, "graph has edges referencing unknown tasks");
    }

    Ok(graph)
}

/// Save a graph to a JSONL file: tasks first, then edges.
/// Writes to a temp file and renames it into place so a crash mid-write
/// leaves the previous snapshot intact.
pub fn save_graph<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<(), ParseError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;
    let tmp_path = parent.join(format!(".graph.tmp.{}", std::process::id()));

    let result = (|| -> Result<(), ParseError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;

        let records = graph
            .tasks()
            .iter()
            .cloned()
            .map(Record::Task)
            .chain(graph.edges().iter().cloned().map(Record::Edge));
        for record in records {
            let json = serde_json::to_string(&record)
                .map_err(|e| ParseError::Json { line: 0, source: e })?;
            writeln!(file, "{}", json)?;
        }

        file.flush()?;
        file.sync_all()?;
        Ok(())
    })();

    if result.is_ok() {
        std::fs::rename(&tmp_path, path)?;
    } else {
        let _ = std::fs::remove_file(&tmp_path);
    }

    result
}
