use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use orrery::check::{CompletedAhead, OrphanRef, check_all};

#[derive(Serialize)]
struct CheckJsonOutput {
    ok: bool,
    cycles: Vec<Vec<String>>,
    orphan_refs: Vec<OrphanRef>,
    completed_ahead: Vec<CompletedAhead>,
    node_count: usize,
    edge_count: usize,
    warnings: usize,
    errors: usize,
}

pub fn run(dir: &Path, json: bool) -> Result<()> {
    let (graph, _path) = super::load_project(dir)?;
    let result = check_all(&graph);

    let warnings = result.cycles.len() + result.completed_ahead.len();
    let errors = result.orphan_refs.len();

    if json {
        let output = CheckJsonOutput {
            ok: result.ok,
            cycles: result.cycles,
            orphan_refs: result.orphan_refs,
            completed_ahead: result.completed_ahead,
            node_count: graph.len(),
            edge_count: graph.edges().len(),
            warnings,
            errors,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        if errors > 0 {
            anyhow::bail!("Found {} error(s) and {} warning(s)", errors, warnings);
        }
        return Ok(());
    }

    // Cycles are warnings: layout still places every task
    if !result.cycles.is_empty() {
        eprintln!("Warning: Cycles detected (tasks on a cycle stay locked):");
        for group in &result.cycles {
            eprintln!("  {}", cycle_group_line(group));
        }
    }

    if !result.completed_ahead.is_empty() {
        eprintln!("Warning: Completed tasks with unfinished upstream:");
        for ahead in &result.completed_ahead {
            eprintln!(
                "  {} (upstream: {})",
                ahead.task_id,
                ahead.pending_upstream.join(", ")
            );
        }
    }

    // Orphan references are errors
    if !result.orphan_refs.is_empty() {
        eprintln!("Error: Orphan references:");
        for orphan in &result.orphan_refs {
            eprintln!(
                "  {} -> {} ({} not found)",
                orphan.source, orphan.target, orphan.missing
            );
        }
    }

    if errors > 0 {
        anyhow::bail!("Found {} error(s) and {} warning(s)", errors, warnings);
    } else if warnings > 0 {
        println!("Graph OK: {} nodes, {} warning(s)", graph.len(), warnings);
    } else {
        println!("Graph OK: {} nodes, no issues found", graph.len());
    }

    Ok(())
}

/// Members of one strongly connected group, unordered along the cycle
fn cycle_group_line(group: &[String]) -> String {
    format!("cycle group: {}", group.join(", "))
}
