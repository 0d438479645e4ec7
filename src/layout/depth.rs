//! Longest-path depth assignment.
//!
//! `depth(n) = 0` without incoming edges, otherwise `1 + max(depth(source))`.
//!
//! Strongly connected groups are collapsed first, so everything outside a
//! cycle is a plain longest path over a DAG and is computed once. Inside a
//! group each member gets its own walk with a fresh path set: a member met
//! again on the current path contributes 0. Walks memoise per call, which
//! keeps the cost polynomial in the size of the group.

use std::collections::{HashMap, HashSet};

use petgraph::Direction::Incoming;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::Edge;

/// One member's walk through its cycle group
struct GroupWalk<'g> {
    graph: &'g DiGraph<(), ()>,
    members: &'g HashSet<NodeIndex>,
    /// Depth contributed by predecessors outside the group
    entry: &'g HashMap<NodeIndex, usize>,
    on_path: HashSet<NodeIndex>,
    memo: HashMap<NodeIndex, usize>,
}

impl GroupWalk<'_> {
    fn depth_of(&mut self, node: NodeIndex) -> usize {
        if self.on_path.contains(&node) {
            return 0;
        }
        if let Some(&depth) = self.memo.get(&node) {
            return depth;
        }

        self.on_path.insert(node);
        let mut depth = self.entry.get(&node).copied().unwrap_or(0);
        let sources: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Incoming)
            .filter(|p| self.members.contains(p))
            .collect();
        for source in sources {
            depth = depth.max(self.depth_of(source) + 1);
        }
        self.on_path.remove(&node);

        self.memo.insert(node, depth);
        depth
    }
}

/// Compute the depth of every id. Edges touching unknown ids are ignored.
pub fn compute_depths<'a>(ids: &[&'a str], edges: &'a [Edge]) -> HashMap<&'a str, usize> {
    let mut graph: DiGraph<(), ()> = DiGraph::new();
    let mut nodes: HashMap<&'a str, NodeIndex> = HashMap::with_capacity(ids.len());
    for &id in ids {
        nodes.entry(id).or_insert_with(|| graph.add_node(()));
    }
    for edge in edges {
        if let (Some(&s), Some(&t)) = (
            nodes.get(edge.source.as_str()),
            nodes.get(edge.target.as_str()),
        ) {
            if s != t {
                graph.add_edge(s, t, ());
            }
        }
    }

    // tarjan_scc yields groups in reverse topological order
    let mut depth = vec![0usize; graph.node_count()];
    for group in tarjan_scc(&graph).into_iter().rev() {
        if let &[node] = group.as_slice() {
            let d = graph
                .neighbors_directed(node, Incoming)
                .map(|p| depth[p.index()] + 1)
                .max()
                .unwrap_or(0);
            depth[node.index()] = d;
            continue;
        }

        let members: HashSet<NodeIndex> = group.iter().copied().collect();
        let entry: HashMap<NodeIndex, usize> = group
            .iter()
            .map(|&n| {
                let d = graph
                    .neighbors_directed(n, Incoming)
                    .filter(|p| !members.contains(p))
                    .map(|p| depth[p.index()] + 1)
                    .max()
                    .unwrap_or(0);
                (n, d)
            })
            .collect();

        let resolved: Vec<(NodeIndex, usize)> = group
            .iter()
            .map(|&n| {
                let mut walk = GroupWalk {
                    graph: &graph,
                    members: &members,
                    entry: &entry,
                    on_path: HashSet::new(),
                    memo: HashMap::new(),
                };
                (n, walk.depth_of(n))
            })
            .collect();
        for (n, d) in resolved {
            depth[n.index()] = d;
        }
    }

    ids.iter()
        .filter_map(|&id| nodes.get(id).map(|n| (id, depth[n.index()])))
        .collect()
}

/// Number of nodes at each depth
pub fn siblings_per_depth(depths: &HashMap<&str, usize>) -> HashMap<usize, usize> {
    let mut counts = HashMap::new();
    for &depth in depths.values() {
        *counts.entry(depth).or_insert(0) += 1;
    }
    counts
}
