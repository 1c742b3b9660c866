//! Dependency Graph: a per-project, file-level import DAG built from
//! [`crate::imports::Import`] records. Mirrors [`crate::callgraph::CallGraph`]'s
//! shape (weak lazy edge resolution, BFS path search) but keyed by file path
//! instead of qualified function name.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DependencyGraphError {
    #[error("file not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyStats {
    pub file_count: usize,
    pub edge_count: usize,
    pub has_cycle: bool,
    pub most_depended_on: Vec<(String, usize)>,
}

fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(idx) if path[idx + 1..].chars().all(|c| c.is_ascii_alphanumeric()) => &path[..idx],
        _ => path,
    }
}

/// Per-project dependency graph, keyed by file path.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Registers a file as a node, returning its index. Idempotent.
    pub fn add_file(&mut self, file_path: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(file_path) {
            return idx;
        }
        let idx = self.graph.add_node(file_path.to_string());
        self.index.insert(file_path.to_string(), idx);
        idx
    }

    /// Records that `from_file` imports `imported_module`, resolved against
    /// already-registered file paths by matching the module path (dots as
    /// separators) against a known file's path with its extension stripped.
    /// An import that resolves to no known file is not recorded as an edge;
    /// it is an external dependency outside this project's indexed set.
    pub fn add_import(&mut self, from_file: &str, imported_module: &str) {
        let from_idx = self.add_file(from_file);
        let candidate = imported_module.trim_start_matches('.').replace('.', "/");
        if candidate.is_empty() {
            return;
        }
        let target = self
            .index
            .iter()
            .find(|(path, _)| path.as_str() != from_file && strip_extension(path).ends_with(candidate.as_str()))
            .map(|(_, idx)| *idx);
        if let Some(to_idx) = target {
            self.graph.update_edge(from_idx, to_idx, ());
        }
    }

    pub fn dependencies_of(&self, file_path: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(file_path) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .map(|edge| self.graph[edge.target()].clone())
            .collect()
    }

    pub fn dependents_of(&self, file_path: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(file_path) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .map(|edge| self.graph[edge.source()].clone())
            .collect()
    }

    /// Shortest ordered sequence of file paths connecting `from` to `to`
    /// through import edges (BFS, unweighted). Empty if unreachable.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>, DependencyGraphError> {
        let start = *self
            .index
            .get(from)
            .ok_or_else(|| DependencyGraphError::NotFound(from.to_string()))?;
        let goal = *self
            .index
            .get(to)
            .ok_or_else(|| DependencyGraphError::NotFound(to.to_string()))?;

        if start == goal {
            return Ok(vec![self.graph[start].clone()]);
        }

        let mut visited = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start, start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                let mut chain = vec![current];
                let mut node = current;
                while let Some(&prev) = visited.get(&node) {
                    if prev == node {
                        break;
                    }
                    chain.push(prev);
                    node = prev;
                }
                chain.reverse();
                return Ok(chain.into_iter().map(|idx| self.graph[idx].clone()).collect());
            }

            for edge in self.graph.edges_directed(current, petgraph::Direction::Outgoing) {
                let next = edge.target();
                if !visited.contains_key(&next) {
                    visited.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        Ok(Vec::new())
    }

    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    pub fn stats(&self) -> DependencyStats {
        let mut most_depended_on: Vec<(String, usize)> = self
            .graph
            .node_indices()
            .map(|idx| {
                let count = self.graph.edges_directed(idx, petgraph::Direction::Incoming).count();
                (self.graph[idx].clone(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        most_depended_on.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        most_depended_on.truncate(10);

        DependencyStats {
            file_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            has_cycle: self.has_cycle(),
            most_depended_on,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_import_to_known_file_by_module_path() {
        let mut graph = DependencyGraph::new();
        graph.add_file("src/app.py");
        graph.add_file("src/util/strings.py");
        graph.add_import("src/app.py", "util.strings");

        assert_eq!(graph.dependencies_of("src/app.py"), vec!["src/util/strings.py".to_string()]);
        assert_eq!(graph.dependents_of("src/util/strings.py"), vec!["src/app.py".to_string()]);
    }

    #[test]
    fn unresolved_import_is_not_an_edge() {
        let mut graph = DependencyGraph::new();
        graph.add_file("src/app.py");
        graph.add_import("src/app.py", "requests");

        assert!(graph.dependencies_of("src/app.py").is_empty());
    }

    #[test]
    fn detects_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_file("a.py");
        graph.add_file("b.py");
        graph.add_import("a.py", "b");
        graph.add_import("b.py", "a");

        assert!(graph.has_cycle());
    }

    #[test]
    fn finds_shortest_path() {
        let mut graph = DependencyGraph::new();
        graph.add_file("a.py");
        graph.add_file("b.py");
        graph.add_file("c.py");
        graph.add_import("a.py", "b");
        graph.add_import("b.py", "c");

        let path = graph.find_path("a.py", "c.py").unwrap();
        assert_eq!(path, vec!["a.py".to_string(), "b.py".to_string(), "c.py".to_string()]);
    }

    #[test]
    fn stats_counts_files_edges_and_fan_in() {
        let mut graph = DependencyGraph::new();
        graph.add_file("a.py");
        graph.add_file("b.py");
        graph.add_file("c.py");
        graph.add_import("a.py", "c");
        graph.add_import("b.py", "c");

        let stats = graph.stats();
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.edge_count, 2);
        assert!(!stats.has_cycle);
        assert_eq!(stats.most_depended_on[0], ("c.py".to_string(), 2));
    }
}
