//! Call-Graph Store (C16).
//!
//! A per-project directed graph over [`FunctionNode`]s, built from
//! [`crate::calls::CallSite`]s. Callers reference callees by qualified name
//! weakly: a call site can be recorded before its callee node exists.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::SupportedLanguage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    pub qualified_name: String,
    pub file_path: String,
    pub language: SupportedLanguage,
    pub start_line: usize,
    pub end_line: usize,
    pub is_exported: bool,
    pub is_async: bool,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
}

#[derive(Debug, Error)]
pub enum CallGraphError {
    #[error("function not found: {0}")]
    NotFound(String),
}

/// Per-project call graph, keyed by qualified function name.
#[derive(Debug, Default)]
pub struct CallGraph {
    graph: DiGraph<FunctionNode, f32>,
    index: HashMap<String, NodeIndex>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or update a function node, keyed by qualified name.
    pub fn upsert_function(&mut self, node: FunctionNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.qualified_name) {
            self.graph[idx] = node;
            idx
        } else {
            let key = node.qualified_name.clone();
            let idx = self.graph.add_node(node);
            self.index.insert(key, idx);
            idx
        }
    }

    /// Record a caller→callee edge, resolving the callee by unqualified
    /// name against known functions in the same project. If the callee is
    /// not yet known, the edge is not recorded (it resolves lazily the next
    /// time that function is indexed and re-links are recomputed).
    pub fn record_call(&mut self, caller_qualified_name: &str, callee_name: &str, confidence: f32) {
        let Some(&caller_idx) = self.index.get(caller_qualified_name) else {
            return;
        };

        let callee_idx = self
            .index
            .iter()
            .find(|(qn, _)| qn.as_str() == callee_name || qn.ends_with(&format!(".{callee_name}")))
            .map(|(_, idx)| *idx);

        if let Some(callee_idx) = callee_idx {
            self.graph.update_edge(caller_idx, callee_idx, confidence);
        }
    }

    pub fn get_function(&self, qualified_name: &str) -> Option<&FunctionNode> {
        self.index.get(qualified_name).map(|&idx| &self.graph[idx])
    }

    pub fn callers_of(&self, qualified_name: &str) -> Vec<&FunctionNode> {
        let Some(&idx) = self.index.get(qualified_name) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .map(|edge| &self.graph[edge.source()])
            .collect()
    }

    pub fn callees_of(&self, qualified_name: &str) -> Vec<&FunctionNode> {
        let Some(&idx) = self.index.get(qualified_name) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .map(|edge| &self.graph[edge.target()])
            .collect()
    }

    /// Shortest ordered sequence of qualified function names connecting
    /// `source` to `target` through call edges (BFS, unweighted).
    pub fn find_call_chain(&self, source: &str, target: &str) -> Result<Vec<String>, CallGraphError> {
        let start = *self
            .index
            .get(source)
            .ok_or_else(|| CallGraphError::NotFound(source.to_string()))?;
        let goal = *self
            .index
            .get(target)
            .ok_or_else(|| CallGraphError::NotFound(target.to_string()))?;

        if start == goal {
            return Ok(vec![self.graph[start].qualified_name.clone()]);
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
                return Ok(chain
                    .into_iter()
                    .map(|idx| self.graph[idx].qualified_name.clone())
                    .collect());
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

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
