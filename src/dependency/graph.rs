// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Dependency graph over requirement ids.
//!
//! Nodes live in an arena indexed by position; ids map to positions through
//! a side table. Edges that point outside the batch are not synthesized into
//! nodes, they are returned as [`DanglingReference`]s.

use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::types::Requirement;

/// One requirement's edges in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    pub id: String,
    /// Declared dependencies, copied verbatim (dangling ids included).
    pub depends_on: Vec<String>,
    /// Requirements in the batch that depend on this one.
    pub dependents: Vec<String>,
    /// Resolved in-batch targets of `depends_on`, deduplicated.
    #[serde(skip)]
    edges: Vec<usize>,
}

/// A declared dependency on an id that is not in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub source_id: String,
    pub missing_target_id: String,
}

/// Read-only view of the requirement dependency structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Build the graph in two passes: nodes first, then reverse edges.
    ///
    /// Runs in O(n + e). If the same id shows up twice only the first
    /// requirement becomes a node.
    pub fn build(requirements: &[Requirement]) -> (Self, Vec<DanglingReference>) {
        let mut nodes: Vec<DependencyNode> = Vec::with_capacity(requirements.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(requirements.len());

        for req in requirements {
            if index.contains_key(req.id()) {
                warn!(requirement_id = req.id(), "duplicate requirement id ignored by graph");
                continue;
            }
            index.insert(req.id().to_string(), nodes.len());
            nodes.push(DependencyNode {
                id: req.id().to_string(),
                depends_on: req.dependencies().to_vec(),
                dependents: Vec::new(),
                edges: Vec::new(),
            });
        }

        let mut dangling = Vec::new();
        for source in 0..nodes.len() {
            for target_id in nodes[source].depends_on.clone() {
                match index.get(&target_id) {
                    Some(&target) => {
                        if nodes[source].edges.contains(&target) {
                            continue;
                        }
                        nodes[source].edges.push(target);
                        let source_id = nodes[source].id.clone();
                        nodes[target].dependents.push(source_id);
                    }
                    None => dangling.push(DanglingReference {
                        source_id: nodes[source].id.clone(),
                        missing_target_id: target_id,
                    }),
                }
            }
        }

        if !dangling.is_empty() {
            warn!(count = dangling.len(), "requirements reference ids outside the batch");
        }

        (Self { nodes, index }, dangling)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in input order.
    pub fn nodes(&self) -> &[DependencyNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&DependencyNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn id_at(&self, position: usize) -> &str {
        &self.nodes[position].id
    }

    /// Arena positions of the in-batch targets of the node at `position`.
    pub(crate) fn edges_at(&self, position: usize) -> &[usize] {
        &self.nodes[position].edges
    }
}
