// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Dependency analysis over a batch of requirements: graph, cycles, levels.

pub mod cycles;
pub mod graph;
pub mod levels;

pub use cycles::find_cycles;
pub use graph::{DanglingReference, DependencyGraph, DependencyNode};
pub use levels::{compute_levels, DependencyLevel};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::types::Requirement;

/// Everything the dependency half of the engine produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyAnalysisResult {
    pub graph: DependencyGraph,
    pub dangling_references: Vec<DanglingReference>,
    pub cycles: Vec<Vec<String>>,
    pub levels: BTreeMap<String, DependencyLevel>,
}

impl DependencyAnalysisResult {
    /// Deepest level in the batch (0 when empty).
    pub fn max_level(&self) -> u32 {
        self.levels.values().map(|l| l.level).max().unwrap_or(0)
    }

    pub fn cyclic_count(&self) -> usize {
        self.levels.values().filter(|l| l.cyclic).count()
    }
}

/// Build the graph, then find cycles and levels over it.
pub fn analyze_dependencies(requirements: &[Requirement]) -> DependencyAnalysisResult {
    let (graph, dangling_references) = DependencyGraph::build(requirements);
    let cycles = find_cycles(&graph);
    let levels = compute_levels(&graph);

    let result = DependencyAnalysisResult {
        graph,
        dangling_references,
        cycles,
        levels,
    };
    info!(
        requirements = result.graph.len(),
        dangling = result.dangling_references.len(),
        cycles = result.cycles.len(),
        max_level = result.max_level(),
        "dependency analysis complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complexity, Priority, RequirementType};

    fn req(id: &str, deps: &[&str]) -> Requirement {
        Requirement::new(
            id,
            Priority::Mandatory,
            Complexity::Medium,
            RequirementType::Compliance,
            deps.iter().map(|d| d.to_string()).collect(),
        )
        .expect("test: requirement")
    }

    #[test]
    fn empty_batch_yields_empty_result() {
        let result = analyze_dependencies(&[]);
        assert!(result.graph.is_empty());
        assert!(result.cycles.is_empty());
        assert!(result.levels.is_empty());
        assert_eq!(result.max_level(), 0);
    }

    #[test]
    fn combined_result_reports_all_parts() {
        let result = analyze_dependencies(&[
            req("A", &["B", "NOPE"]),
            req("B", &["C"]),
            req("C", &["B"]),
            req("D", &["A"]),
        ]);
        assert_eq!(result.dangling_references.len(), 1);
        assert_eq!(result.cycles.len(), 1);
        assert_eq!(result.cyclic_count(), 2);
        assert_eq!(result.levels["A"].level, 1);
        assert_eq!(result.levels["D"].level, 2);
        assert_eq!(result.max_level(), 2);
    }

    #[test]
    fn result_serializes_graph_nodes() {
        let result = analyze_dependencies(&[req("A", &["B"]), req("B", &[])]);
        let json = serde_json::to_value(&result).expect("test: serialize");
        assert_eq!(json["graph"]["nodes"][1]["dependents"][0], "A");
        assert_eq!(json["levels"]["A"]["level"], 1);
        assert_eq!(json["levels"]["A"]["cyclic"], false);
    }
}
