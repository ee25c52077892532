// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Dependency levels: the longest chain of in-batch dependencies below each
//! requirement.
//!
//! A requirement that can reach itself has no finite longest chain. Those
//! get level 0 and `cyclic = true`; requirements above them treat them as
//! level 0 when taking the max. Dangling dependencies never contribute.

use serde::Serialize;
use std::collections::BTreeMap;

use super::graph::DependencyGraph;

/// Level of one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DependencyLevel {
    pub level: u32,
    pub cyclic: bool,
}

/// Levels for every node of the graph, keyed by requirement id.
pub fn compute_levels(graph: &DependencyGraph) -> BTreeMap<String, DependencyLevel> {
    let n = graph.len();
    let cyclic = cyclic_nodes(graph);

    // memo: resolved level per node
    let mut memo: Vec<Option<u32>> = (0..n)
        .map(|i| if cyclic[i] { Some(0) } else { None })
        .collect();

    // Non-cyclic nodes form a DAG once cyclic nodes are pinned at 0, so a
    // post-order walk over them terminates.
    let mut stack: Vec<(usize, bool)> = Vec::new();
    for root in 0..n {
        if memo[root].is_some() {
            continue;
        }
        stack.push((root, false));
        while let Some((node, expanded)) = stack.pop() {
            if memo[node].is_some() {
                continue;
            }
            let edges = graph.edges_at(node);
            if expanded {
                let level = edges
                    .iter()
                    .filter_map(|&dep| memo[dep])
                    .max()
                    .map_or(0, |deepest| deepest + 1);
                memo[node] = Some(level);
            } else {
                stack.push((node, true));
                for &dep in edges {
                    if memo[dep].is_none() {
                        stack.push((dep, false));
                    }
                }
            }
        }
    }

    (0..n)
        .map(|i| {
            (
                graph.id_at(i).to_string(),
                DependencyLevel {
                    level: memo[i].unwrap_or(0),
                    cyclic: cyclic[i],
                },
            )
        })
        .collect()
}

/// Marks every node that lies on some cycle (member of a strongly connected
/// component with more than one node, or with an edge to itself).
///
/// Tarjan's algorithm, driven by an explicit stack instead of recursion.
fn cyclic_nodes(graph: &DependencyGraph) -> Vec<bool> {
    let n = graph.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink: Vec<usize> = vec![0; n];
    let mut on_stack: Vec<bool> = vec![false; n];
    let mut scc_stack: Vec<usize> = Vec::new();
    let mut cyclic = vec![false; n];
    let mut counter = 0usize;

    // (node, next edge to inspect)
    let mut call: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        call.push((root, 0));

        while let Some((node, next_edge)) = call.pop() {
            if index[node].is_none() {
                index[node] = Some(counter);
                lowlink[node] = counter;
                counter += 1;
                scc_stack.push(node);
                on_stack[node] = true;
            }

            let edges = graph.edges_at(node);
            if next_edge < edges.len() {
                call.push((node, next_edge + 1));
                let target = edges[next_edge];
                match index[target] {
                    None => call.push((target, 0)),
                    Some(target_index) if on_stack[target] => {
                        lowlink[node] = lowlink[node].min(target_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            // all edges done; `node` is closed
            if let Some(&(parent, _)) = call.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[node]);
            }

            if Some(lowlink[node]) == index[node] {
                let mut component = Vec::new();
                while let Some(member) = scc_stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                let loops = component.len() > 1 || graph.edges_at(node).contains(&node);
                if loops {
                    for member in component {
                        cyclic[member] = true;
                    }
                }
            }
        }
    }

    cyclic
}
