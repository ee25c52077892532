// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Cycle detection over the dependency graph.
//!
//! Iterative depth-first traversal with an explicit path stack. Reaching a
//! node that is on the current path closes a cycle; that branch is not
//! descended further. Nodes finished earlier are never re-explored, so a
//! shared sub-dependency (diamond) is not mistaken for a cycle.

use std::collections::HashSet;
use tracing::warn;

use super::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnPath,
    Done,
}

/// Distinct cycles, each as an id sequence that starts and ends on the same id.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let n = graph.len();
    let mut state = vec![Visit::Unvisited; n];
    // position of each on-path node within `path`
    let mut path_pos: Vec<Option<usize>> = vec![None; n];
    let mut path: Vec<usize> = Vec::new();
    let mut cursor: Vec<usize> = Vec::new();

    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();

    for start in 0..n {
        if state[start] != Visit::Unvisited {
            continue;
        }
        state[start] = Visit::OnPath;
        path_pos[start] = Some(0);
        path.push(start);
        cursor.push(0);

        while let Some(&node) = path.last() {
            let frame = path.len() - 1;
            let edges = graph.edges_at(node);

            if cursor[frame] == edges.len() {
                state[node] = Visit::Done;
                path_pos[node] = None;
                path.pop();
                cursor.pop();
                continue;
            }

            let next = edges[cursor[frame]];
            cursor[frame] += 1;

            match state[next] {
                Visit::Unvisited => {
                    state[next] = Visit::OnPath;
                    path_pos[next] = Some(path.len());
                    path.push(next);
                    cursor.push(0);
                }
                Visit::OnPath => {
                    if let Some(from) = path_pos[next] {
                        let members = &path[from..];
                        if seen.insert(canonical(members)) {
                            let mut cycle: Vec<String> =
                                members.iter().map(|&i| graph.id_at(i).to_string()).collect();
                            cycle.push(graph.id_at(next).to_string());
                            cycles.push(cycle);
                        }
                    }
                }
                Visit::Done => {}
            }
        }
    }

    if !cycles.is_empty() {
        warn!(count = cycles.len(), "circular requirement dependencies detected");
    }
    cycles
}

/// Rotation-invariant key so the same loop is reported once.
fn canonical(members: &[usize]) -> Vec<usize> {
    let pivot = members
        .iter()
        .enumerate()
        .min_by_key(|&(_, node)| *node)
        .map(|(i, _)| i)
        .unwrap_or(0);
    members[pivot..]
        .iter()
        .chain(members[..pivot].iter())
        .copied()
        .collect()
}
