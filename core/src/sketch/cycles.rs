//! Elementary cycle enumeration over the adjacency graph.
//!
//! A depth-first search is started from every node; each path may not
//! revisit a node and may not immediately walk back along the edge it
//! arrived on. Cycles reached from several starts or directions are
//! collapsed by their sorted edge-id key.

use crate::sketch::graph::{AdjacencyGraph, EdgeIndex, NodeIndex};
use crate::sketch::profile::Wire;
use crate::sketch::regions::edge_set_key;
use std::collections::HashSet;
use tracing::warn;

/// Outcome of a full enumeration.
#[derive(Debug, Clone, Default)]
pub struct CycleEnumeration {
    pub wires: Vec<Wire>,
    /// Edge expansions performed.
    pub steps: usize,
    /// The search budget ran out before the graph was exhausted.
    pub budget_exhausted: bool,
}

struct CycleSearch<'g> {
    graph: &'g AdjacencyGraph,
    /// 0 = unbounded.
    budget: usize,
    steps: usize,
    exhausted: bool,
    on_path: Vec<bool>,
    path: Vec<(EdgeIndex, bool)>,
    seen: HashSet<String>,
    wires: Vec<Wire>,
}

impl<'g> CycleSearch<'g> {
    fn run_from(&mut self, start: NodeIndex) {
        self.on_path[start] = true;
        self.visit(start, start, None);
        self.on_path[start] = false;
    }

    fn visit(&mut self, start: NodeIndex, current: NodeIndex, arrived_by: Option<EdgeIndex>) {
        let graph = self.graph;
        for &edge_index in &graph.nodes[current].incident_edges {
            if Some(edge_index) == arrived_by {
                continue;
            }

            self.steps += 1;
            if self.budget > 0 && self.steps > self.budget {
                self.exhausted = true;
                return;
            }

            let edge = &graph.edges[edge_index];
            let forward = edge.start_node == current;
            let next = edge.other_end(current);

            if next == start {
                self.path.push((edge_index, forward));
                self.emit(start);
                self.path.pop();
            } else if !self.on_path[next] {
                self.on_path[next] = true;
                self.path.push((edge_index, forward));
                self.visit(start, next, Some(edge_index));
                self.path.pop();
                self.on_path[next] = false;
            }

            if self.exhausted {
                return;
            }
        }
    }

    fn emit(&mut self, start: NodeIndex) {
        let graph = self.graph;
        let edges: Vec<_> = self.path.iter().map(|&(e, _)| graph.edges[e].entity_id).collect();
        if !self.seen.insert(edge_set_key(&edges)) {
            return;
        }

        let anchor = graph.node_anchor(start);
        self.wires.push(Wire {
            edges,
            forward: self.path.iter().map(|&(_, f)| f).collect(),
            start_point: anchor,
            end_point: anchor,
        });
    }
}

/// Enumerate every elementary cycle of `graph`, deduplicated by edge set.
///
/// `max_search_steps` bounds the total number of edge expansions (0 = no
/// bound). When it is hit the cycles found so far are returned.
pub fn enumerate_cycles(graph: &AdjacencyGraph, max_search_steps: usize) -> CycleEnumeration {
    let mut search = CycleSearch {
        graph,
        budget: max_search_steps,
        steps: 0,
        exhausted: false,
        on_path: vec![false; graph.node_count()],
        path: Vec::new(),
        seen: HashSet::new(),
        wires: Vec::new(),
    };

    for start in 0..graph.node_count() {
        search.run_from(start);
        if search.exhausted {
            warn!(
                "Cycle search budget of {} steps exhausted after {} cycles",
                max_search_steps,
                search.wires.len()
            );
            break;
        }
    }

    CycleEnumeration {
        wires: search.wires,
        steps: search.steps,
        budget_exhausted: search.exhausted,
    }
}
