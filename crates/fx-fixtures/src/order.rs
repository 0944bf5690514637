//! Table write order derived from foreign keys.
//!
//! Referenced tables come before the tables pointing at them; callers run
//! deletes over the reversed order.

use crate::error::{FixtureError, FixtureResult};
use fx_core::ForeignKey;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Dependency graph over the tables touched by one apply.
#[derive(Debug)]
pub struct TableOrder {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl TableOrder {
    /// Build the graph for `tables`. Edges to tables outside the set and
    /// self references are ignored.
    pub fn build<'t, I>(tables: I, foreign_keys: &[ForeignKey]) -> Self
    where
        I: IntoIterator<Item = &'t str>,
    {
        let names: BTreeSet<&str> = tables.into_iter().collect();
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        for name in names {
            let idx = graph.add_node(name.to_string());
            node_map.insert(name.to_string(), idx);
        }

        for fk in foreign_keys {
            if fk.table == fk.referenced_table {
                continue;
            }
            let (Some(&from), Some(&to)) = (
                node_map.get(&fk.referenced_table),
                node_map.get(&fk.table),
            ) else {
                continue;
            };
            if graph.find_edge(from, to).is_none() {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph, node_map }
    }

    /// Tables with referenced tables first.
    pub fn insert_order(&self) -> FixtureResult<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(FixtureError::ForeignKeyCycle {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path = vec![self.graph[start].clone()];
        let mut visited = HashSet::from([start]);
        let mut current = start;

        // Every node of a cycle has an outgoing edge that stays on it, so
        // follow edges until a node repeats.
        while let Some(edge) = self
            .graph
            .edges(current)
            .find(|e| self.reaches(e.target(), start))
        {
            let target = edge.target();
            path.push(self.graph[target].clone());
            if !visited.insert(target) {
                break;
            }
            current = target;
        }

        path.join(" -> ")
    }

    fn reaches(&self, from: NodeIndex, to: NodeIndex) -> bool {
        petgraph::algo::has_path_connecting(&self.graph, from, to, None)
    }
}

#[cfg(test)]
#[path = "order_test.rs"]
mod tests;
