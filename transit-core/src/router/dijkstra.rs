//! Dijkstra's algorithm over the wait/ride routing graph.
//!
//! Classic lazy-decrease-key formulation: a binary heap keyed on the
//! tentative weight, stale entries discarded through a visited set, and a
//! predecessor map that lets the caller reconstruct the traversed edge
//! sequence. Implementation follows the shortest-path code in the
//! [`petgraph`] crate.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::hash_map::Entry::{Occupied, Vacant};
use hashbrown::{HashMap, HashSet};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::RouteItem;

/// `MinScored` holds a score and a scored object in a pair for use with a
/// `BinaryHeap`, comparing in reverse order by the score so that the heap
/// behaves as a min-heap.
#[derive(Copy, Clone, PartialEq)]
struct MinScored<K>(f64, K);

impl<K: Eq> Eq for MinScored<K> {}

impl<K: PartialOrd> PartialOrd for MinScored<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.0.partial_cmp(&self.0)
    }
}

impl<K: Ord> Ord for MinScored<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.partial_cmp(&self.0).unwrap()
    }
}

/// Finds a minimum-weight path from `start` to `target`.
///
/// Returns the total weight and the traversed edges in order, or `None`
/// when `target` is unreachable. A query from a vertex to itself yields
/// weight `0.0` and an empty edge sequence. Ties between equal-weight
/// paths break arbitrarily but deterministically.
#[must_use]
pub(crate) fn shortest_path(
    graph: &DiGraph<(), RouteItem>,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<(f64, Vec<EdgeIndex>)> {
    let mut visited = HashSet::new();
    let mut scores: HashMap<NodeIndex, f64> = HashMap::with_capacity(graph.node_count());
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::new();

    let mut visit_next = BinaryHeap::new();
    scores.insert(start, 0.0);
    visit_next.push(MinScored(0.0, start));

    while let Some(MinScored(node_score, node)) = visit_next.pop() {
        if visited.contains(&node) {
            continue;
        }

        if node == target {
            break;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            if visited.contains(&next) {
                continue;
            }

            let next_score = node_score + edge.weight().minutes();

            match scores.entry(next) {
                Occupied(mut ent) => {
                    if next_score < *ent.get() {
                        ent.insert(next_score);
                        visit_next.push(MinScored(next_score, next));
                        predecessors.insert(next, (node, edge.id()));
                    }
                }
                Vacant(ent) => {
                    ent.insert(next_score);
                    visit_next.push(MinScored(next_score, next));
                    predecessors.insert(next, (node, edge.id()));
                }
            }
        }
        visited.insert(node);
    }

    let total = *scores.get(&target)?;

    let mut edges = Vec::new();
    let mut current = target;
    while current != start {
        let &(previous, edge) = predecessors.get(&current)?;
        edges.push(edge);
        current = previous;
    }
    edges.reverse();

    Some((total, edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride(minutes: f64) -> RouteItem {
        RouteItem::Ride {
            bus_name: "t".to_string(),
            span_count: 1,
            minutes,
        }
    }

    #[test]
    fn picks_the_lighter_path() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let c = graph.add_node(());
        let direct = graph.add_edge(a, c, ride(10.0));
        let first = graph.add_edge(a, b, ride(3.0));
        let second = graph.add_edge(b, c, ride(4.0));

        let (total, edges) = shortest_path(&graph, a, c).unwrap();
        assert_eq!(total, 7.0);
        assert_eq!(edges, vec![first, second]);
        assert_ne!(edges, vec![direct]);
    }

    #[test]
    fn unreachable_is_none() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let c = graph.add_node(());
        graph.add_edge(a, b, ride(1.0));

        assert!(shortest_path(&graph, b, a).is_none());
        assert!(shortest_path(&graph, a, c).is_none());
    }

    #[test]
    fn same_vertex_is_an_empty_path() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(());
        graph.add_edge(a, a, ride(5.0));

        let (total, edges) = shortest_path(&graph, a, a).unwrap();
        assert_eq!(total, 0.0);
        assert!(edges.is_empty());
    }
}
