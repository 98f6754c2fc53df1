//! Shortest-path routing over the network graph.

use crate::graph::{Graph, Traversal};
use crate::{NodeId, TrainId};
use slotmap::SecondaryMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A route between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// The nodes visited, including both ends.
    pub nodes: Vec<NodeId>,
    /// The traversals between consecutive nodes.
    pub traversals: Vec<Traversal>,
    /// The total length of the traversed segments.
    pub length: f64,
}

/// A display-oriented snapshot of the route a train is expected to take.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePlan {
    pub train: TrainId,
    /// The nodes on the route, starting with the entry of the train's current segment.
    pub nodes: Vec<NodeId>,
}

/// An entry in the search frontier.
/// Ordered so that a [BinaryHeap] pops the shortest distance first,
/// and the earliest discovered entry among equal distances.
struct Frontier {
    dist: f64,
    seq: usize,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Finds the shortest path from `start` to `goal`, weighted by segment length.
///
/// Among paths of equal length the one discovered first wins, so results are
/// deterministic for a given segment declaration order.
/// Returns `None` if the goal is unreachable or either node is unknown.
pub fn shortest_path(graph: &Graph, start: NodeId, goal: NodeId) -> Option<Path> {
    graph.node(start)?;
    graph.node(goal)?;

    let mut dist = SecondaryMap::<NodeId, f64>::new();
    let mut prev = SecondaryMap::<NodeId, (NodeId, Traversal)>::new();
    let mut visited = SecondaryMap::<NodeId, ()>::new();
    let mut frontier = BinaryHeap::new();
    let mut seq = 0;

    dist.insert(start, 0.0);
    frontier.push(Frontier {
        dist: 0.0,
        seq,
        node: start,
    });

    while let Some(Frontier { dist: d, node, .. }) = frontier.pop() {
        if visited.insert(node, ()).is_some() {
            continue;
        }
        if node == goal {
            break;
        }
        for hop in graph.neighbors(node) {
            let Some(segment) = graph.segment(hop.traversal.segment) else {
                continue;
            };
            let alt = d + segment.length();
            if dist.get(hop.to).map_or(true, |&best| alt < best) {
                dist.insert(hop.to, alt);
                prev.insert(hop.to, (node, hop.traversal));
                seq += 1;
                frontier.push(Frontier {
                    dist: alt,
                    seq,
                    node: hop.to,
                });
            }
        }
    }

    if !visited.contains_key(goal) {
        return None;
    }

    let mut nodes = vec![goal];
    let mut traversals = vec![];
    let mut cur = goal;
    while cur != start {
        let (from, traversal) = *prev.get(cur)?;
        nodes.push(from);
        traversals.push(traversal);
        cur = from;
    }
    nodes.reverse();
    traversals.reverse();

    Some(Path {
        nodes,
        traversals,
        length: dist.get(goal).copied().unwrap_or(0.0),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Scenario;
    use assert_approx_eq::assert_approx_eq;

    fn demo() -> Graph {
        let scenario = Scenario::demo();
        Graph::build(&scenario.nodes, &scenario.segments).unwrap()
    }

    fn codes(graph: &Graph, path: &Path) -> Vec<String> {
        path.nodes
            .iter()
            .map(|id| graph.node(*id).unwrap().code().to_owned())
            .collect()
    }

    #[test]
    fn trivial_path() {
        let graph = demo();
        let a = graph.node_by_code("A").unwrap();
        let path = shortest_path(&graph, a, a).unwrap();
        assert_eq!(path.nodes, [a]);
        assert!(path.traversals.is_empty());
        assert_approx_eq!(path.length, 0.0);
    }

    #[test]
    fn prefers_shorter_loop() {
        let graph = demo();
        let a = graph.node_by_code("A").unwrap();
        let b = graph.node_by_code("B").unwrap();

        let path = shortest_path(&graph, a, b).unwrap();
        assert_eq!(codes(&graph, &path), ["A", "S1", "B"]);
        assert_approx_eq!(path.length, 4.0);

        let path = shortest_path(&graph, b, a).unwrap();
        assert_eq!(codes(&graph, &path), ["B", "S2", "A"]);
        assert_approx_eq!(path.length, 4.0);
    }

    #[test]
    fn uses_reverse_traversals() {
        let graph = demo();
        let d = graph.node_by_code("D").unwrap();
        let a = graph.node_by_code("A").unwrap();
        let path = shortest_path(&graph, d, a).unwrap();
        assert_eq!(codes(&graph, &path), ["D", "C", "A"]);
        let traversals = path
            .traversals
            .iter()
            .map(|t| t.code(&graph))
            .collect::<Vec<_>>();
        assert_eq!(traversals, ["e3-r", "e1-r"]);
        assert_approx_eq!(path.length, 10.0);
    }
}
