use crate::error::{Result, SimulationError};
use crate::scenario::{NodeAttributes, SegmentAttributes};
use crate::{NodeId, NodeSet, Point2d, SegmentId, SegmentSet};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

/// The centre of the default circular layout.
const LAYOUT_CENTRE: [f64; 2] = [250.0, 220.0];

/// The radius of the default circular layout.
const LAYOUT_RADIUS: f64 = 180.0;

/// What kind of place a node represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    Station,
    Junction,
    Signal,
}

/// Whether a segment may be traversed in both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Directionality {
    #[cfg_attr(feature = "serde", serde(rename = "bi"))]
    Bidirectional,
    #[cfg_attr(feature = "serde", serde(rename = "one-way"))]
    OneWay,
}

/// The direction in which a segment is traversed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// From the segment's `from` node to its `to` node.
    #[default]
    Forward,
    /// From the segment's `to` node to its `from` node.
    Reverse,
}

/// A station, junction or signal.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    code: String,
    name: String,
    kind: NodeKind,
    position: Point2d,
}

/// A length of track between two nodes.
#[derive(Clone, Debug)]
pub struct Segment {
    id: SegmentId,
    code: String,
    from: NodeId,
    to: NodeId,
    length: f64,
    speed_limit: f64,
    directionality: Directionality,
    capacity: usize,
}

/// A segment viewed in one direction of travel.
///
/// This is a derived view over a [Segment]; it owns nothing, so both directions
/// of a bidirectional segment share the segment's capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Traversal {
    pub segment: SegmentId,
    pub direction: Direction,
}

/// An entry in a node's adjacency list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hop {
    /// The node reached.
    pub to: NodeId,
    /// How it is reached.
    pub traversal: Traversal,
}

/// The immutable topology of a rail network.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: NodeSet,
    segments: SegmentSet,
    node_codes: HashMap<String, NodeId>,
    segment_codes: HashMap<String, SegmentId>,
    adjacency: SecondaryMap<NodeId, Vec<Hop>>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The schematic coordinates of the node.
    pub fn position(&self) -> Point2d {
        self.position
    }
}

impl Segment {
    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    pub fn directionality(&self) -> Directionality {
        self.directionality
    }

    /// The number of trains that may occupy the segment at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Traversal {
    /// Traverses a segment in its declared direction.
    pub fn forward(segment: SegmentId) -> Self {
        Self {
            segment,
            direction: Direction::Forward,
        }
    }

    /// Traverses a segment against its declared direction.
    pub fn reverse(segment: SegmentId) -> Self {
        Self {
            segment,
            direction: Direction::Reverse,
        }
    }

    /// The node at which the traversal begins.
    pub fn entry(&self, graph: &Graph) -> Option<NodeId> {
        let segment = graph.segment(self.segment)?;
        Some(match self.direction {
            Direction::Forward => segment.from,
            Direction::Reverse => segment.to,
        })
    }

    /// The node at which the traversal ends.
    pub fn exit(&self, graph: &Graph) -> Option<NodeId> {
        let segment = graph.segment(self.segment)?;
        Some(match self.direction {
            Direction::Forward => segment.to,
            Direction::Reverse => segment.from,
        })
    }

    /// The display code, eg. `e1` or `e1-r` for a reverse traversal.
    pub fn code(&self, graph: &Graph) -> String {
        let code = graph.segment(self.segment).map_or("?", |s| s.code());
        match self.direction {
            Direction::Forward => code.to_owned(),
            Direction::Reverse => format!("{}-r", code),
        }
    }
}

impl Graph {
    /// Builds a graph from node and segment descriptions.
    ///
    /// Fails if a segment references an unknown node, if a code is used twice,
    /// or if a segment has a non-positive length, speed limit or capacity.
    pub fn build(nodes: &[NodeAttributes], segments: &[SegmentAttributes]) -> Result<Self> {
        let mut graph = Self::default();

        for (idx, attribs) in nodes.iter().enumerate() {
            if graph.node_codes.contains_key(&attribs.id) {
                return Err(SimulationError::topology(format!(
                    "duplicate node `{}`",
                    attribs.id
                )));
            }
            let position = attribs
                .position
                .map(Point2d::from)
                .unwrap_or_else(|| circular_position(idx, nodes.len()));
            let id = graph.nodes.insert_with_key(|id| Node {
                id,
                code: attribs.id.clone(),
                name: attribs.name.clone(),
                kind: attribs.kind,
                position,
            });
            graph.node_codes.insert(attribs.id.clone(), id);
            graph.adjacency.insert(id, vec![]);
        }

        for attribs in segments {
            let id = graph.add_segment(attribs)?;
            let segment = &graph.segments[id];
            let (from, to) = (segment.from, segment.to);
            let bidirectional = segment.directionality == Directionality::Bidirectional;

            if let Some(hops) = graph.adjacency.get_mut(from) {
                hops.push(Hop {
                    to,
                    traversal: Traversal::forward(id),
                });
            }
            if bidirectional {
                if let Some(hops) = graph.adjacency.get_mut(to) {
                    hops.push(Hop {
                        to: from,
                        traversal: Traversal::reverse(id),
                    });
                }
            }
        }

        Ok(graph)
    }

    /// Validates and inserts a single segment.
    fn add_segment(&mut self, attribs: &SegmentAttributes) -> Result<SegmentId> {
        let invalid = |reason: &str| {
            SimulationError::topology(format!("segment `{}` {}", attribs.id, reason))
        };

        if self.segment_codes.contains_key(&attribs.id) {
            return Err(invalid("is declared twice"));
        }
        let from = *self
            .node_codes
            .get(&attribs.from)
            .ok_or_else(|| invalid(&format!("references unknown node `{}`", attribs.from)))?;
        let to = *self
            .node_codes
            .get(&attribs.to)
            .ok_or_else(|| invalid(&format!("references unknown node `{}`", attribs.to)))?;
        if !(attribs.length.is_finite() && attribs.length > 0.0) {
            return Err(invalid("must have a positive length"));
        }
        if !(attribs.speed_limit.is_finite() && attribs.speed_limit > 0.0) {
            return Err(invalid("must have a positive speed limit"));
        }
        if attribs.capacity == 0 {
            return Err(invalid("must have a capacity of at least 1"));
        }

        let id = self.segments.insert_with_key(|id| Segment {
            id,
            code: attribs.id.clone(),
            from,
            to,
            length: attribs.length,
            speed_limit: attribs.speed_limit,
            directionality: attribs.direction,
            capacity: attribs.capacity,
        });
        self.segment_codes.insert(attribs.id.clone(), id);
        Ok(id)
    }

    /// The hops leaving a node, in segment declaration order.
    pub fn neighbors(&self, node: NodeId) -> &[Hop] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gets the node with the given ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Gets the segment with the given ID.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    /// Looks up a node by its code.
    pub fn node_by_code(&self, code: &str) -> Option<NodeId> {
        self.node_codes.get(code).copied()
    }

    /// Looks up a segment by its code.
    pub fn segment_by_code(&self, code: &str) -> Option<SegmentId> {
        self.segment_codes.get(code).copied()
    }

    /// Returns an iterator over the nodes in declaration order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over the segments in declaration order.
    pub fn iter_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    /// The set of nodes reachable from `start`, including `start` itself.
    pub fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        if !self.nodes.contains_key(start) {
            return HashSet::new();
        }
        pathfinding::directed::bfs::bfs_reach(start, |node| {
            self.neighbors(*node).iter().map(|hop| hop.to)
        })
        .collect()
    }

    /// The schematic point reached after travelling the fraction `progress`
    /// along a traversal.
    pub fn traversal_point(&self, traversal: Traversal, progress: f64) -> Option<Point2d> {
        let a = self.node(traversal.entry(self)?)?.position;
        let b = self.node(traversal.exit(self)?)?.position;
        Some(a + (b - a) * progress.clamp(0.0, 1.0))
    }
}

/// The position of the `idx`th of `count` nodes placed evenly around a circle.
fn circular_position(idx: usize, count: usize) -> Point2d {
    let angle = TAU * idx as f64 / count as f64;
    Point2d::new(
        LAYOUT_CENTRE[0] + LAYOUT_RADIUS * angle.cos(),
        LAYOUT_CENTRE[1] + LAYOUT_RADIUS * angle.sin(),
    )
}
