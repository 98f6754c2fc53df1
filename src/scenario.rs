//! Input documents describing a network and the fleet that runs on it.

use crate::graph::{Direction, Directionality, NodeKind};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The attributes of a node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeAttributes {
    /// The unique code of the node, eg. `"A"`.
    pub id: String,
    /// The display name.
    pub name: String,
    /// What kind of place the node is.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: NodeKind,
    /// Schematic coordinates; a circular layout is used when omitted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Option<[f64; 2]>,
}

/// The attributes of a segment of track.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SegmentAttributes {
    /// The unique code of the segment, eg. `"e1"`.
    pub id: String,
    /// The code of the node the segment starts at.
    pub from: String,
    /// The code of the node the segment ends at.
    pub to: String,
    /// The length of the segment; the edge weight used for routing.
    pub length: f64,
    /// The speed limit in velocity units.
    pub speed_limit: f64,
    /// Whether the segment may be traversed in reverse.
    pub direction: Directionality,
    /// The number of trains that may occupy the segment at once.
    pub capacity: usize,
}

/// The attributes of a train.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainAttributes {
    /// The unique code of the train, eg. `"T1"`.
    pub id: String,
    /// The display name.
    pub name: String,
    /// The desired speed in velocity units.
    pub speed: f64,
    /// The code of the segment the train starts on.
    pub segment: String,
    /// The direction in which the starting segment is traversed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: Direction,
    /// The code of the node the train is heading for.
    pub destination: String,
}

/// A complete description of a network and its fleet.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scenario {
    pub nodes: Vec<NodeAttributes>,
    pub segments: Vec<SegmentAttributes>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trains: Vec<TrainAttributes>,
}

impl Scenario {
    /// Parses a scenario from a JSON document.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The demonstration network: three stations around a junction,
    /// plus a one-way signalled loop between Alpha and Beta.
    pub fn demo() -> Self {
        let node = |id: &str, name: &str, kind| NodeAttributes {
            id: id.into(),
            name: name.into(),
            kind,
            position: None,
        };
        let segment = |id: &str, from: &str, to: &str, length, speed_limit, direction| {
            SegmentAttributes {
                id: id.into(),
                from: from.into(),
                to: to.into(),
                length,
                speed_limit,
                direction,
                capacity: 1,
            }
        };
        let train = |id: &str, name: &str, speed, segment: &str, destination: &str| {
            TrainAttributes {
                id: id.into(),
                name: name.into(),
                speed,
                segment: segment.into(),
                direction: Direction::Forward,
                destination: destination.into(),
            }
        };

        use Directionality::*;
        use NodeKind::*;
        Self {
            nodes: vec![
                node("A", "Alpha", Station),
                node("B", "Beta", Station),
                node("C", "Cross", Junction),
                node("D", "Delta", Station),
                node("S1", "Sig-1", Signal),
                node("S2", "Sig-2", Signal),
            ],
            segments: vec![
                segment("e1", "A", "C", 4.0, 80.0, Bidirectional),
                segment("e2", "C", "B", 4.0, 80.0, Bidirectional),
                segment("e3", "C", "D", 6.0, 70.0, Bidirectional),
                segment("e4", "A", "S1", 2.0, 60.0, OneWay),
                segment("e5", "S1", "B", 2.0, 60.0, OneWay),
                segment("e6", "B", "S2", 2.0, 60.0, OneWay),
                segment("e7", "S2", "A", 2.0, 60.0, OneWay),
            ],
            trains: vec![
                train("T1", "T1 - Alpha → Delta", 60.0, "e1", "D"),
                train("T2", "T2 - Beta → Alpha", 55.0, "e2", "A"),
                train("T3", "T3 - Loop", 40.0, "e6", "A"),
            ],
        }
    }
}
