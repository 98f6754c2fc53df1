//! Read-only views of the simulation state for presentation layers.

use crate::alert::{Alert, Severity};
use crate::graph::Graph;
use crate::ledger::OccupancyLedger;
use crate::routing::RoutePlan;
use crate::train::{Train, TrainStatus};
use crate::{TrainId, TrainSet};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A copy of everything a consumer needs to display the simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    /// The number of ticks simulated so far.
    pub frame: usize,
    pub running: bool,
    pub speed_multiplier: f64,
    pub trains: Vec<TrainView>,
    /// Occupancy of every segment, in declaration order.
    pub occupancy: Vec<SegmentOccupancy>,
    pub alerts: Vec<Alert>,
    pub routes: Vec<RouteView>,
    pub stats: Stats,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainView {
    pub id: String,
    pub name: String,
    pub speed: f64,
    pub status: TrainStatus,
    /// The code of the traversal being travelled, eg. `e1-r`.
    pub segment: Option<String>,
    pub progress: f64,
    pub destination: String,
    /// Schematic coordinates of the train.
    pub position: Option<[f64; 2]>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SegmentOccupancy {
    pub segment: String,
    pub capacity: usize,
    pub occupied_by: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RouteView {
    pub train: String,
    pub train_name: String,
    /// Node codes along the route.
    pub nodes: Vec<String>,
    /// Node names along the route, joined for display.
    pub summary: String,
}

/// Aggregate figures for a status panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Stats {
    pub trains: usize,
    /// Segments with at least one occupant.
    pub occupied: usize,
    /// High severity alerts in the current tick.
    pub conflicts: usize,
    /// Segments completed by all trains since the start of the run.
    pub traversals: usize,
}

/// Everything [Snapshot::capture] reads from.
pub(crate) struct SnapshotSource<'a> {
    pub frame: usize,
    pub running: bool,
    pub speed_multiplier: f64,
    pub graph: &'a Graph,
    pub trains: &'a TrainSet,
    pub ledger: &'a OccupancyLedger,
    pub alerts: &'a [Alert],
    pub routes: &'a [RoutePlan],
    pub traversals: usize,
}

impl Snapshot {
    pub(crate) fn capture(src: SnapshotSource) -> Self {
        let train_code = |id: &TrainId| src.trains.get(*id).map_or("?", Train::code).to_owned();
        let node_code = |id| src.graph.node(id).map_or("?", |n| n.code()).to_owned();

        let trains = src
            .trains
            .values()
            .map(|train| TrainView {
                id: train.code().to_owned(),
                name: train.name().to_owned(),
                speed: train.speed(),
                status: train.status(),
                segment: train.traversal().map(|t| t.code(src.graph)),
                progress: train.progress(),
                destination: node_code(train.destination()),
                position: train.position(src.graph).map(Into::into),
            })
            .collect();

        let occupancy = src
            .graph
            .iter_segments()
            .map(|segment| SegmentOccupancy {
                segment: segment.code().to_owned(),
                capacity: segment.capacity(),
                occupied_by: src.ledger.occupants(segment.id()).iter().map(train_code).collect(),
            })
            .collect();

        let routes = src
            .routes
            .iter()
            .map(|plan| RouteView {
                train: train_code(&plan.train),
                train_name: src.trains.get(plan.train).map_or("?", Train::name).to_owned(),
                nodes: plan.nodes.iter().map(|id| node_code(*id)).collect(),
                summary: plan
                    .nodes
                    .iter()
                    .filter_map(|id| src.graph.node(*id))
                    .map(|node| node.name())
                    .join(" · "),
            })
            .collect();

        let stats = Stats {
            trains: src.trains.len(),
            occupied: src.ledger.occupied_segments(),
            conflicts: src
                .alerts
                .iter()
                .filter(|alert| alert.severity == Severity::High)
                .count(),
            traversals: src.traversals,
        };

        Self {
            frame: src.frame,
            running: src.running,
            speed_multiplier: src.speed_multiplier,
            trains,
            occupancy,
            alerts: src.alerts.to_vec(),
            routes,
            stats,
        }
    }

    /// Looks up a train's view by its code.
    pub fn train(&self, code: &str) -> Option<&TrainView> {
        self.trains.iter().find(|train| train.id == code)
    }

    /// Looks up a segment's occupancy by its code.
    pub fn segment(&self, code: &str) -> Option<&SegmentOccupancy> {
        self.occupancy.iter().find(|entry| entry.segment == code)
    }

    /// Serializes the snapshot as a JSON document.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
