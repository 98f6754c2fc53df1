pub use alert::{Alert, Severity};
pub use cgmath;
pub use clock::Clock;
pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use graph::{Direction, Directionality, Graph, Hop, Node, NodeKind, Segment, Traversal};
pub use ledger::OccupancyLedger;
pub use routing::{shortest_path, Path, RoutePlan};
pub use scenario::{NodeAttributes, Scenario, SegmentAttributes, TrainAttributes};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use snapshot::{RouteView, SegmentOccupancy, Snapshot, Stats, TrainView};
pub use train::{StepOutcome, Train, TrainStatus};
pub use util::Interval;

mod alert;
mod clock;
mod config;
mod error;
mod graph;
mod ledger;
mod routing;
mod scenario;
mod simulation;
mod snapshot;
mod train;
mod util;

new_key_type! {
    /// Unique ID of a [Node].
    pub struct NodeId;
    /// Unique ID of a [Segment].
    pub struct SegmentId;
    /// Unique ID of a [Train].
    pub struct TrainId;
}

/// A 2D point in schematic space.
pub type Point2d = cgmath::Point2<f64>;

type NodeSet = SlotMap<NodeId, Node>;
type SegmentSet = SlotMap<SegmentId, Segment>;
type TrainSet = SlotMap<TrainId, Train>;
