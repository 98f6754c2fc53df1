use crate::alert::Alert;
use crate::config::SimulationConfig;
use crate::graph::{Graph, Segment, Traversal};
use crate::ledger::OccupancyLedger;
use crate::routing::{shortest_path, RoutePlan};
use crate::util::Interval;
use crate::{NodeId, Point2d, SegmentId, TrainId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The movement state of a train.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrainStatus {
    Moving,
    Stopped,
    /// The train has no further route; terminal.
    Idle,
}

/// What happened to a train during a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The train is idle and was skipped.
    Idle,
    /// The train's segment is over capacity and it has not yet committed to it.
    Stalled,
    /// The train moved along its segment.
    Advanced,
    /// The train finished its segment and entered the next one.
    Entered(Traversal),
    /// The train finished its segment but the next one is full.
    Held(SegmentId),
    /// The train reached its destination.
    Arrived,
    /// The train finished its segment and its destination cannot be reached.
    Unroutable,
}

/// A simulated train.
#[derive(Clone, Debug)]
pub struct Train {
    id: TrainId,
    code: String,
    name: String,
    /// The desired speed in velocity units.
    speed: f64,
    status: TrainStatus,
    /// The segment being travelled, or `None` once idle.
    traversal: Option<Traversal>,
    /// The fraction of the current segment travelled, in `[0, 1]`.
    progress: f64,
    destination: NodeId,
    /// Whether the train is parked at the end of its segment awaiting clearance.
    holding: bool,
}

impl Train {
    /// Creates a new train at the start of the given traversal.
    pub(crate) fn new(
        id: TrainId,
        code: &str,
        name: &str,
        speed: f64,
        traversal: Traversal,
        destination: NodeId,
        speed_bounds: Interval<f64>,
    ) -> Self {
        Self {
            id,
            code: code.to_owned(),
            name: name.to_owned(),
            speed: speed_bounds.clamp(speed),
            status: TrainStatus::Moving,
            traversal: Some(traversal),
            progress: 0.0,
            destination,
            holding: false,
        }
    }

    pub fn id(&self) -> TrainId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The desired speed in velocity units.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn status(&self) -> TrainStatus {
        self.status
    }

    /// The segment and direction currently being travelled.
    pub fn traversal(&self) -> Option<Traversal> {
        self.traversal
    }

    /// The segment currently being travelled.
    pub fn segment(&self) -> Option<SegmentId> {
        self.traversal.map(|t| t.segment)
    }

    /// The fraction of the current segment travelled.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// The schematic position of the train, if it is on a segment.
    pub fn position(&self, graph: &Graph) -> Option<Point2d> {
        graph.traversal_point(self.traversal?, self.progress)
    }

    /// The route the train would currently take to its destination, or `None`
    /// if it is idle or its destination cannot be reached.
    pub fn plan(&self, graph: &Graph) -> Option<RoutePlan> {
        let traversal = self.traversal?;
        let entry = traversal.entry(graph)?;
        let exit = traversal.exit(graph)?;
        let path = shortest_path(graph, exit, self.destination)?;
        let mut nodes = vec![entry];
        nodes.extend(path.nodes);
        Some(RoutePlan {
            train: self.id,
            nodes,
        })
    }

    /// Shifts the desired speed by `delta`, keeping it within `bounds`.
    pub(crate) fn adjust_speed(&mut self, delta: f64, bounds: Interval<f64>) {
        self.speed = bounds.clamp(self.speed + delta);
    }

    /// Advances the train by one tick.
    ///
    /// Low severity alerts raised by the train are pushed onto `alerts`.
    pub(crate) fn step(
        &mut self,
        graph: &Graph,
        ledger: &mut OccupancyLedger,
        config: &SimulationConfig,
        alerts: &mut Vec<Alert>,
    ) -> StepOutcome {
        let Some(traversal) = self.traversal else {
            return StepOutcome::Idle;
        };
        let Some(segment) = graph.segment(traversal.segment) else {
            self.stop_permanently();
            return StepOutcome::Unroutable;
        };

        ledger.reserve(segment.id(), self.id);

        if !self.holding {
            let committed = self.progress > config.safety_buffer;
            if !committed && !ledger.admits(segment.id(), segment.capacity(), self.id) {
                self.status = TrainStatus::Stopped;
                return StepOutcome::Stalled;
            }

            self.status = TrainStatus::Moving;
            let limits = Interval::new(config.speed_bounds.min, segment.speed_limit());
            let speed = limits.clamp(self.speed);
            let delta = speed / config.progress_scale * segment.length();
            self.progress = (self.progress + delta).clamp(0.0, 1.0);
            if self.progress < 1.0 {
                return StepOutcome::Advanced;
            }
        }

        self.cross_boundary(traversal, graph, ledger, config, alerts)
    }

    /// Leaves the current segment and attempts to enter the first segment
    /// of the shortest path to the destination.
    fn cross_boundary(
        &mut self,
        traversal: Traversal,
        graph: &Graph,
        ledger: &mut OccupancyLedger,
        config: &SimulationConfig,
        alerts: &mut Vec<Alert>,
    ) -> StepOutcome {
        ledger.release(traversal.segment, self.id);

        let Some(exit) = traversal.exit(graph) else {
            self.stop_permanently();
            return StepOutcome::Unroutable;
        };
        let next = shortest_path(graph, exit, self.destination)
            .map(|path| path.traversals.first().copied());

        match next {
            Some(Some(next)) => {
                let capacity = graph.segment(next.segment).map_or(0, Segment::capacity);
                if ledger.can_enter(next.segment, capacity) {
                    ledger.reserve(next.segment, self.id);
                    self.traversal = Some(next);
                    self.progress = 0.0;
                    self.status = TrainStatus::Moving;
                    self.holding = false;
                    log::debug!("train {} entered {}", self.code, next.code(graph));
                    StepOutcome::Entered(next)
                } else {
                    self.status = TrainStatus::Stopped;
                    self.progress = config.park_progress;
                    self.holding = true;
                    alerts.push(Alert::low(format!(
                        "{} waiting for clearance on {}",
                        self.name,
                        next.code(graph)
                    )));
                    StepOutcome::Held(next.segment)
                }
            }
            Some(None) => {
                log::debug!("train {} arrived", self.code);
                self.stop_permanently();
                StepOutcome::Arrived
            }
            None => {
                log::warn!("train {} has no route to its destination", self.code);
                self.stop_permanently();
                StepOutcome::Unroutable
            }
        }
    }

    /// Takes the train out of service for the rest of the run.
    fn stop_permanently(&mut self) {
        self.traversal = None;
        self.status = TrainStatus::Idle;
        self.holding = false;
    }
}
