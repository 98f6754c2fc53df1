use crate::alert::Alert;
use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::graph::{Direction, Directionality, Graph, Traversal};
use crate::ledger::OccupancyLedger;
use crate::routing::RoutePlan;
use crate::scenario::{Scenario, TrainAttributes};
use crate::snapshot::{Snapshot, SnapshotSource};
use crate::train::{StepOutcome, Train};
use crate::{TrainId, TrainSet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use std::time::Duration;

/// The alert raised when an operator triggers a reschedule.
const RESCHEDULE_MESSAGE: &str = "Rescheduling applied: speeds adjusted based on congestion.";

/// A rail network simulation.
///
/// The simulation owns the network, the fleet and the occupancy ledger.
/// All state changes happen in [Self::tick]; consumers read [Self::snapshot]
/// between ticks and steer the run through the control methods.
pub struct Simulation {
    /// The network topology.
    graph: Graph,
    /// The trains, in declaration order.
    trains: TrainSet,
    /// Which trains occupy which segments.
    ledger: OccupancyLedger,
    /// The alerts raised during the most recent tick.
    alerts: Vec<Alert>,
    /// The cached route plans.
    routes: Vec<RoutePlan>,
    /// Decides when ticks are due.
    clock: Clock,
    config: SimulationConfig,
    /// Source of reschedule perturbations.
    rng: StdRng,
    /// The number of ticks simulated.
    frame: usize,
    /// The number of segments completed by all trains.
    traversals: usize,
}

impl Simulation {
    /// Creates a simulation of a scenario with the default configuration.
    pub fn new(scenario: &Scenario) -> Result<Self> {
        Self::initialize(scenario, SimulationConfig::default())
    }

    /// Creates a simulation of a scenario.
    ///
    /// Fails if the configuration is out of range, the network is malformed
    /// or a train references an unknown segment or destination.
    pub fn initialize(scenario: &Scenario, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let graph = Graph::build(&scenario.nodes, &scenario.segments)?;

        let mut trains = TrainSet::with_key();
        for attribs in &scenario.trains {
            if trains.values().any(|train: &Train| train.code() == attribs.id) {
                return Err(SimulationError::train(&attribs.id, "is declared twice"));
            }
            let (traversal, destination) = Self::place_train(&graph, attribs)?;
            trains.insert_with_key(|id| {
                Train::new(
                    id,
                    &attribs.id,
                    &attribs.name,
                    attribs.speed,
                    traversal,
                    destination,
                    config.speed_bounds,
                )
            });
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock = Clock::new(
            Duration::from_millis(config.tick_interval_ms),
            config.speed_multiplier,
            config.multiplier_bounds,
            config.max_ticks_per_advance,
            config.running,
        );

        let mut sim = Self {
            graph,
            trains,
            ledger: OccupancyLedger::new(),
            alerts: vec![],
            routes: vec![],
            clock,
            config,
            rng,
            frame: 0,
            traversals: 0,
        };
        sim.routes = sim.plan_routes();

        log::info!(
            "initialized simulation with {} nodes, {} segments and {} trains",
            sim.graph.iter_nodes().count(),
            sim.graph.iter_segments().count(),
            sim.trains.len()
        );
        Ok(sim)
    }

    /// Resolves a train's starting traversal and destination.
    fn place_train(graph: &Graph, attribs: &TrainAttributes) -> Result<(Traversal, crate::NodeId)> {
        let invalid = |reason: String| SimulationError::train(&attribs.id, reason);

        if !attribs.speed.is_finite() {
            return Err(invalid(format!("has an invalid speed {}", attribs.speed)));
        }
        let segment = graph
            .segment_by_code(&attribs.segment)
            .and_then(|id| graph.segment(id))
            .ok_or_else(|| invalid(format!("starts on unknown segment `{}`", attribs.segment)))?;
        let destination = graph
            .node_by_code(&attribs.destination)
            .ok_or_else(|| invalid(format!("heads for unknown node `{}`", attribs.destination)))?;
        if attribs.direction == Direction::Reverse
            && segment.directionality() == Directionality::OneWay
        {
            return Err(invalid(format!(
                "cannot travel one-way segment `{}` in reverse",
                attribs.segment
            )));
        }

        let traversal = Traversal {
            segment: segment.id(),
            direction: attribs.direction,
        };
        let reachable = traversal
            .exit(graph)
            .map_or(false, |exit| graph.reachable_from(exit).contains(&destination));
        if !reachable {
            log::warn!(
                "train {} cannot reach {} from {}",
                attribs.id,
                attribs.destination,
                traversal.code(graph)
            );
        }

        Ok((traversal, destination))
    }

    /// Advances the simulation by one tick, regardless of whether the clock is running.
    pub fn tick(&mut self) {
        let mut alerts = vec![];

        for train in self.trains.values_mut() {
            let outcome = train.step(&self.graph, &mut self.ledger, &self.config, &mut alerts);
            log::debug!("frame {}: train {} {:?}", self.frame, train.code(), outcome);
            if let StepOutcome::Entered(_) | StepOutcome::Arrived = outcome {
                self.traversals += 1;
            }
        }

        alerts.extend(self.ledger.conflicts(&self.graph));
        self.alerts = alerts;
        self.frame += 1;
    }

    /// Accounts for `elapsed` real time, simulating the ticks that became due,
    /// up to `max_ticks_per_advance`. Returns the number of ticks simulated.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let due = self.clock.advance(elapsed);
        for _ in 0..due {
            self.tick();
        }
        due
    }

    /// Takes a read-only copy of the simulation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(SnapshotSource {
            frame: self.frame,
            running: self.clock.is_running(),
            speed_multiplier: self.clock.multiplier(),
            graph: &self.graph,
            trains: &self.trains,
            ledger: &self.ledger,
            alerts: &self.alerts,
            routes: &self.routes,
            traversals: self.traversals,
        })
    }

    /// Starts or pauses the clock.
    pub fn set_running(&mut self, running: bool) {
        log::info!("simulation {}", if running { "running" } else { "paused" });
        self.clock.set_running(running);
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Sets how many times faster than the base rate ticks are produced.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        self.clock.set_multiplier(multiplier);
        log::info!("speed multiplier set to {}", self.clock.multiplier());
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.clock.multiplier()
    }

    /// The real time between ticks at the current speed multiplier.
    pub fn tick_interval(&self) -> Duration {
        self.clock.interval()
    }

    /// Applies an operator reschedule: nudges every train's speed by a random
    /// amount, replaces the alerts with a single notice and recomputes the route plans.
    pub fn trigger_reschedule(&mut self) {
        let jitter = self.config.reschedule_jitter;
        let distr = Uniform::new_inclusive(-jitter, jitter);
        for train in self.trains.values_mut() {
            train.adjust_speed(distr.sample(&mut self.rng), self.config.reschedule_bounds);
        }
        self.alerts = vec![Alert::low(RESCHEDULE_MESSAGE)];
        self.routes = self.plan_routes();
        log::info!("rescheduled {} trains", self.trains.len());
    }

    /// Computes a route plan for every train still in service.
    fn plan_routes(&self) -> Vec<RoutePlan> {
        self.trains
            .values()
            .filter_map(|train| train.plan(&self.graph))
            .collect()
    }

    /// The number of ticks simulated so far.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn ledger(&self) -> &OccupancyLedger {
        &self.ledger
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The alerts raised during the most recent tick.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// The cached route plans.
    pub fn routes(&self) -> &[RoutePlan] {
        &self.routes
    }

    /// Returns an iterator over the trains in declaration order.
    pub fn iter_trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.values()
    }

    /// Gets a reference to the train with the given ID.
    pub fn get_train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(id)
    }

    /// Looks up a train by its code.
    pub fn train_by_code(&self, code: &str) -> Option<&Train> {
        self.trains.values().find(|train| train.code() == code)
    }
}
