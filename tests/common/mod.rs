//! Helpers for describing small networks in tests.

#![allow(dead_code)]

use rail_sim::{
    Direction, Directionality, NodeAttributes, NodeKind, Scenario, SegmentAttributes, Simulation,
    SimulationConfig, TrainAttributes,
};

pub fn node(id: &str) -> NodeAttributes {
    NodeAttributes {
        id: id.into(),
        name: id.into(),
        kind: NodeKind::Station,
        position: None,
    }
}

pub fn segment(id: &str, from: &str, to: &str, length: f64) -> SegmentAttributes {
    SegmentAttributes {
        id: id.into(),
        from: from.into(),
        to: to.into(),
        length,
        speed_limit: 80.0,
        direction: Directionality::Bidirectional,
        capacity: 1,
    }
}

pub fn one_way(id: &str, from: &str, to: &str, length: f64) -> SegmentAttributes {
    SegmentAttributes {
        direction: Directionality::OneWay,
        ..segment(id, from, to, length)
    }
}

pub fn train(id: &str, speed: f64, segment: &str, destination: &str) -> TrainAttributes {
    TrainAttributes {
        id: id.into(),
        name: id.into(),
        speed,
        segment: segment.into(),
        direction: Direction::Forward,
        destination: destination.into(),
    }
}

pub fn reversed(train: TrainAttributes) -> TrainAttributes {
    TrainAttributes {
        direction: Direction::Reverse,
        ..train
    }
}

/// A deterministic configuration.
pub fn config() -> SimulationConfig {
    SimulationConfig {
        seed: Some(42),
        ..Default::default()
    }
}

pub fn simulate(
    nodes: Vec<NodeAttributes>,
    segments: Vec<SegmentAttributes>,
    trains: Vec<TrainAttributes>,
) -> Simulation {
    let scenario = Scenario {
        nodes,
        segments,
        trains,
    };
    Simulation::initialize(&scenario, config()).unwrap()
}
