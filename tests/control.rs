//! Operator controls: run state, speed multiplier and rescheduling.

use rail_sim::{Scenario, Severity, Simulation, SimulationConfig, TrainStatus};
use std::time::Duration;

fn demo(seed: u64) -> Simulation {
    let config = SimulationConfig {
        seed: Some(seed),
        ..Default::default()
    };
    Simulation::initialize(&Scenario::demo(), config).unwrap()
}

#[test]
fn paused_simulation_does_not_advance() {
    let mut sim = demo(1);
    assert_eq!(sim.advance(Duration::from_millis(500)), 2);
    assert_eq!(sim.frame(), 2);

    sim.set_running(false);
    assert!(!sim.is_running());
    let before = sim.snapshot();
    assert_eq!(sim.advance(Duration::from_secs(5)), 0);
    let after = sim.snapshot();
    assert_eq!(before, after);
    assert!(!after.running);

    // Manual steps still work while paused.
    sim.tick();
    assert_eq!(sim.frame(), 3);
}

#[test]
fn speed_multiplier_changes_cadence() {
    let mut sim = demo(1);
    assert_eq!(sim.tick_interval(), Duration::from_millis(250));

    sim.set_speed_multiplier(2.0);
    assert_eq!(sim.tick_interval(), Duration::from_millis(125));
    assert_eq!(sim.advance(Duration::from_millis(500)), 4);

    sim.set_speed_multiplier(100.0);
    assert_eq!(sim.speed_multiplier(), 3.0);
    sim.set_speed_multiplier(0.0);
    assert_eq!(sim.speed_multiplier(), 0.5);
    sim.set_speed_multiplier(f64::INFINITY);
    assert_eq!(sim.speed_multiplier(), 0.5);
    assert_eq!(sim.snapshot().speed_multiplier, 0.5);
}

#[test]
fn reschedule_adjusts_speeds() {
    let mut sim = demo(7);
    let before = sim.iter_trains().map(|t| t.speed()).collect::<Vec<_>>();
    sim.tick();
    sim.trigger_reschedule();

    for (train, old) in sim.iter_trains().zip(before) {
        assert!((30.0..=90.0).contains(&train.speed()));
        assert!((train.speed() - old.max(30.0)).abs() <= 5.0);
    }
    assert_eq!(sim.alerts().len(), 1);
    assert_eq!(sim.alerts()[0].severity, Severity::Low);
    assert_eq!(
        sim.alerts()[0].message,
        "Rescheduling applied: speeds adjusted based on congestion."
    );

    // The notice is replaced by the next tick's alerts.
    sim.tick();
    assert!(sim
        .alerts()
        .iter()
        .all(|alert| !alert.message.starts_with("Rescheduling")));
}

#[test]
fn reschedule_is_reproducible() {
    let mut a = demo(99);
    let mut b = demo(99);
    a.trigger_reschedule();
    b.trigger_reschedule();
    let speeds = |sim: &Simulation| sim.iter_trains().map(|t| t.speed()).collect::<Vec<_>>();
    assert_eq!(speeds(&a), speeds(&b));
}

#[test]
fn reschedule_replans_routes() {
    let mut sim = demo(3);
    assert_eq!(sim.routes().len(), 3);
    for _ in 0..200 {
        sim.tick();
    }
    assert!(sim.iter_trains().all(|t| t.status() == TrainStatus::Idle));
    assert_eq!(sim.routes().len(), 3);

    sim.trigger_reschedule();
    assert!(sim.routes().is_empty());
}

#[test]
fn initial_route_plans() {
    let sim = demo(1);
    let routes = sim.snapshot().routes;
    let summaries = routes
        .iter()
        .map(|r| (r.train.as_str(), r.summary.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        summaries,
        [
            ("T1", "Alpha · Cross · Delta"),
            ("T2", "Cross · Beta · Sig-2 · Alpha"),
            ("T3", "Beta · Sig-2 · Alpha"),
        ]
    );
    assert_eq!(routes[0].nodes, ["A", "C", "D"]);
}

#[test]
fn long_stall_runs_bounded_ticks() {
    let mut sim = demo(1);
    assert_eq!(sim.advance(Duration::from_secs(3600)), 40);
    assert_eq!(sim.frame(), 40);
    assert_eq!(sim.advance(Duration::from_millis(100)), 0);
    assert_eq!(sim.advance(Duration::from_millis(150)), 1);
}

#[test]
fn slowest_multiplier_keeps_ticking() {
    let mut sim = demo(1);
    sim.set_speed_multiplier(0.0);
    assert_eq!(sim.speed_multiplier(), 0.5);
    assert_eq!(sim.tick_interval(), Duration::from_millis(500));
    assert_eq!(sim.advance(Duration::from_millis(1000)), 2);
}

#[test]
fn widest_jitter_stays_in_bounds() {
    let config = SimulationConfig {
        reschedule_jitter: 60.0,
        seed: Some(5),
        ..Default::default()
    };
    let mut sim = Simulation::initialize(&Scenario::demo(), config).unwrap();
    for _ in 0..20 {
        sim.trigger_reschedule();
        assert!(sim.iter_trains().all(|t| (30.0..=90.0).contains(&t.speed())));
    }
}
