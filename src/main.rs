use std::time::Instant;

use rail_sim::{Scenario, Simulation, SimulationConfig};

/// The number of frames to simulate before exiting.
const NUM_FRAMES: usize = 120;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match std::env::args().nth(1) {
        #[cfg(feature = "serde")]
        Some(path) => Scenario::from_json(&std::fs::read_to_string(path)?)?,
        _ => Scenario::demo(),
    };

    let config = SimulationConfig {
        speed_multiplier: 3.0,
        ..Default::default()
    };
    let mut sim = Simulation::initialize(&scenario, config)?;

    println!("Simulating...");
    let mut last = Instant::now();
    while sim.frame() < NUM_FRAMES {
        std::thread::sleep(sim.tick_interval());
        let now = Instant::now();
        let ticks = sim.advance(now - last);
        last = now;
        if ticks == 0 {
            continue;
        }

        let snapshot = sim.snapshot();
        let trains = snapshot
            .trains
            .iter()
            .map(|t| {
                format!(
                    "{} {:?} {} {:.2}",
                    t.id,
                    t.status,
                    t.segment.as_deref().unwrap_or("-"),
                    t.progress
                )
            })
            .collect::<Vec<_>>();
        println!(
            "frame {:>4} | {} | occupied {} conflicts {} traversals {}",
            snapshot.frame,
            trains.join(" | "),
            snapshot.stats.occupied,
            snapshot.stats.conflicts,
            snapshot.stats.traversals,
        );
        for alert in &snapshot.alerts {
            println!("           {:?}: {}", alert.severity, alert.message);
        }
    }

    Ok(())
}
