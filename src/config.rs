use crate::error::{Result, SimulationError};
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable parameters of a [Simulation](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// The real time between ticks at a speed multiplier of 1, in ms.
    pub tick_interval_ms: u64,
    /// The initial speed multiplier.
    pub speed_multiplier: f64,
    /// The permitted range of the speed multiplier.
    pub multiplier_bounds: Interval<f64>,
    /// The permitted range of train speeds.
    /// The lower bound is also the minimum effective speed on any segment.
    pub speed_bounds: Interval<f64>,
    /// The range speeds are clamped into after a reschedule.
    pub reschedule_bounds: Interval<f64>,
    /// The largest speed change applied by a reschedule, in either direction.
    pub reschedule_jitter: f64,
    /// The fraction of a segment after which a train is committed to it.
    pub safety_buffer: f64,
    /// The progress a train is held at while waiting to enter a blocked segment.
    pub park_progress: f64,
    /// Speed is divided by this to obtain progress per tick per unit length.
    pub progress_scale: f64,
    /// The most ticks a single call to `advance` will run; any further backlog is dropped.
    pub max_ticks_per_advance: usize,
    /// Whether the clock starts running.
    pub running: bool,
    /// Seed for the reschedule perturbations; drawn from entropy if absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
            speed_multiplier: 1.0,
            multiplier_bounds: Interval::new(0.5, 3.0),
            speed_bounds: Interval::new(10.0, 90.0),
            reschedule_bounds: Interval::new(30.0, 90.0),
            reschedule_jitter: 5.0,
            safety_buffer: 0.05,
            park_progress: 0.99,
            progress_scale: 1000.0,
            max_ticks_per_advance: 40,
            running: true,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Checks that every parameter is usable, so that no later tick,
    /// clock advance or reschedule can fail.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(SimulationError::config(reason));
        let unit = Interval::new(0.0, 1.0);

        if self.tick_interval_ms == 0 {
            return invalid("tick interval must be positive".into());
        }
        if !is_range(self.multiplier_bounds) || self.multiplier_bounds.min <= 0.0 {
            return invalid(format!(
                "speed multiplier bounds {:?} must be positive",
                self.multiplier_bounds
            ));
        }
        if !self.speed_multiplier.is_finite() {
            return invalid(format!("speed multiplier {} is not finite", self.speed_multiplier));
        }
        if !is_range(self.speed_bounds) || self.speed_bounds.min <= 0.0 {
            return invalid(format!("speed bounds {:?} must be positive", self.speed_bounds));
        }
        if !is_range(self.reschedule_bounds) {
            return invalid(format!("reschedule bounds {:?} are invalid", self.reschedule_bounds));
        }
        let width = self.reschedule_bounds.max - self.reschedule_bounds.min;
        if !Interval::new(0.0, width).contains(self.reschedule_jitter) {
            return invalid(format!(
                "reschedule jitter {} must lie within 0 and {}",
                self.reschedule_jitter, width
            ));
        }
        if !unit.contains(self.safety_buffer) {
            return invalid(format!("safety buffer {} must lie within 0 and 1", self.safety_buffer));
        }
        if !unit.contains(self.park_progress) {
            return invalid(format!("park progress {} must lie within 0 and 1", self.park_progress));
        }
        if !(self.progress_scale.is_finite() && self.progress_scale > 0.0) {
            return invalid(format!("progress scale {} must be positive", self.progress_scale));
        }
        if self.max_ticks_per_advance == 0 {
            return invalid("at least one tick must be allowed per advance".into());
        }
        Ok(())
    }
}

/// Whether the bounds are finite and in order.
fn is_range(bounds: Interval<f64>) -> bool {
    bounds.min.is_finite() && bounds.max.is_finite() && bounds.min <= bounds.max
}
