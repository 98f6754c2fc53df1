use crate::util::Interval;
use std::time::Duration;

/// Decides when ticks are due, given the passage of real time.
#[derive(Clone, Debug)]
pub struct Clock {
    /// Whether ticks are being produced.
    running: bool,
    /// Ticks are produced this many times faster than the base rate.
    multiplier: f64,
    /// The permitted range of `multiplier`.
    bounds: Interval<f64>,
    /// The time between ticks at a multiplier of 1.
    base_interval: Duration,
    /// Real time accumulated since the last tick.
    pending: Duration,
    /// The most ticks produced by one call to [Self::advance].
    max_ticks: usize,
}

impl Clock {
    /// Creates a new clock.
    pub fn new(
        base_interval: Duration,
        multiplier: f64,
        bounds: Interval<f64>,
        max_ticks: usize,
        running: bool,
    ) -> Self {
        let mut clock = Self {
            running,
            multiplier: 1.0,
            bounds,
            base_interval,
            pending: Duration::ZERO,
            max_ticks,
        };
        clock.set_multiplier(multiplier);
        clock
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts or pauses the clock. Pausing discards any partially elapsed tick.
    pub fn set_running(&mut self, running: bool) {
        if !running {
            self.pending = Duration::ZERO;
        }
        self.running = running;
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Sets the speed multiplier, clamped to the permitted range.
    /// Non-finite values are ignored.
    pub fn set_multiplier(&mut self, multiplier: f64) {
        if !multiplier.is_finite() {
            log::warn!("ignoring speed multiplier {}", multiplier);
            return;
        }
        self.multiplier = self.bounds.clamp(multiplier);
    }

    /// The real time between ticks at the current multiplier.
    /// Saturates at [Duration::MAX] if the multiplier is not positive.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_interval.as_secs_f64() / self.multiplier)
            .unwrap_or(Duration::MAX)
    }

    /// Accounts for `elapsed` real time, returning the number of ticks now due.
    ///
    /// At most `max_ticks` are returned; a backlog beyond that is discarded.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if !self.running {
            return 0;
        }
        let interval = self.interval();
        if interval.is_zero() {
            return 0;
        }
        self.pending = self.pending.saturating_add(elapsed);
        let mut due = 0;
        while self.pending >= interval {
            if due == self.max_ticks {
                log::warn!("dropping {:?} of tick backlog", self.pending);
                self.pending = Duration::ZERO;
                break;
            }
            self.pending -= interval;
            due += 1;
        }
        due
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn clock() -> Clock {
        Clock::new(Duration::from_millis(250), 1.0, Interval::new(0.5, 3.0), 40, true)
    }

    #[test]
    fn interval_scales_with_multiplier() {
        let mut clock = clock();
        assert_eq!(clock.interval(), Duration::from_millis(250));
        clock.set_multiplier(2.0);
        assert_eq!(clock.interval(), Duration::from_millis(125));
        clock.set_multiplier(10.0);
        assert_eq!(clock.multiplier(), 3.0);
        clock.set_multiplier(f64::NAN);
        assert_eq!(clock.multiplier(), 3.0);
        clock.set_multiplier(0.1);
        assert_eq!(clock.interval(), Duration::from_millis(500));
    }

    #[test]
    fn accumulates_partial_ticks() {
        let mut clock = clock();
        assert_eq!(clock.advance(Duration::from_millis(100)), 0);
        assert_eq!(clock.advance(Duration::from_millis(200)), 1);
        assert_eq!(clock.advance(Duration::from_millis(700)), 3);
    }

    #[test]
    fn paused_clock_produces_nothing() {
        let mut clock = clock();
        clock.advance(Duration::from_millis(200));
        clock.set_running(false);
        assert_eq!(clock.advance(Duration::from_secs(10)), 0);
        clock.set_running(true);
        assert_eq!(clock.advance(Duration::from_millis(200)), 0);
        assert_eq!(clock.advance(Duration::from_millis(50)), 1);
    }

    #[test]
    fn backlog_is_capped() {
        let mut clock = clock();
        assert_eq!(clock.advance(Duration::from_secs(3600)), 40);
        assert_eq!(clock.advance(Duration::from_millis(100)), 0);
        assert_eq!(clock.advance(Duration::from_millis(150)), 1);
    }

    #[test]
    fn degenerate_multiplier_stops_ticks() {
        let bounds = Interval::new(0.0, 3.0);
        let mut clock = Clock::new(Duration::from_millis(250), 0.0, bounds, 40, true);
        assert_eq!(clock.multiplier(), 0.0);
        assert_eq!(clock.interval(), Duration::MAX);
        assert_eq!(clock.advance(Duration::from_secs(10)), 0);
    }
}
