/// Tick scheduler.
///
/// Armed while the game is Playing, disarmed otherwise. The host polls
/// `due()` from its frame loop; at most one tick is reported per poll,
/// so a slow frame never produces a burst of back-to-back ticks.

use std::time::{Duration, Instant};

use crate::sim::world::Status;

pub struct TickScheduler {
    interval: Duration,
    next_due: Option<Instant>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        TickScheduler { interval, next_due: None }
    }

    /// Arm on entering Playing, disarm on leaving it.
    pub fn sync(&mut self, status: Status, now: Instant) {
        match (status == Status::Playing, self.next_due) {
            (true, None) => self.next_due = Some(now + self.interval),
            (false, Some(_)) => self.next_due = None,
            _ => {}
        }
    }

    /// True when a tick should run now. Re-arms for the next interval.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if now >= at => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, or None while disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|at| at.saturating_duration_since(now))
    }
}
