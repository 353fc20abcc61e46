use std::time::{Duration, SystemTime};

use super::types::NotificationEvent;

/// Periodic "still alive" timer, independent of host status
#[derive(Debug, Clone)]
pub struct HeartbeatScheduler {
    period: Duration,
    /// Polling interval quoted in the heartbeat message
    interval: Duration,
    last_fired: Option<SystemTime>,
}

impl HeartbeatScheduler {
    pub fn new(period: Duration, interval: Duration) -> Self {
        Self { period, interval, last_fired: None }
    }

    /// Fire if nothing was sent yet or strictly more than `period` has
    /// elapsed since the last heartbeat. A `now` earlier than the last
    /// heartbeat never fires.
    pub fn maybe_fire(&mut self, now: SystemTime) -> Option<NotificationEvent> {
        let due = match self.last_fired {
            None => true,
            Some(last) => now.duration_since(last).is_ok_and(|elapsed| elapsed > self.period),
        };

        if !due {
            return None;
        }

        self.last_fired = Some(now);
        Some(NotificationEvent::heartbeat(self.interval))
    }

    pub fn last_fired(&self) -> Option<SystemTime> {
        self.last_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::EventKind;

    const DAY: Duration = Duration::from_secs(86_400);

    fn scheduler() -> HeartbeatScheduler {
        HeartbeatScheduler::new(DAY, Duration::from_secs(5))
    }

    #[test]
    fn test_first_call_fires() {
        let mut hb = scheduler();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);

        let event = hb.maybe_fire(now).expect("first heartbeat should fire");
        assert_eq!(event.kind, EventKind::Heartbeat);
        assert_eq!(hb.last_fired(), Some(now));
    }

    #[test]
    fn test_within_period_fires_once() {
        let mut hb = scheduler();
        let t0 = SystemTime::UNIX_EPOCH;

        assert!(hb.maybe_fire(t0).is_some());
        assert!(hb.maybe_fire(t0 + DAY - Duration::from_secs(1)).is_none());
        // exactly one period is not "more than" a period
        assert!(hb.maybe_fire(t0 + DAY).is_none());
        assert_eq!(hb.last_fired(), Some(t0));
    }

    #[test]
    fn test_past_period_fires_again() {
        let mut hb = scheduler();
        let t0 = SystemTime::UNIX_EPOCH;
        let t1 = t0 + DAY + Duration::from_secs(1);

        assert!(hb.maybe_fire(t0).is_some());
        assert!(hb.maybe_fire(t1).is_some());
        assert_eq!(hb.last_fired(), Some(t1));
    }

    #[test]
    fn test_clock_going_backwards_does_not_fire() {
        let mut hb = scheduler();
        let t0 = SystemTime::UNIX_EPOCH + DAY * 3;

        assert!(hb.maybe_fire(t0).is_some());
        assert!(hb.maybe_fire(t0 - DAY * 2).is_none());
    }
}
