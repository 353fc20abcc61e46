//! Edge-triggered up/down tracking for the monitored hosts.
//!
//! Every host starts `Up`. An observation only produces an event when it
//! flips the stored status, so a host that stays down for hours yields a
//! single `Lost` notification and a single `Restored` when it comes back.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::types::{Host, HostStatus, NotificationEvent};

/// Owned host → status map, iterated in the order hosts were registered
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    order: Vec<Host>,
    statuses: HashMap<Host, HostStatus>,
}

impl StatusTracker {
    /// Register every host as `Up`. Duplicates keep their first position.
    pub fn new<I>(hosts: I) -> Self
    where
        I: IntoIterator<Item = Host>,
    {
        let mut tracker = Self::default();
        for host in hosts {
            tracker.register(host);
        }
        tracker
    }

    fn register(&mut self, host: Host) {
        if !self.statuses.contains_key(&host) {
            self.statuses.insert(host.clone(), HostStatus::Up);
            self.order.push(host);
        }
    }

    /// Feed one probe outcome and return the event for a transition, if any.
    ///
    /// Hosts that were never registered are added as `Up` before the
    /// observation is applied.
    pub fn observe(&mut self, host: &Host, reachable: bool) -> Option<NotificationEvent> {
        if !self.statuses.contains_key(host) {
            warn!("Observed untracked host {}, registering it as up", host);
            self.register(host.clone());
        }

        let status = self.statuses.get_mut(host)?;

        match (*status, reachable) {
            (HostStatus::Down, true) => {
                *status = HostStatus::Up;
                debug!("{} transitioned down -> up", host);
                Some(NotificationEvent::restored(host))
            }
            (HostStatus::Up, false) => {
                *status = HostStatus::Down;
                debug!("{} transitioned up -> down", host);
                Some(NotificationEvent::lost(host))
            }
            _ => None,
        }
    }

    pub fn status(&self, host: &Host) -> Option<HostStatus> {
        self.statuses.get(host).copied()
    }

    /// Hosts in registration order
    pub fn hosts(&self) -> &[Host] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Host, HostStatus)> {
        self.order.iter().map(|h| (h, self.statuses[h]))
    }

    pub fn down_hosts(&self) -> Vec<&Host> {
        self.iter().filter(|(_, s)| *s == HostStatus::Down).map(|(h, _)| h).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::EventKind;

    fn tracker() -> (StatusTracker, Host) {
        let host = Host::from("10.0.0.1");
        (StatusTracker::new([host.clone(), Host::from("10.0.0.2")]), host)
    }

    #[test]
    fn test_reachable_after_init_is_silent() {
        let (mut tracker, host) = tracker();
        assert_eq!(tracker.observe(&host, true), None);
        assert_eq!(tracker.status(&host), Some(HostStatus::Up));
    }

    #[test]
    fn test_repeated_failures_notify_once() {
        let (mut tracker, host) = tracker();

        let first = tracker.observe(&host, false).expect("first failure should notify");
        assert_eq!(first.kind, EventKind::Lost);
        assert_eq!(first.host.as_ref(), Some(&host));

        assert_eq!(tracker.observe(&host, false), None);
        assert_eq!(tracker.status(&host), Some(HostStatus::Down));
    }

    #[test]
    fn test_lost_then_restored() {
        let (mut tracker, host) = tracker();

        let events: Vec<_> = [false, true, true]
            .into_iter()
            .filter_map(|reachable| tracker.observe(&host, reachable))
            .collect();

        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Lost, EventKind::Restored]);
    }

    #[test]
    fn test_hosts_are_independent() {
        let (mut tracker, host) = tracker();
        let other = Host::from("10.0.0.2");

        tracker.observe(&host, false);

        assert_eq!(tracker.status(&other), Some(HostStatus::Up));
        assert_eq!(tracker.down_hosts(), vec![&host]);
    }

    #[test]
    fn test_unknown_host_is_registered_up() {
        let (mut tracker, _) = tracker();
        let stranger = Host::from("192.168.1.50");

        assert_eq!(tracker.observe(&stranger, true), None);
        assert_eq!(tracker.status(&stranger), Some(HostStatus::Up));
        assert_eq!(tracker.len(), 3);

        let event = tracker.observe(&stranger, false).unwrap();
        assert_eq!(event.kind, EventKind::Lost);
    }

    #[test]
    fn test_duplicates_collapse_in_order() {
        let tracker = StatusTracker::new(["b", "a", "b"].map(Host::from));
        let hosts: Vec<_> = tracker.hosts().iter().map(Host::as_str).collect();
        assert_eq!(hosts, vec!["b", "a"]);
    }
}
