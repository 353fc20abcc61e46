use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::heartbeat::HeartbeatScheduler;
use super::prober::Prober;
use super::tracker::StatusTracker;
use super::types::{Host, NotificationEvent};
use crate::notify::{Notifier, NotifyError};

/// Loop timing and logging policy
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    pub heartbeat_period: Duration,
    /// Log every notification outcome instead of staying silent
    pub debug: bool,
}

impl MonitorSettings {
    pub fn new(interval: Duration) -> Self {
        Self { interval, heartbeat_period: crate::DEFAULT_HEARTBEAT_PERIOD, debug: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
}

/// Drives probe cycles and hands the resulting events to the notifier
pub struct Monitor {
    prober: Arc<dyn Prober>,
    notifier: Arc<dyn Notifier>,
    tracker: StatusTracker,
    heartbeat: HeartbeatScheduler,
    settings: MonitorSettings,
    phase: Phase,
}

impl Monitor {
    pub fn new(
        hosts: Vec<Host>,
        prober: Arc<dyn Prober>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            prober,
            notifier,
            tracker: StatusTracker::new(hosts),
            heartbeat: HeartbeatScheduler::new(settings.heartbeat_period, settings.interval),
            settings,
            phase: Phase::Initializing,
        }
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Send the startup announcement and switch to `Running`.
    /// Does nothing once the monitor is running.
    pub async fn announce(&mut self) -> Option<NotificationEvent> {
        if self.phase == Phase::Running {
            return None;
        }

        let event = NotificationEvent::startup(self.tracker.hosts());
        info!("Monitoring {} host(s) every {:?}", self.tracker.len(), self.settings.interval);
        self.deliver(&event).await;
        self.phase = Phase::Running;
        Some(event)
    }

    /// Probe every host, update statuses, check the heartbeat and send
    /// whatever came out of it. Returns the events of this cycle in send
    /// order, whether or not delivery succeeded.
    pub async fn run_cycle(&mut self, now: SystemTime) -> Vec<NotificationEvent> {
        let events = self.collect_events(now).await;

        for event in &events {
            self.deliver(event).await;
        }

        debug!(
            "Cycle complete: {} host(s), {} down, {} event(s)",
            self.tracker.len(),
            self.tracker.down_hosts().len(),
            events.len()
        );

        events
    }

    async fn collect_events(&mut self, now: SystemTime) -> Vec<NotificationEvent> {
        let hosts = self.tracker.hosts().to_vec();
        let prober = &self.prober;

        // probes run concurrently, statuses are only touched afterwards
        let outcomes = join_all(hosts.iter().map(|host| prober.probe(host))).await;

        let mut events = Vec::new();
        for (host, outcome) in hosts.iter().zip(outcomes) {
            match outcome {
                Ok(reachable) => {
                    if let Some(event) = self.tracker.observe(host, reachable) {
                        events.push(event);
                    }
                }
                Err(e) => warn!("Skipping {} this cycle: {}", host, e),
            }
        }

        if let Some(event) = self.heartbeat.maybe_fire(now) {
            events.push(event);
        }

        events
    }

    /// Outcomes are only logged in debug mode, otherwise failures are dropped
    async fn deliver(&self, event: &NotificationEvent) {
        let result = self.notifier.send(&event.message).await;

        if !self.settings.debug {
            return;
        }

        match result {
            Ok(()) => info!("Sent {:?} notification", event.kind),
            Err(NotifyError::Unconfigured) => {
                info!("Notifier not configured, skipped {:?} notification", event.kind)
            }
            Err(e) => warn!("Failed to send {:?} notification: {}", event.kind, e),
        }
    }

    /// Announce, then cycle until `shutdown` resolves. A cycle that has
    /// started always completes before the loop exits.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.announce().await;
        tokio::pin!(shutdown);

        loop {
            self.run_cycle(SystemTime::now()).await;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, monitor stopped");
                    break;
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
    }
}
