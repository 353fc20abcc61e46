//! pingwatch - host reachability monitoring with edge-triggered notifications
//!
//! The library holds everything except process wiring: the per-host status
//! state machine, the heartbeat timer, the probe and notifier capabilities,
//! and the loop that drives them.

pub mod monitoring;
pub mod notify;

// Re-export main types
pub use monitoring::{
    EventKind, HeartbeatScheduler, Host, HostStatus, IcmpProber, Monitor, MonitorSettings,
    NotificationEvent, Phase, ProbeError, Prober, StatusTracker, TcpProber,
};
pub use notify::{NotifyError, Notifier, TelegramNotifier};

use std::time::Duration;

/// Default time between two heartbeat notifications (24 hours)
pub const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_secs(86_400);

/// Default deadline for a single probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Default deadline for one outbound notification request
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);
