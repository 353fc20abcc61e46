/// Monitoring engine module - decides when hosts change state
///
/// This module is responsible for:
/// - Probing hosts (ICMP or TCP)
/// - Tracking per-host up/down status
/// - Scheduling the periodic heartbeat
/// - Driving the cycle loop and handing events to a notifier
pub mod heartbeat;
pub mod monitor;
pub mod prober;
pub mod tracker;
pub mod types;

pub use heartbeat::HeartbeatScheduler;
pub use monitor::{Monitor, MonitorSettings, Phase};
pub use prober::{IcmpProber, ProbeError, Prober, TcpProber};
pub use tracker::StatusTracker;
pub use types::{EventKind, Host, HostStatus, NotificationEvent};
