use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A monitored endpoint, identified by address or hostname
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Host {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Host {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reachability status of a host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    /// Assumed until a probe proves otherwise
    #[default]
    Up,
    Down,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostStatus::Up => write!(f, "up"),
            HostStatus::Down => write!(f, "down"),
        }
    }
}

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A host went from down back to up
    Restored,
    /// A host stopped answering
    Lost,
    /// Periodic proof that the monitor itself is alive
    Heartbeat,
    /// Sent once before the first cycle
    StartupAnnouncement,
}

impl EventKind {
    /// Short title used as the message header
    pub fn title(&self) -> &'static str {
        match self {
            EventKind::Restored => "Host restored",
            EventKind::Lost => "Host lost",
            EventKind::Heartbeat => "Heartbeat",
            EventKind::StartupAnnouncement => "Monitoring started",
        }
    }
}

/// A rendered notification, ready to be handed to a notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: EventKind,

    /// Host concerned by a transition, `None` for heartbeat and startup
    pub host: Option<Host>,

    /// Plain text body; escaping is the notifier's job
    pub message: String,
}

impl NotificationEvent {
    pub fn restored(host: &Host) -> Self {
        Self {
            kind: EventKind::Restored,
            host: Some(host.clone()),
            message: format!("✅ {host} is reachable again"),
        }
    }

    pub fn lost(host: &Host) -> Self {
        Self {
            kind: EventKind::Lost,
            host: Some(host.clone()),
            message: format!("❌ {host} is unreachable"),
        }
    }

    pub fn heartbeat(interval: Duration) -> Self {
        Self {
            kind: EventKind::Heartbeat,
            host: None,
            message: format!(
                "💓 Monitor is alive, probing every {}",
                humantime::format_duration(interval)
            ),
        }
    }

    pub fn startup(hosts: &[Host]) -> Self {
        let list = hosts.iter().map(|h| format!("• {h}")).collect::<Vec<_>>().join("\n");
        Self {
            kind: EventKind::StartupAnnouncement,
            host: None,
            message: format!("🚀 Monitoring {} host(s):\n{list}", hosts.len()),
        }
    }
}
