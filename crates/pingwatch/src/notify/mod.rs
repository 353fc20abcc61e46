//! Outbound notification delivery.
//!
//! A notifier only reports what happened; whether a failure gets logged or
//! ignored is decided by the monitor loop.

pub mod telegram;

pub use telegram::TelegramNotifier;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Credentials are missing, nothing was sent
    #[error("notifier is not configured")]
    Unconfigured,

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The channel answered but refused the message
    #[error("rejected by remote: {0}")]
    RemoteRejected(String),
}

/// Delivers a text message to an external channel
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
