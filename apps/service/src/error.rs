use std::io::Error as IoError;

use pingwatch::NotifyError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Notifier setup failed: {0}")]
    Notifier(#[from] NotifyError),
}
