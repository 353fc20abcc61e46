#![warn(clippy::all, clippy::pedantic)]

use std::{future::Future, io, sync::Arc};

use pingwatch::{
    DEFAULT_NOTIFY_TIMEOUT, IcmpProber, Monitor, MonitorSettings, Prober, TcpProber,
    TelegramNotifier,
};
use tracing::{debug, info, warn};

mod config;
mod error;

use config::{Config, ProbeMode};
use error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let dotenv = dotenvy::dotenv();

    let config = Config::load()?;
    logger::init(config.monitor.debug);

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {e}");
        }
    }
    debug!("{config}");

    let prober: Arc<dyn Prober> = match config.probe.mode {
        ProbeMode::Icmp => Arc::new(IcmpProber::new(config.probe.timeout)),
        ProbeMode::Tcp => Arc::new(TcpProber::new(config.probe.timeout, config.probe.port)),
    };

    let notifier = TelegramNotifier::new(
        config.telegram.bot_token.clone(),
        config.telegram.chat_id.clone(),
        DEFAULT_NOTIFY_TIMEOUT,
    )?
    .with_api_base(config.telegram.api_url.clone());

    if !notifier.is_configured() {
        info!("Telegram credentials missing, notifications disabled");
    }

    let settings = MonitorSettings {
        interval: config.monitor.interval,
        heartbeat_period: config.monitor.heartbeat_period,
        debug: config.monitor.debug,
    };

    let shutdown = shutdown_signal()?;

    let mut monitor = Monitor::new(config.monitor.hosts, prober, Arc::new(notifier), settings);
    monitor.run_until(shutdown).await;

    Ok(())
}

/// Install the signal handlers now and return a future resolving on
/// Ctrl+C, or SIGTERM on Unix. Signals arriving before the future is first
/// polled are not lost.
#[cfg(unix)]
fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal as unix_signal};

    let mut interrupt = unix_signal(SignalKind::interrupt())?;
    let mut terminate = unix_signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("Ctrl+C received, finishing current cycle"),
            _ = terminate.recv() => info!("SIGTERM received, finishing current cycle"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, finishing current cycle"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    })
}
