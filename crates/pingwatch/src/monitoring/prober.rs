use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::types::Host;

/// The probe itself could not run; says nothing about the host
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe mechanism failure: {0}")]
    Mechanism(String),
}

/// Reachability check for a single host
///
/// Timeouts, missing routes and silent hosts are `Ok(false)`. An `Err` is
/// reserved for a broken probe mechanism.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &Host) -> Result<bool, ProbeError>;
}

/// Extra time granted to the `ping` process on top of its own deadline
const PROCESS_GRACE: Duration = Duration::from_millis(500);

/// ICMP echo through the system `ping` binary (no raw socket privileges needed)
#[derive(Debug, Clone)]
pub struct IcmpProber {
    timeout_duration: Duration,
    program: String,
}

impl IcmpProber {
    pub fn new(timeout_duration: Duration) -> Self {
        Self { timeout_duration, program: "ping".to_string() }
    }

    /// Use another executable instead of `ping`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[cfg(target_os = "windows")]
    fn args(&self, host: &Host) -> Vec<String> {
        let millis = self.timeout_duration.as_millis().to_string();
        vec!["-n".into(), "1".into(), "-w".into(), millis, host.to_string()]
    }

    #[cfg(not(target_os = "windows"))]
    fn args(&self, host: &Host) -> Vec<String> {
        let secs = self.timeout_duration.as_secs().max(1).to_string();
        let deadline_flag = if cfg!(target_os = "macos") { "-t" } else { "-W" };
        vec!["-c".into(), "1".into(), deadline_flag.into(), secs, host.to_string()]
    }
}

#[async_trait::async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, host: &Host) -> Result<bool, ProbeError> {
        if host.as_str().starts_with('-') {
            return Err(ProbeError::Mechanism(format!("refusing option-like host {host}")));
        }

        let child = Command::new(&self.program)
            .args(self.args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    ProbeError::Mechanism(format!("{} not found in PATH", self.program))
                }
                ErrorKind::PermissionDenied => {
                    ProbeError::Mechanism(format!("permission denied running {}", self.program))
                }
                _ => ProbeError::Mechanism(format!("failed to spawn {}: {}", self.program, e)),
            })?;

        let output =
            match timeout(self.timeout_duration + PROCESS_GRACE, child.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(ProbeError::Mechanism(format!("waiting for {}: {}", self.program, e)));
                }
                Err(_) => {
                    debug!("ping {} timed out", host);
                    return Ok(false);
                }
            };

        debug!("ping {} exited with {}", host, output.status);
        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_capability_error(&stderr) {
            return Err(ProbeError::Mechanism(format!(
                "{} cannot send ICMP: {}",
                self.program,
                stderr.trim()
            )));
        }

        Ok(false)
    }
}

/// `ping` failed to open its socket rather than getting no reply
fn is_capability_error(stderr: &str) -> bool {
    const MARKERS: [&str; 4] =
        ["Operation not permitted", "Permission denied", "socket:", "requires root"];
    MARKERS.iter().any(|marker| stderr.contains(marker))
}

/// TCP connect checker
///
/// A refused connection still proves the host answered, so only timeouts
/// and network-level errors count as unreachable.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout_duration: Duration,
    port: u16,
}

impl TcpProber {
    pub fn new(timeout_duration: Duration, port: u16) -> Self {
        Self { timeout_duration, port }
    }
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &Host) -> Result<bool, ProbeError> {
        let connect = tokio::net::TcpStream::connect((host.as_str(), self.port));

        match timeout(self.timeout_duration, connect).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => Ok(true),
            Ok(Err(e)) => {
                debug!("TCP connection to {}:{} failed: {}", host, self.port, e);
                Ok(false)
            }
            Err(_) => {
                debug!("TCP connection to {}:{} timed out", host, self.port);
                Ok(false)
            }
        }
    }
}
