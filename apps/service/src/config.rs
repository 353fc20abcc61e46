use std::{env, fmt, fs, io, path, str::FromStr, time::Duration};

use pingwatch::Host;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", .path.display())]
    ParseFailed { path: path::PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    #[default]
    Icmp,
    Tcp,
}

impl FromStr for ProbeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "icmp" => Ok(Self::Icmp),
            "tcp" => Ok(Self::Tcp),
            other => Err(format!("expected icmp or tcp, got {other:?}")),
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMode::Icmp => write!(f, "icmp"),
            ProbeMode::Tcp => write!(f, "tcp"),
        }
    }
}

/// Optional TOML file; every value can be overridden from the environment
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub monitor: FileMonitor,
    pub probe: FileProbe,
    pub telegram: FileTelegram,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileMonitor {
    pub interval: Option<u64>,
    pub hosts: Option<Vec<String>>,
    pub heartbeat_period: Option<u64>,
    pub debug: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileProbe {
    pub mode: Option<ProbeMode>,
    pub timeout: Option<u64>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileTelegram {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub monitor: Monitor,
    pub probe: Probe,
    pub telegram: Telegram,
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub interval: Duration,
    pub hosts: Vec<Host>,
    pub heartbeat_period: Duration,
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct Probe {
    pub mode: ProbeMode,
    pub timeout: Duration,
    pub port: u16,
}

#[derive(Clone)]
pub struct Telegram {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_url: String,
}

impl fmt::Debug for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telegram")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Default config path ($XDG_CONFIG_HOME/pingwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Option<path::PathBuf> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else {
        env::home_dir()?.join(".config")
    };

    Some(path.join("pingwatch/config.toml"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, reason: format!("expected a boolean, got {raw:?}") }),
    }
}

fn parse_seconds(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|e| ConfigError::Invalid { name, reason: format!("{raw:?}: {e}") })
}

fn positive_seconds(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid { name, reason: "must be greater than zero".into() });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_hosts(raw: Vec<String>) -> Result<Vec<Host>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::Missing("IP_ADDRESSES"));
    }

    raw.into_iter()
        .map(|entry| {
            let host = entry.trim();
            if host.is_empty() || host.starts_with('-') {
                return Err(ConfigError::Invalid {
                    name: "IP_ADDRESSES",
                    reason: format!("{entry:?} is not a host"),
                });
            }
            Ok(Host::from(host))
        })
        .collect()
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let set_or_unset = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        let hosts = self.monitor.hosts.iter().map(Host::as_str).collect::<Vec<_>>().join(" ");

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitor")?;
        write_1(f, "Interval (s)", &self.monitor.interval.as_secs())?;
        write_1(f, "Hosts", &hosts)?;
        write_1(f, "Heartbeat Period (s)", &self.monitor.heartbeat_period.as_secs())?;
        write_1(f, "Debug", &self.monitor.debug)?;
        write_title_1(f, "Probe")?;
        write_1(f, "Mode", &self.probe.mode)?;
        write_1(f, "Timeout (s)", &self.probe.timeout.as_secs())?;
        write_1(f, "Port", &self.probe.port)?;
        write_title_1(f, "Telegram")?;
        write_1(f, "Bot Token", &set_or_unset(&self.telegram.bot_token))?;
        write_1(f, "Chat ID", &set_or_unset(&self.telegram.chat_id))?;
        write_1(f, "API URL", &self.telegram.api_url)?;

        Ok(())
    }
}

impl Config {
    /// Build the session configuration from the process environment.
    ///
    /// The file named by `PINGWATCH_CONFIG` is read first when set (it must
    /// exist), otherwise the default path is used if present. Environment
    /// variables win over file values.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match non_empty(env::var("PINGWATCH_CONFIG").ok()) {
            Some(p) => FileConfig::from_path(&normalize_toml_path(path::Path::new(&p)))?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => FileConfig::from_path(&p)?,
                None => FileConfig::default(),
            },
        };

        Self::resolve(file, |name| env::var(name).ok())
    }

    /// Merge file values with a variable lookup and validate the result
    pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(lookup(name));

        let interval = match var("PING_INTERVAL") {
            Some(raw) => parse_seconds("PING_INTERVAL", &raw)?,
            None => file.monitor.interval.ok_or(ConfigError::Missing("PING_INTERVAL"))?,
        };

        let hosts = match var("IP_ADDRESSES") {
            Some(raw) => raw.split_whitespace().map(str::to_string).collect(),
            None => file.monitor.hosts.unwrap_or_default(),
        };

        let heartbeat_period = match var("HEARTBEAT_PERIOD") {
            Some(raw) => parse_seconds("HEARTBEAT_PERIOD", &raw)?,
            None => file.monitor.heartbeat_period.unwrap_or(pingwatch::DEFAULT_HEARTBEAT_PERIOD.as_secs()),
        };

        let debug = match var("DEBUG_MODE") {
            Some(raw) => parse_bool("DEBUG_MODE", &raw)?,
            None => file.monitor.debug.unwrap_or(false),
        };

        let mode = match var("PROBE_MODE") {
            Some(raw) => raw
                .parse()
                .map_err(|reason| ConfigError::Invalid { name: "PROBE_MODE", reason })?,
            None => file.probe.mode.unwrap_or_default(),
        };

        let timeout = match var("PROBE_TIMEOUT") {
            Some(raw) => parse_seconds("PROBE_TIMEOUT", &raw)?,
            None => file.probe.timeout.unwrap_or(pingwatch::DEFAULT_PROBE_TIMEOUT.as_secs()),
        };

        let port = match var("PROBE_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PROBE_PORT",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => file.probe.port.unwrap_or(80),
        };

        Ok(Self {
            monitor: Monitor {
                interval: positive_seconds("PING_INTERVAL", interval)?,
                hosts: parse_hosts(hosts)?,
                heartbeat_period: positive_seconds("HEARTBEAT_PERIOD", heartbeat_period)?,
                debug,
            },
            probe: Probe { mode, timeout: positive_seconds("PROBE_TIMEOUT", timeout)?, port },
            telegram: Telegram {
                bot_token: var("TELEGRAM_BOT_TOKEN").or(non_empty(file.telegram.bot_token)),
                chat_id: var("TELEGRAM_CHAT_ID").or(non_empty(file.telegram.chat_id)),
                api_url: var("TELEGRAM_API_URL")
                    .or(non_empty(file.telegram.api_url))
                    .unwrap_or_else(|| pingwatch::notify::telegram::DEFAULT_API_BASE.to_string()),
            },
        })
    }
}

impl FileConfig {
    pub fn from_path(path: &path::Path) -> Result<Self, ConfigError> {
        let raw_string = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFailed { path: path.to_path_buf(), source })?;
        toml::from_str(raw_string.as_str())
            .map_err(|source| ConfigError::ParseFailed { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_environment() {
        let config = Config::resolve(
            FileConfig::default(),
            lookup(&[("PING_INTERVAL", "5"), ("IP_ADDRESSES", " 10.0.0.1\t10.0.0.2\n")]),
        )
        .unwrap();

        assert_eq!(config.monitor.interval, Duration::from_secs(5));
        assert_eq!(config.monitor.hosts, vec![Host::from("10.0.0.1"), Host::from("10.0.0.2")]);
        assert_eq!(config.monitor.heartbeat_period, Duration::from_secs(86_400));
        assert!(!config.monitor.debug);
        assert_eq!(config.probe.mode, ProbeMode::Icmp);
        assert_eq!(config.probe.timeout, Duration::from_secs(3));
        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
    }

    #[test]
    fn test_missing_interval_is_fatal() {
        let err = Config::resolve(FileConfig::default(), lookup(&[("IP_ADDRESSES", "10.0.0.1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PING_INTERVAL")));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = Config::resolve(
            FileConfig::default(),
            lookup(&[("PING_INTERVAL", "0"), ("IP_ADDRESSES", "10.0.0.1")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PING_INTERVAL", .. }));
    }

    #[test]
    fn test_blank_hosts_are_missing() {
        let err = Config::resolve(
            FileConfig::default(),
            lookup(&[("PING_INTERVAL", "5"), ("IP_ADDRESSES", "   ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("IP_ADDRESSES")));
    }

    #[test]
    fn test_debug_mode_spellings() {
        for (raw, expected) in [("true", true), ("1", true), ("ON", true), ("False", false), ("0", false)] {
            let config = Config::resolve(
                FileConfig::default(),
                lookup(&[("PING_INTERVAL", "5"), ("IP_ADDRESSES", "h"), ("DEBUG_MODE", raw)]),
            )
            .unwrap();
            assert_eq!(config.monitor.debug, expected, "DEBUG_MODE={raw}");
        }

        let err = Config::resolve(
            FileConfig::default(),
            lookup(&[("PING_INTERVAL", "5"), ("IP_ADDRESSES", "h"), ("DEBUG_MODE", "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DEBUG_MODE", .. }));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pingwatch.toml");
        fs::write(
            &path,
            r#"
[monitor]
interval = 60
hosts = ["192.168.1.1", "nas.lan"]
debug = true

[probe]
mode = "tcp"
port = 22

[telegram]
bot_token = "from-file"
chat_id = "1"
"#,
        )
        .unwrap();

        let file = FileConfig::from_path(&path).unwrap();
        let config =
            Config::resolve(file, lookup(&[("PING_INTERVAL", "10"), ("TELEGRAM_BOT_TOKEN", "from-env")]))
                .unwrap();

        assert_eq!(config.monitor.interval, Duration::from_secs(10));
        assert_eq!(config.monitor.hosts.len(), 2);
        assert!(config.monitor.debug);
        assert_eq!(config.probe.mode, ProbeMode::Tcp);
        assert_eq!(config.probe.port, 22);
        assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_unknown_file_keys_fail_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[zeromq]\nport = 5555\n").unwrap();

        assert!(matches!(FileConfig::from_path(&path), Err(ConfigError::ParseFailed { .. })));
    }

    #[test]
    fn test_file_hosts_are_trimmed_and_blanks_rejected() {
        let mut file = FileConfig::default();
        file.monitor.hosts = Some(vec!["  nas.lan ".to_string(), "10.0.0.1".to_string()]);
        let config = Config::resolve(file, lookup(&[("PING_INTERVAL", "5")])).unwrap();
        assert_eq!(config.monitor.hosts, vec![Host::from("nas.lan"), Host::from("10.0.0.1")]);

        for bad in ["", "   ", "-c"] {
            let mut file = FileConfig::default();
            file.monitor.hosts = Some(vec!["10.0.0.1".to_string(), bad.to_string()]);
            let err = Config::resolve(file, lookup(&[("PING_INTERVAL", "5")])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "IP_ADDRESSES", .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_toml_extension_is_enforced() {
        assert_eq!(
            normalize_toml_path(path::Path::new("/etc/pingwatch")),
            path::PathBuf::from("/etc/pingwatch.toml")
        );
    }

    #[test]
    fn test_display_hides_credentials() {
        let config = Config::resolve(
            FileConfig::default(),
            lookup(&[
                ("PING_INTERVAL", "5"),
                ("IP_ADDRESSES", "10.0.0.1"),
                ("TELEGRAM_BOT_TOKEN", "123:SECRET"),
            ]),
        )
        .unwrap();

        let rendered = config.to_string();
        assert!(rendered.contains("Bot Token: set"));
        assert!(!rendered.contains("SECRET"));
        assert!(!format!("{config:?}").contains("SECRET"));
    }
}
