//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, colored lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" | "console" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Liveness policy for client connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// Time between pings. Zero disables the heartbeat.
    pub interval: Duration,
    /// A client silent for this long is dropped.
    pub idle_timeout: Duration,
}

impl Heartbeat {
    /// A heartbeat that never pings and never times a client out.
    pub const DISABLED: Self = Self {
        interval: Duration::ZERO,
        idle_timeout: Duration::ZERO,
    };

    /// Returns `true` if clients are pinged.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Per-connection tuning shared by every endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketSettings {
    /// Client liveness policy.
    pub heartbeat: Heartbeat,
    /// Upper bound on one broadcast write to one client.
    pub send_timeout: Duration,
    /// Largest inbound frame accepted on any socket.
    pub max_frame_bytes: usize,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            heartbeat: Heartbeat::default(),
            send_timeout: Duration::from_secs(10),
            max_frame_bytes: 1 << 20,
        }
    }
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Log output format.
    pub log_format: LogFormat,

    /// Socket tuning.
    pub sockets: SocketSettings,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is unset or invalid.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        let log_format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        let defaults = SocketSettings::default();
        let heartbeat = Heartbeat {
            interval: parse_secs("HEARTBEAT_INTERVAL_SECS", defaults.heartbeat.interval),
            idle_timeout: parse_secs("IDLE_TIMEOUT_SECS", defaults.heartbeat.idle_timeout),
        };
        let sockets = SocketSettings {
            heartbeat,
            send_timeout: parse_secs("SEND_TIMEOUT_SECS", defaults.send_timeout),
            max_frame_bytes: parse_env("MAX_FRAME_BYTES", defaults.max_frame_bytes),
        };

        Ok(Self {
            listen_addr,
            log_format,
            sockets,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable holding whole seconds.
fn parse_secs(key: &str, default: Duration) -> Duration {
    Duration::from_secs(parse_env(key, default.as_secs()))
}
