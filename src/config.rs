//! Configuration for the telemetry relay
//!
//! Loaded from a TOML file; every section falls back to its defaults when
//! omitted.

use crate::error::{Error, Result};
use crate::session::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub filter: FilterConfig,
    pub motion: MotionConfig,
    pub logging: LoggingConfig,
}

/// UDP session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Local UDP port, also used as the peer's port for `peer`
    pub port: u16,
    /// Local address to bind; discovered when absent
    pub bind_ip: Option<Ipv4Addr>,
    /// Peer to connect to at start-up; otherwise wait to be connected
    pub peer: Option<Ipv4Addr>,
    /// Handshake timeout
    pub connect_timeout_ms: u64,
    /// Bounded retry window for each send
    pub send_timeout_ms: u64,
    /// Wait for a ping answer
    pub ping_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_ip: None,
            peer: None,
            connect_timeout_ms: 1000,
            send_timeout_ms: 1000,
            ping_timeout_ms: 500,
        }
    }
}

impl SessionConfig {
    /// Handshake timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Send retry window as a `Duration`
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Ping timeout as a `Duration`
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }
}

/// Sliding window configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Window length in samples
    pub history_size: usize,
    /// Values per sample
    pub number_of_parameter: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            number_of_parameter: 3,
        }
    }
}

/// Motion and containment thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Velocity above which a tick counts as moving
    pub velocity_threshold: f64,
    /// Consecutive agreeing ticks before a classification is reported
    pub min_n_samples: usize,
    /// Samples per unit of time
    pub sampling_rate: f64,
    /// Pin a reference sphere of this radius once the window has filled
    pub reference_radius: Option<f64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: 1.0,
            min_n_samples: 3,
            sampling_rate: 100.0,
            reference_radius: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the filter or relay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.filter.history_size == 0 {
            return Err(Error::InvalidConfiguration(
                "filter.history_size must be positive".to_string(),
            ));
        }
        if self.filter.number_of_parameter == 0 {
            return Err(Error::InvalidConfiguration(
                "filter.number_of_parameter must be positive".to_string(),
            ));
        }
        if self.motion.sampling_rate.is_nan() || self.motion.sampling_rate <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "motion.sampling_rate must be positive".to_string(),
            ));
        }
        if let Some(radius) = self.motion.reference_radius {
            if radius.is_nan() || radius < 0.0 {
                return Err(Error::InvalidConfiguration(
                    "motion.reference_radius must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.port, 5005);
        assert_eq!(config.session.ping_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[session]\npeer = \"192.168.1.20\"\n\n[filter]\nhistory_size = 10\n"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.session.peer, Some(Ipv4Addr::new(192, 168, 1, 20)));
        assert_eq!(config.session.port, 5005);
        assert_eq!(config.filter.history_size, 10);
        assert_eq!(config.filter.number_of_parameter, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = AppConfig::from_toml_str("[filter]\nhistory_size = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = AppConfig::from_toml_str("[motion]\nsampling_rate = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = AppConfig::from_toml_str("[filter\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
