//! Heartbeat configuration
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! JSON file at `~/.heartfile/config.json`, then `HEARTFILE_*` environment
//! variables. Command-line flags in the binary are applied last.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::error::{HeartError, Result};

/// Default coalescing delay between `beat()` and the file write.
pub const DEFAULT_BEAT_DELAY_MS: u64 = 50;

/// Default period of the activity-check scheduler.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Largest accepted `check_interval_secs` (30 days).
pub const MAX_CHECK_INTERVAL_SECS: u64 = 30 * 24 * 60 * 60;

/// Environment variable overriding `heartbeat_path`.
pub const ENV_HEARTBEAT_PATH: &str = "HEARTFILE_PATH";
/// Environment variable overriding `beat_delay_ms`.
pub const ENV_BEAT_DELAY_MS: &str = "HEARTFILE_BEAT_DELAY_MS";
/// Environment variable overriding `check_interval_secs`.
pub const ENV_CHECK_INTERVAL_SECS: &str = "HEARTFILE_CHECK_INTERVAL_SECS";

/// Heartbeat settings shared by the library and the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartConfig {
    /// File whose modification time advertises liveness.
    pub heartbeat_path: PathBuf,
    /// Coalescing window for bursts of `beat()` calls, in milliseconds.
    pub beat_delay_ms: u64,
    /// How often the scheduler asks whether the server is active, in seconds.
    pub check_interval_secs: u64,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            heartbeat_path: Self::dir().join("heartbeat"),
            beat_delay_ms: DEFAULT_BEAT_DELAY_MS,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
        }
    }
}

impl HeartConfig {
    /// Base directory for heartfile state (`~/.heartfile`).
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".heartfile")
    }

    /// Default config file location.
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from the default location, apply env overrides and validate.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load from `path` (defaults if it does not exist), apply env overrides
    /// and validate.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeartError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply `HEARTFILE_*` environment variables on top of current values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_HEARTBEAT_PATH) {
            if !path.trim().is_empty() {
                self.heartbeat_path = PathBuf::from(path.trim());
            }
        }
        if let Some(raw) = lookup(ENV_BEAT_DELAY_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.beat_delay_ms = ms,
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_BEAT_DELAY_MS, raw, e),
            }
        }
        if let Some(raw) = lookup(ENV_CHECK_INTERVAL_SECS) {
            match raw.trim().parse() {
                Ok(secs) => self.check_interval_secs = secs,
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_CHECK_INTERVAL_SECS, raw, e),
            }
        }
    }

    /// Reject settings the heart cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_path.as_os_str().is_empty() {
            return Err(HeartError::Config(
                "heartbeat_path must not be empty".to_string(),
            ));
        }
        if self.check_interval_secs == 0 {
            return Err(HeartError::Config(
                "check_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.check_interval_secs > MAX_CHECK_INTERVAL_SECS {
            return Err(HeartError::Config(format!(
                "check_interval_secs must be at most {}",
                MAX_CHECK_INTERVAL_SECS
            )));
        }
        Ok(())
    }

    pub fn beat_delay(&self) -> Duration {
        Duration::from_millis(self.beat_delay_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Heartbeat age past which a watcher should treat the server as idle:
    /// two missed check intervals.
    pub fn idle_threshold(&self) -> Duration {
        self.check_interval().saturating_mul(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HeartConfig::default();
        assert_eq!(config.beat_delay(), Duration::from_millis(50));
        assert_eq!(config.check_interval(), Duration::from_secs(60));
        assert!(config.heartbeat_path.ends_with(".heartfile/heartbeat"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HeartConfig::read_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, HeartConfig::default());
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "heartbeat_path": "/run/app/heartbeat" }"#).unwrap();

        let config = HeartConfig::read_file(&path).unwrap();
        assert_eq!(config.heartbeat_path, PathBuf::from("/run/app/heartbeat"));
        assert_eq!(config.beat_delay_ms, DEFAULT_BEAT_DELAY_MS);
        assert_eq!(config.check_interval_secs, DEFAULT_CHECK_INTERVAL_SECS);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not valid json }}}").unwrap();

        let err = HeartConfig::read_file(&path).unwrap_err();
        assert!(matches!(err, HeartError::Json(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = HeartConfig::default();
        config.apply_overrides_from(lookup(&[
            (ENV_HEARTBEAT_PATH, "/tmp/hb"),
            (ENV_BEAT_DELAY_MS, "250"),
            (ENV_CHECK_INTERVAL_SECS, " 5 "),
        ]));

        assert_eq!(config.heartbeat_path, PathBuf::from("/tmp/hb"));
        assert_eq!(config.beat_delay_ms, 250);
        assert_eq!(config.check_interval_secs, 5);
    }

    #[test]
    fn test_unparseable_env_override_is_ignored() {
        let mut config = HeartConfig::default();
        config.apply_overrides_from(lookup(&[
            (ENV_BEAT_DELAY_MS, "soon"),
            (ENV_HEARTBEAT_PATH, "   "),
        ]));
        assert_eq!(config, HeartConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = HeartConfig {
            check_interval_secs: 0,
            ..HeartConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("check_interval_secs"));
    }

    #[test]
    fn test_validate_rejects_huge_interval() {
        let config = HeartConfig {
            check_interval_secs: u64::MAX,
            ..HeartConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));

        let at_limit = HeartConfig {
            check_interval_secs: MAX_CHECK_INTERVAL_SECS,
            ..HeartConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_idle_threshold_saturates() {
        let config = HeartConfig {
            check_interval_secs: u64::MAX,
            ..HeartConfig::default()
        };
        assert_eq!(config.idle_threshold(), Duration::MAX);
        assert_eq!(
            HeartConfig::default().idle_threshold(),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let config = HeartConfig {
            heartbeat_path: PathBuf::new(),
            ..HeartConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = HeartConfig {
            heartbeat_path: PathBuf::from("/var/lib/app/heartbeat"),
            beat_delay_ms: 10,
            check_interval_secs: 30,
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: HeartConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
