//! Run configuration

use anyhow::{Context, Result};
use engine_client::EngineConfig;
use hexbridge_driver::{DriverConfig, InboxConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the bridge needs for one run
///
/// Loaded from a JSON file; missing sections and fields fall back to their
/// defaults. Durations are in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub engine: EngineConfig,
    pub driver: DriverConfig,
    pub inbox: InboxConfig,
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_defaults_match_retry_policy() {
        let config = BridgeConfig::default();
        assert_eq!(config.driver.poll_interval, Duration::from_secs(30));
        assert_eq!(config.driver.fetch_retry_delay, Duration::from_secs(600));
        assert_eq!(config.driver.transient_backoff, Duration::from_secs(30));
        assert_eq!(config.driver.failure_backoff, Duration::from_secs(300));
        assert_eq!(config.engine.grace_period, Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hexbridge.json");
        std::fs::write(
            &path,
            r#"{
                "engine": { "program": "/opt/lajkonik/lajkonik", "args": ["--threads", "2"] },
                "driver": { "failure_backoff": 120 },
                "inbox": { "root": "/var/spool/hexbridge" }
            }"#,
        )
        .unwrap();

        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.engine.program, PathBuf::from("/opt/lajkonik/lajkonik"));
        assert_eq!(config.engine.args, vec!["--threads", "2"]);
        assert_eq!(config.driver.failure_backoff, Duration::from_secs(120));
        assert_eq!(config.driver.fetch_retry_delay, Duration::from_secs(600));
        assert_eq!(config.inbox.root, PathBuf::from("/var/spool/hexbridge"));
        assert_eq!(config.inbox.extension, "hgf");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = BridgeConfig::load(Path::new("/nonexistent/hexbridge.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/hexbridge.json"));
    }
}
