//! YAML configuration.
//!
//! ```yaml
//! version: 1
//! source: history
//! steps:
//!   markers: ["--class", "-i"]
//! history:
//!   throttle_ms: 500
//!   file_suffix: jhist.gz
//!   unset_timestamps: zero
//! aws:
//!   region: us-east-1
//!   profile: analytics
//! ```
//!
//! Every section is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IdleError, IdleResult};
use crate::history::UnsetTimestampPolicy;
use crate::model::SourceKind;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdleConfig {
    pub version: u32,
    pub source: SourceKind,
    pub steps: StepsConfig,
    pub history: HistoryConfig,
    pub aws: AwsConfig,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            source: SourceKind::default(),
            steps: StepsConfig::default(),
            history: HistoryConfig::default(),
            aws: AwsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepsConfig {
    /// Argument tokens whose successor names the executable.
    pub markers: Vec<String>,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            markers: vec!["--class".to_string(), "-i".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Pause before the first storage call.
    pub throttle_ms: u64,
    /// Only keys with this suffix are read.
    pub file_suffix: String,
    pub unset_timestamps: UnsetTimestampPolicy,
    /// Custom S3 endpoint.
    pub endpoint: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 500,
            file_suffix: "jhist.gz".to_string(),
            unset_timestamps: UnsetTimestampPolicy::default(),
            endpoint: None,
        }
    }
}

impl HistoryConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// AWS CLI executable.
    pub binary: String,
    /// Read saved API responses from here instead of calling AWS.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            binary: "aws".to_string(),
            snapshot_dir: None,
        }
    }
}

pub fn load_config(path: &Path) -> IdleResult<IdleConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        IdleError::Config(format!("failed to read config {}: {}", path.display(), e))
    })?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> IdleResult<IdleConfig> {
    let cfg: IdleConfig = serde_yaml::from_str(raw)
        .map_err(|e| IdleError::Config(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(IdleError::Config(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.steps.markers.iter().any(|m| m.is_empty()) {
        return Err(IdleError::Config("step markers must not be empty".into()));
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg = parse_config("{}").unwrap();
        assert_eq!(cfg, IdleConfig::default());
        assert_eq!(cfg.history.throttle(), Duration::from_millis(500));
        assert_eq!(cfg.steps.markers, vec!["--class", "-i"]);
    }

    #[test]
    fn test_full_document() {
        let cfg = parse_config(
            r#"
version: 1
source: history
steps:
  markers: ["--class"]
history:
  throttle_ms: 0
  file_suffix: .jhist
  unset_timestamps: skip
aws:
  region: eu-west-1
  snapshot_dir: /tmp/snapshots
"#,
        )
        .unwrap();
        assert_eq!(cfg.source, SourceKind::History);
        assert_eq!(cfg.history.unset_timestamps, UnsetTimestampPolicy::Skip);
        assert_eq!(cfg.history.file_suffix, ".jhist");
        assert_eq!(cfg.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cfg.aws.binary, "aws");
        assert_eq!(cfg.aws.snapshot_dir, Some(PathBuf::from("/tmp/snapshots")));
    }

    #[test]
    fn test_rejects_unknown_version_and_keys() {
        assert!(matches!(parse_config("version: 2"), Err(IdleError::Config(_))));
        assert!(matches!(
            parse_config("history:\n  throttle: 5"),
            Err(IdleError::Config(_))
        ));
        assert!(matches!(
            parse_config("steps:\n  markers: ['']"),
            Err(IdleError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/emr-idle.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
