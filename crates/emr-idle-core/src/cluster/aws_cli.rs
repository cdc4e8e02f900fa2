//! [`ClusterApi`] over the AWS command line interface.
//!
//! Credentials, retries and pagination are the CLI's business; this type
//! only runs `aws emr <call> --cluster-id <id> --output json` and decodes
//! what comes back.

use async_trait::async_trait;
use tokio::process::Command;

use super::{wire, ClusterApi, ClusterDescription, StepSummary};
use crate::error::{IdleError, IdleResult};

#[derive(Debug, Clone)]
pub struct AwsCliClusterApi {
    binary: String,
    region: Option<String>,
    profile: Option<String>,
}

impl Default for AwsCliClusterApi {
    fn default() -> Self {
        Self {
            binary: "aws".to_string(),
            region: None,
            profile: None,
        }
    }
}

impl AwsCliClusterApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    /// Arguments passed to the CLI for `call`.
    pub fn args_for(&self, call: &str, cluster_id: &str) -> Vec<String> {
        let mut args = vec![
            "emr".to_string(),
            call.to_string(),
            "--cluster-id".to_string(),
            cluster_id.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        if let Some(profile) = &self.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        args
    }

    async fn run(&self, call: &'static str, cluster_id: &str) -> IdleResult<String> {
        tracing::debug!(binary = %self.binary, call, cluster_id, "invoking AWS CLI");

        let output = Command::new(&self.binary)
            .args(self.args_for(call, cluster_id))
            .output()
            .await
            .map_err(|e| {
                IdleError::cluster_api(
                    call,
                    cluster_id,
                    format!("failed to run '{}': {}", self.binary, e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IdleError::cluster_api(
                call,
                cluster_id,
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| IdleError::malformed(call, cluster_id, e.to_string()))
    }
}

#[async_trait]
impl ClusterApi for AwsCliClusterApi {
    async fn describe_cluster(&self, cluster_id: &str) -> IdleResult<ClusterDescription> {
        let json = self.run("describe-cluster", cluster_id).await?;
        wire::parse_describe_cluster(cluster_id, &json)
    }

    async fn list_steps(&self, cluster_id: &str) -> IdleResult<Vec<StepSummary>> {
        let json = self.run("list-steps", cluster_id).await?;
        wire::parse_list_steps(cluster_id, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_include_region_and_profile() {
        let api = AwsCliClusterApi::new()
            .with_region(Some("eu-west-1".into()))
            .with_profile(Some("analytics".into()));
        assert_eq!(
            api.args_for("list-steps", "j-1"),
            vec![
                "emr",
                "list-steps",
                "--cluster-id",
                "j-1",
                "--output",
                "json",
                "--region",
                "eu-west-1",
                "--profile",
                "analytics",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_fatal() {
        let api = AwsCliClusterApi::new().with_binary("/nonexistent/emr-idle-aws");
        let err = api.describe_cluster("j-1").await.unwrap_err();
        assert!(matches!(
            err,
            IdleError::ClusterApi {
                call: "describe-cluster",
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fake_cli_roundtrip() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("describe-cluster.json"),
            r#"{"Cluster":{"Id":"j-1","Name":"c","Status":{"Timeline":{"ReadyDateTime":1000.0}}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("list-steps.json"), r#"{"Steps":[]}"#).unwrap();

        // $1 = emr, $2 = call
        let script = dir.path().join("aws");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat \"{}/$2.json\"\n", dir.path().display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let api = AwsCliClusterApi::new().with_binary(script.display().to_string());
        let desc = api.describe_cluster("j-1").await.unwrap();
        assert_eq!(desc.ready_at, Some(1_000_000));
        assert!(api.list_steps("j-1").await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_failure_carries_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("aws");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'An error occurred (InvalidRequestException)' >&2\nexit 254\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let api = AwsCliClusterApi::new().with_binary(script.display().to_string());
        let err = api.list_steps("j-1").await.unwrap_err();
        assert!(err.to_string().contains("InvalidRequestException"));
    }
}
