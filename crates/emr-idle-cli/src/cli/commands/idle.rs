//! `emr-idle <cluster-id>` - compute a cluster's idle time.

use anyhow::{Context, Result};
use emr_idle_core::{
    cluster_api_from_config, compute_cluster_idle, interval_source, load_config, IdleConfig,
    SourceKind,
};

use super::report::render;
use crate::cli::args::Cli;
use crate::exit_codes::SUCCESS;

/// Config file (if any) with command-line flags applied on top.
pub fn resolve_config(cli: &Cli) -> Result<IdleConfig> {
    let mut cfg = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => IdleConfig::default(),
    };

    if let Some(source) = cli.source {
        cfg.source = source.into();
    }
    if let Some(dir) = &cli.snapshot_dir {
        cfg.aws.snapshot_dir = Some(dir.clone());
    }
    if let Some(region) = &cli.region {
        cfg.aws.region = Some(region.clone());
    }
    if let Some(profile) = &cli.profile {
        cfg.aws.profile = Some(profile.clone());
    }
    if let Some(throttle_ms) = cli.throttle_ms {
        cfg.history.throttle_ms = throttle_ms;
    }
    Ok(cfg)
}

pub async fn run(cli: Cli) -> Result<i32> {
    let cfg = resolve_config(&cli)?;
    let source_kind: SourceKind = cfg.source;

    let api = cluster_api_from_config(&cfg.aws);
    let source = interval_source(source_kind, api.clone(), &cfg);

    let report = compute_cluster_idle(api.as_ref(), source.as_ref(), &cli.cluster_id)
        .await
        .with_context(|| {
            format!(
                "failed to compute idle time for {} from {}",
                cli.cluster_id, source_kind
            )
        })?;

    render(&report, cli.format)?;
    Ok(SUCCESS)
}
