use super::*;
use clap::CommandFactory;
use clap::Parser;

#[test]
fn cli_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn cluster_id_only_uses_defaults() {
    let cli = Cli::try_parse_from(["emr-idle", "j-2AXXXXXXGAPLF"]).expect("parse should succeed");
    assert_eq!(cli.cluster_id, "j-2AXXXXXXGAPLF");
    assert_eq!(cli.source, None);
    assert_eq!(cli.format, OutputFormat::Plain);
    assert!(cli.snapshot_dir.is_none());
}

#[test]
fn parses_explicit_values() {
    let cli = Cli::try_parse_from([
        "emr-idle",
        "--source",
        "history",
        "--snapshot-dir",
        "/tmp/snap",
        "--region",
        "eu-west-1",
        "--throttle-ms",
        "0",
        "--format",
        "json",
        "j-1",
    ])
    .expect("parse should succeed");

    assert_eq!(cli.source.map(SourceKind::from), Some(SourceKind::History));
    assert_eq!(cli.snapshot_dir, Some(PathBuf::from("/tmp/snap")));
    assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
    assert_eq!(cli.throttle_ms, Some(0));
    assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn cluster_id_is_required() {
    assert!(Cli::try_parse_from(["emr-idle"]).is_err());
}
