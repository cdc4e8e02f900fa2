//! Presentation of an [`IdleReport`].

use anyhow::Result;
use chrono::{DateTime, Utc};
use emr_idle_core::IdleReport;

use crate::cli::args::OutputFormat;

pub fn render(report: &IdleReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => println!("{}", summary_line(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => print_table(report),
    }
    Ok(())
}

pub fn summary_line(report: &IdleReport) -> String {
    format!(
        "Cluster {} has an idle time of {}",
        report.cluster_id,
        report.idle_millis()
    )
}

fn format_ts(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn print_table(report: &IdleReport) {
    eprintln!("Cluster: {}", report.cluster_id);
    eprintln!("Source:  {}", report.source);
    eprintln!("Ready:   {}", format_ts(report.ready_at));
    eprintln!();

    println!(
        "{:<28} {:<32} {:<23} {:<23} {:>12}",
        "ID", "LABEL", "START", "END", "GAP_BEFORE_MS"
    );
    println!("{:-<28} {:-<32} {:-<23} {:-<23} {:->12}", "", "", "", "", "");
    for (interval, gap) in report.intervals.iter().zip(&report.idle.gaps) {
        let label = if interval.label.chars().count() > 32 {
            format!("{}...", interval.label.chars().take(29).collect::<String>())
        } else {
            interval.label.clone()
        };
        let marker = if gap.is_overlap() { " !" } else { "" };
        println!(
            "{:<28} {:<32} {:<23} {:<23} {:>12}{}",
            interval.id,
            label,
            format_ts(interval.start),
            format_ts(interval.end),
            gap.millis,
            marker
        );
    }

    if report.intervals.is_empty() {
        eprintln!("(no work intervals found)");
    }
    let overlaps = report.idle.overlaps().count();
    if overlaps > 0 {
        eprintln!("{} overlapping interval(s) marked with '!'", overlaps);
    }
    println!();
    println!("{}", summary_line(report));
}
