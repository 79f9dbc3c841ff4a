use std::process::ExitCode;

use colored::Colorize;
use monoize_sdk::{
    EntryOutcome, EntryReport, MergePlanEntry, MergeReport, Monoize, ReplayObserver, DATE_FORMAT,
};
use tracing::warn;

use crate::cli::{Cli, OutputFormat};

pub async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.to_config()?;
    let monoize = Monoize::from_config(&config);

    let token = monoize.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; stopping after the current step");
            token.cancel();
        }
    });

    let mut progress = Progress {
        enabled: matches!(cli.format, OutputFormat::Text),
    };
    let report = monoize.run(&config, &mut progress).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report),
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Prints one line per entry as it is replayed.
struct Progress {
    enabled: bool,
}

impl ReplayObserver for Progress {
    fn before_apply(&mut self, entry: &MergePlanEntry) {
        if self.enabled {
            println!("{}", applying_line(entry));
        }
    }

    fn after_apply(&mut self, outcome: &EntryOutcome) {
        if let (true, Err(e)) = (self.enabled, &outcome.result) {
            println!("  {} {e}", "failed:".red());
        }
    }
}

fn applying_line(entry: &MergePlanEntry) -> String {
    format!(
        "[{}] Applying {} to {}",
        entry.descriptor.timestamp.format(DATE_FORMAT),
        entry.descriptor.subject,
        entry.subdirectory
    )
}

fn planned_line(entry: &EntryReport) -> String {
    format!(
        "[{}] {} ({} -> {})",
        entry.timestamp.format(DATE_FORMAT),
        entry.subject,
        entry.locator,
        entry.subdirectory
    )
}

fn print_summary(report: &MergeReport) {
    if report.dry_run {
        for entry in &report.entries {
            println!("{}", planned_line(entry));
        }
        println!(
            "{} {} changes planned (dry run, nothing written)",
            "✓".green().bold(),
            report.entries.len()
        );
        return;
    }

    if let Some(e) = &report.cleanup_error {
        println!("{} {e}", "warning:".yellow().bold());
    }
    if report.is_success() {
        println!(
            "{} Merged {} changes into {}",
            "✓".green().bold(),
            report.applied(),
            report.target.display().to_string().bold()
        );
    } else {
        println!(
            "{} Merged {} of {} changes into {}; {} failed, {} skipped",
            "✗".red().bold(),
            report.applied(),
            report.entries.len(),
            report.target.display().to_string().bold(),
            report.failed(),
            report.skipped()
        );
        for entry in report.entries.iter().filter(|e| e.error.is_some()) {
            println!(
                "  #{} {} ({})",
                entry.position,
                entry.subject.yellow(),
                entry.subdirectory
            );
        }
    }
}
