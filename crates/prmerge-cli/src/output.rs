//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use prmerge_core::MergeReport;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a failure and its full cause chain to stdout.
///
/// Always prints, so CI logs capture the trace next to the git output
/// that led up to it.
pub fn trace(err: &anyhow::Error) {
    println!("{} {:?}", "✗".red(), err);
}

/// Echo captured git stdout (suppressed in quiet mode).
pub fn command_output(output: &str) {
    if is_quiet() {
        return;
    }
    for line in output.lines() {
        println!("  {}", line.dimmed());
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Format a PR reference.
#[must_use]
pub fn pr_ref(number: u64) -> String {
    format!("#{number}").cyan().to_string()
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}

/// Print the merge summary table (suppressed in quiet mode).
pub fn report(report: &MergeReport) {
    if is_quiet() {
        return;
    }

    hr();
    if report.merges.is_empty() {
        info(&format!(
            "No open pull requests labelled '{}' on {}",
            report.label, report.backend
        ));
        return;
    }

    let verb = if report.dry_run { "Would merge" } else { "Merged" };
    println!(
        "{} {} of {} pull request(s) scanned:",
        verb.bold(),
        report.merges.len(),
        report.scanned
    );
    for record in &report.merges {
        let revision = record.revision.as_deref().unwrap_or("-------");
        println!(
            "  {} {:>8}  {}",
            revision.dimmed(),
            pr_ref(record.number),
            record.title
        );
    }
}
