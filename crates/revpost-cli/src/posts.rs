//! `ledger`, `audit` and `purge` command handlers.

use std::path::Path;

use chrono::Local;
use revpost_core::AppConfig;
use revpost_writer::{
    audit_posts, purge_candidates, write_candidates, JsonFileLedger, LedgerEntry, ReviewLedger,
};

pub(crate) fn format_ledger_entry(entry: &LedgerEntry) -> String {
    format!(
        "{}\t{}\t{}",
        entry.created_at, entry.product_name, entry.filename
    )
}

/// Prints every ledger entry, oldest first.
///
/// # Errors
///
/// Returns an error if the ledger file exists but cannot be read or parsed.
pub(crate) fn run_ledger(config: &AppConfig) -> anyhow::Result<()> {
    let ledger = JsonFileLedger::new(config.ledger_path.clone());
    let entries = ledger.entries()?;
    if entries.is_empty() {
        println!("ledger {} is empty", config.ledger_path.display());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_ledger_entry(entry));
    }
    println!("{} review(s)", entries.len());
    Ok(())
}

/// Audits the post directory and writes the candidate list to `output`.
///
/// # Errors
///
/// Returns an error if the post directory cannot be listed or the candidate
/// list cannot be written.
pub(crate) fn run_audit(config: &AppConfig, output: &Path) -> anyhow::Result<()> {
    let candidates = audit_posts(&config.posts_dir)?;
    write_candidates(output, &candidates)?;
    for candidate in &candidates {
        println!("{}", candidate.to_line());
    }
    println!(
        "{} candidate(s) written to {}",
        candidates.len(),
        output.display()
    );
    Ok(())
}

/// Moves every post named in `list` into a timestamped trash directory.
///
/// # Errors
///
/// Returns an error if the list cannot be read or a move fails.
pub(crate) fn run_purge(config: &AppConfig, list: &Path) -> anyhow::Result<()> {
    let summary = purge_candidates(&config.posts_dir, list, Local::now())?;
    println!(
        "moved {} post(s) to {}, {} missing",
        summary.moved.len(),
        summary.trash_dir.display(),
        summary.missing.len()
    );
    Ok(())
}
