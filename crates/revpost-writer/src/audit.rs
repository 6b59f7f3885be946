//! Low-quality post detection and removal to a trash directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::error::WriterError;

/// Text that marks a post as an unedited automatic draft.
pub const AUTO_DISCLAIMER: &str = "웹 검색 결과를 바탕으로 작성";

/// Posts shorter than this (in characters) are flagged.
pub const MIN_POST_CHARS: usize = 800;

/// Posts with fewer `### ` headings than this are flagged.
pub const MIN_POST_SECTIONS: usize = 4;

static EXTERNAL_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(https?://").expect("valid external image regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditReason {
    ExternalImage,
    AutoDisclaimer,
    ShortLength,
    FewSections,
}

impl AuditReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuditReason::ExternalImage => "external_image",
            AuditReason::AutoDisclaimer => "auto_disclaimer",
            AuditReason::ShortLength => "short_length",
            AuditReason::FewSections => "few_sections",
        }
    }
}

impl std::fmt::Display for AuditReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditCandidate {
    pub filename: String,
    pub reasons: Vec<AuditReason>,
}

impl AuditCandidate {
    /// `filename\treason,reason`
    #[must_use]
    pub fn to_line(&self) -> String {
        let reasons: Vec<&str> = self.reasons.iter().map(|r| r.as_str()).collect();
        format!("{}\t{}", self.filename, reasons.join(","))
    }
}

/// Reasons `content` counts as low quality; empty when it is fine.
#[must_use]
pub fn audit_content(content: &str) -> Vec<AuditReason> {
    let mut reasons = Vec::new();
    if EXTERNAL_IMAGE.is_match(content) {
        reasons.push(AuditReason::ExternalImage);
    }
    if content.contains(AUTO_DISCLAIMER) {
        reasons.push(AuditReason::AutoDisclaimer);
    }
    if content.chars().count() < MIN_POST_CHARS {
        reasons.push(AuditReason::ShortLength);
    }
    if content.matches("### ").count() < MIN_POST_SECTIONS {
        reasons.push(AuditReason::FewSections);
    }
    reasons
}

/// Audits every `.md`/`.mdx` file directly under `posts_dir`, sorted by name.
///
/// Unreadable files are logged and skipped.
///
/// # Errors
///
/// Returns [`WriterError::Io`] if `posts_dir` cannot be listed.
pub fn audit_posts(posts_dir: &Path) -> Result<Vec<AuditCandidate>, WriterError> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(posts_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_post = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "md" || e == "mdx");
        if !is_post || !path.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let reasons = audit_content(&content);
                if !reasons.is_empty() {
                    candidates.push(AuditCandidate { filename, reasons });
                }
            }
            Err(e) => tracing::warn!(file = %filename, error = %e, "failed to read post, skipping"),
        }
    }
    candidates.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(candidates)
}

/// Writes one [`AuditCandidate::to_line`] per candidate.
///
/// # Errors
///
/// Returns [`WriterError::Io`] if the file cannot be written.
pub fn write_candidates(path: &Path, candidates: &[AuditCandidate]) -> Result<(), WriterError> {
    let mut out = String::new();
    for candidate in candidates {
        let _ = writeln!(out, "{}", candidate.to_line());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeSummary {
    pub trash_dir: PathBuf,
    pub moved: Vec<String>,
    pub missing: Vec<String>,
}

/// Moves every post named in the candidate list at `list_path` into
/// `<posts_dir>/.trash-<YYYYmmddHHMMSS>/`. Names that do not exist are
/// reported as missing.
///
/// # Errors
///
/// Returns [`WriterError::Io`] if the list cannot be read, the trash
/// directory cannot be created, or a move fails.
pub fn purge_candidates(
    posts_dir: &Path,
    list_path: &Path,
    now: DateTime<Local>,
) -> Result<PurgeSummary, WriterError> {
    let list = std::fs::read_to_string(list_path)?;
    let trash_dir = posts_dir.join(format!(".trash-{}", now.format("%Y%m%d%H%M%S")));
    std::fs::create_dir_all(&trash_dir)?;

    let mut moved = Vec::new();
    let mut missing = Vec::new();
    for line in list.lines() {
        let filename = line.split('\t').next().unwrap_or_default().trim();
        if filename.is_empty() {
            continue;
        }
        if filename.contains("..") || Path::new(filename).is_absolute() {
            tracing::warn!(file = filename, "refusing to move path outside posts directory");
            continue;
        }
        let src = posts_dir.join(filename);
        if !src.exists() {
            tracing::info!(file = filename, "listed post not found, skipping");
            missing.push(filename.to_string());
            continue;
        }
        let dst = trash_dir.join(filename);
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&src, &dst)?;
        tracing::info!(file = filename, trash = %trash_dir.display(), "moved post to trash");
        moved.push(filename.to_string());
    }

    Ok(PurgeSummary {
        trash_dir,
        moved,
        missing,
    })
}

#[cfg(test)]
#[path = "audit_test.rs"]
mod tests;
