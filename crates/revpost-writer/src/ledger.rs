//! Record of previously generated reviews, used for duplicate detection.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::WriterError;

/// One generated review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub product_name: String,
    pub filename: String,
    /// RFC 3339 local time.
    #[serde(default)]
    pub created_at: String,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl LedgerEntry {
    #[must_use]
    pub fn new(product_name: &str, filename: &str, now: DateTime<Local>) -> Self {
        Self {
            product_name: product_name.to_string(),
            filename: filename.to_string(),
            created_at: now.to_rfc3339(),
            timestamp: now.timestamp(),
        }
    }
}

/// `true` when either name, lowercased and trimmed, contains the other.
///
/// Short names therefore match longer ones ("S24" matches "S24 Ultra").
/// An empty name never matches.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Repository of generated reviews.
pub trait ReviewLedger: Send + Sync {
    /// All entries in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError`] if the backing store cannot be read or parsed.
    fn entries(&self) -> Result<Vec<LedgerEntry>, WriterError>;

    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError`] if the backing store cannot be written.
    fn append(&self, entry: LedgerEntry) -> Result<(), WriterError>;

    /// First entry whose product name matches `product_name` (see [`names_match`]).
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ReviewLedger::entries`].
    fn find(&self, product_name: &str) -> Result<Option<LedgerEntry>, WriterError> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|e| names_match(&e.product_name, product_name)))
    }
}

/// Ledger stored as a pretty-printed JSON array, rewritten in full on append.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReviewLedger for JsonFileLedger {
    fn entries(&self) -> Result<Vec<LedgerEntry>, WriterError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn append(&self, entry: LedgerEntry) -> Result<(), WriterError> {
        let mut entries = self.entries()?;
        entries.push(entry);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(&entries)?;
        json.push('\n');
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Ledger held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl ReviewLedger for InMemoryLedger {
    fn entries(&self) -> Result<Vec<LedgerEntry>, WriterError> {
        let guard = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn append(&self, entry: LedgerEntry) -> Result<(), WriterError> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(name: &str) -> LedgerEntry {
        let now = Local
            .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        LedgerEntry::new(name, &format!("review-{name}-abc123.md"), now)
    }

    #[test]
    fn names_match_is_symmetric_substring() {
        assert!(names_match("Galaxy S24", "Galaxy S24 Ultra"));
        assert!(names_match("galaxy s24 ultra", "GALAXY S24"));
        assert!(names_match(" 갤럭시 S24 ", "갤럭시 s24"));
        assert!(!names_match("갤럭시 S24", "아이폰 16"));
        assert!(!names_match("", "갤럭시"));
        assert!(!names_match("갤럭시", "   "));
    }

    #[test]
    fn in_memory_find_matches_either_direction() {
        let ledger = InMemoryLedger::with_entries(vec![entry("Galaxy S24")]);
        assert!(ledger.find("Galaxy S24 Ultra").unwrap().is_some());
        let ledger = InMemoryLedger::with_entries(vec![entry("Galaxy S24 Ultra")]);
        assert!(ledger.find("galaxy s24").unwrap().is_some());
        assert!(ledger.find("Pixel 9").unwrap().is_none());
    }

    #[test]
    fn json_ledger_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonFileLedger::new(dir.path().join("generated_reviews.json"));
        assert!(ledger.entries().unwrap().is_empty());
        assert!(ledger.find("anything").unwrap().is_none());
    }

    #[test]
    fn json_ledger_appends_and_rewrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("generated_reviews.json");
        let ledger = JsonFileLedger::new(&path);

        ledger.append(entry("에어팟 프로 2")).unwrap();
        ledger.append(entry("다이슨 V15")).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<LedgerEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].product_name, "에어팟 프로 2");
        assert_eq!(parsed[1].filename, "review-다이슨 V15-abc123.md");
        assert!(raw.starts_with("[\n"), "expected pretty-printed array");
    }

    #[test]
    fn json_ledger_accepts_entries_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated_reviews.json");
        std::fs::write(
            &path,
            r#"[{"product_name": "맥북 에어", "filename": "review-macbook.md"}]"#,
        )
        .unwrap();
        let ledger = JsonFileLedger::new(&path);
        let found = ledger.find("맥북 에어 M3").unwrap().expect("should match");
        assert_eq!(found.timestamp, 0);
        assert!(found.created_at.is_empty());
    }

    #[test]
    fn json_ledger_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated_reviews.json");
        std::fs::write(&path, "{not json").unwrap();
        let ledger = JsonFileLedger::new(&path);
        assert!(matches!(ledger.entries(), Err(WriterError::Json(_))));
    }
}
