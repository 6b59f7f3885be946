//! Style-reference excerpts loaded from existing posts.

use std::path::{Path, PathBuf};

use crate::error::WriterError;
use crate::state::StyleReference;

fn candidate_paths(style_dir: &Path, name: &str) -> Vec<PathBuf> {
    if name.ends_with(".md") || name.ends_with(".mdx") {
        vec![style_dir.join(name)]
    } else {
        vec![
            style_dir.join(format!("{name}.md")),
            style_dir.join(format!("{name}.mdx")),
        ]
    }
}

/// Reads lines `start..=end` (1-based) of `<style_dir>/<name>.md` or `.mdx`.
///
/// Returns `Ok(None)` when no such post exists or the range selects nothing;
/// `end` past the last line is clamped.
///
/// # Errors
///
/// Returns [`WriterError::Io`] if the post exists but cannot be read.
pub fn load_style_excerpt(
    style_dir: &Path,
    reference: &StyleReference,
) -> Result<Option<String>, WriterError> {
    if reference.name.contains("..") {
        tracing::warn!(name = %reference.name, "style reference escapes style directory, ignoring");
        return Ok(None);
    }

    let Some(path) = candidate_paths(style_dir, &reference.name)
        .into_iter()
        .find(|p| p.is_file())
    else {
        tracing::warn!(name = %reference.name, dir = %style_dir.display(), "style reference post not found");
        return Ok(None);
    };

    let raw = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = raw.lines().collect();
    if reference.start == 0 || reference.start > reference.end || reference.start > lines.len() {
        tracing::warn!(
            path = %path.display(),
            start = reference.start,
            end = reference.end,
            lines = lines.len(),
            "style reference line range is out of bounds"
        );
        return Ok(None);
    }

    let end = reference.end.min(lines.len());
    Ok(Some(lines[reference.start - 1..end].join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str, start: usize, end: usize) -> StyleReference {
        StyleReference {
            name: name.to_string(),
            start,
            end,
        }
    }

    fn style_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("airpods.md"),
            "line 1\nline 2\nline 3\nline 4\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("galaxy.mdx"), "mdx 1\nmdx 2\n").unwrap();
        dir
    }

    #[test]
    fn reads_inclusive_line_range() {
        let dir = style_dir();
        let excerpt = load_style_excerpt(dir.path(), &reference("airpods", 2, 3)).unwrap();
        assert_eq!(excerpt.as_deref(), Some("line 2\nline 3"));
    }

    #[test]
    fn falls_back_to_mdx_and_clamps_end() {
        let dir = style_dir();
        let excerpt = load_style_excerpt(dir.path(), &reference("galaxy", 2, 99)).unwrap();
        assert_eq!(excerpt.as_deref(), Some("mdx 2"));
    }

    #[test]
    fn explicit_extension_is_used_as_is() {
        let dir = style_dir();
        let excerpt = load_style_excerpt(dir.path(), &reference("airpods.md", 1, 1)).unwrap();
        assert_eq!(excerpt.as_deref(), Some("line 1"));
    }

    #[test]
    fn missing_post_and_bad_ranges_yield_none() {
        let dir = style_dir();
        assert!(load_style_excerpt(dir.path(), &reference("missing", 1, 2)).unwrap().is_none());
        assert!(load_style_excerpt(dir.path(), &reference("airpods", 0, 2)).unwrap().is_none());
        assert!(load_style_excerpt(dir.path(), &reference("airpods", 3, 2)).unwrap().is_none());
        assert!(load_style_excerpt(dir.path(), &reference("airpods", 9, 12)).unwrap().is_none());
        assert!(load_style_excerpt(dir.path(), &reference("../airpods", 1, 2)).unwrap().is_none());
    }
}
