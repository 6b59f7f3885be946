//! The record threaded through every pipeline stage.

use chrono::{DateTime, Local};
use revpost_core::SearchResults;
use serde::{Deserialize, Serialize};

/// Lifecycle tag of the post being produced.
///
/// Advances `Analyzing → Duplicate | Generated → MarkdownCreated → Saved`;
/// `Generated` is revisited on every pass of the revise loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Analyzing,
    Duplicate,
    Generated,
    MarkdownCreated,
    Saved,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Analyzing => "analyzing",
            PostStatus::Duplicate => "duplicate",
            PostStatus::Generated => "generated",
            PostStatus::MarkdownCreated => "markdown_created",
            PostStatus::Saved => "saved",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `@name (start-end)` annotation pointing at a line range of an existing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleReference {
    pub name: String,
    /// 1-based, inclusive.
    pub start: usize,
    /// 1-based, inclusive.
    pub end: usize,
}

/// A scored image candidate, not yet downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub title: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_recent: bool,
    pub score: i32,
}

/// A downloaded image converted to WebP in the image store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalImage {
    /// Root-relative URL used in the post, e.g. `/images/galaxy-1-ab12cd34.webp`.
    pub path: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

/// The post under construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentPost {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: PostStatus,
    pub content: String,
    pub created_at: Option<DateTime<Local>>,
    /// URLs of the research results the content was generated from.
    pub sources: Vec<String>,
    pub markdown: String,
    pub filename: Option<String>,
    pub needs_revision: bool,
    /// Content is the fixed fallback template rather than model output.
    pub from_template: bool,
}

impl Default for CurrentPost {
    fn default() -> Self {
        Self {
            kind: "review".to_string(),
            status: PostStatus::default(),
            content: String::new(),
            created_at: None,
            sources: Vec::new(),
            markdown: String::new(),
            filename: None,
            needs_revision: false,
            from_template: false,
        }
    }
}

/// One product-review request, from raw task text to saved post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    pub task: String,
    /// `task` with the style token removed; used for extraction and prompts.
    pub clean_task: String,
    pub product_name: String,
    pub product_slug: String,
    pub style_reference: Option<StyleReference>,
    pub search_results: SearchResults,
    pub images: Vec<ImageRef>,
    pub local_images: Vec<LocalImage>,
    pub current_post: CurrentPost,
    pub feedback: String,
    pub revision_count: u32,
    pub completed: bool,
}

impl PipelineState {
    #[must_use]
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }
}
