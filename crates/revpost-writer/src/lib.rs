//! Review post generation for revpost.
//!
//! Turns a free-text task ("갤럭시 S24 울트라 리뷰 작성") into a saved
//! markdown post: product extraction, duplicate check against the review
//! ledger, web research, image selection and storage, LLM drafting with a
//! quality gate and bounded revisions, and front-matter assembly.

pub mod analyze;
pub mod audit;
pub mod error;
pub mod frontmatter;
pub mod generate;
pub mod image_store;
pub mod images;
pub mod ledger;
pub mod llm;
pub mod markdown;
pub mod pipeline;
pub mod prompt;
pub mod quality;
pub mod review;
pub mod state;
pub mod style;

pub use analyze::{extract_style_reference, slugify, ProductMatcher};
pub use audit::{audit_posts, purge_candidates, write_candidates, AuditCandidate, AuditReason, PurgeSummary};
pub use error::WriterError;
pub use frontmatter::{Chooser, FixedChooser, FrontMatter, RandomChooser};
pub use image_store::{HttpImageFetcher, ImageFetcher, ImageStore};
pub use ledger::{InMemoryLedger, JsonFileLedger, LedgerEntry, ReviewLedger};
pub use llm::{ChatCompletionsClient, ContentGenerator};
pub use pipeline::{PipelineOptions, ReviewPipeline, Stage};
pub use quality::{evaluate, QualityReport, QualityThresholds};
pub use state::{CurrentPost, PipelineState, PostStatus};
