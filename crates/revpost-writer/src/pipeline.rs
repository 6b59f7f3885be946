//! Review pipeline orchestration.
//!
//! `Analyze → Research → CollectImages → Generate → Review → Markdown → Save`,
//! with a duplicate short-circuit after `Analyze` and a bounded revise loop
//! from `Review` back to `Generate`. No stage fails the run: collaborator
//! errors are logged and degrade to empty or templated output.

use std::path::PathBuf;

use chrono::Local;
use revpost_core::{AppConfig, SearchResults};
use revpost_search::{collect_research, BackoffPolicy, SearchProvider};
use uuid::Uuid;

use crate::analyze::{extract_style_reference, slugify, ProductMatcher};
use crate::frontmatter::{build_front_matter, render_front_matter, Chooser, FrontMatterInput, RandomChooser};
use crate::generate::{generate_content, Generated};
use crate::image_store::{ImageFetcher, ImageStore};
use crate::images::{select_images, MAX_SELECTED_IMAGES};
use crate::ledger::{LedgerEntry, ReviewLedger};
use crate::llm::ContentGenerator;
use crate::markdown::{interleave, references_block, render_body, split_sections};
use crate::prompt::{format_search_context, PromptInput};
use crate::review::{review_post, ReviewOutcome};
use crate::state::{CurrentPost, PipelineState, PostStatus};
use crate::style::load_style_excerpt;

/// Mode switches and output settings for a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub force_regenerate: bool,
    pub disable_web_search: bool,
    pub disable_llm: bool,
    pub max_revisions: u32,
    pub max_images: usize,
    pub author: String,
    pub default_cover_image: String,
    pub posts_dir: PathBuf,
    pub style_dir: PathBuf,
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            force_regenerate: config.force_regenerate,
            disable_web_search: config.disable_web_search,
            disable_llm: config.disable_llm,
            max_revisions: config.max_revisions,
            max_images: MAX_SELECTED_IMAGES,
            author: config.author.clone(),
            default_cover_image: config.default_cover_image.clone(),
            posts_dir: config.posts_dir.clone(),
            style_dir: config.style_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyze,
    Research,
    CollectImages,
    Generate,
    Review,
    Markdown,
    Save,
    Done,
}

/// Produces one review post per [`ReviewPipeline::run`] call.
pub struct ReviewPipeline<S, G, F, L> {
    search: S,
    policy: BackoffPolicy,
    generator: G,
    fetcher: F,
    ledger: L,
    image_store: ImageStore,
    matcher: ProductMatcher,
    chooser: Box<dyn Chooser>,
    options: PipelineOptions,
}

impl<S, G, F, L> ReviewPipeline<S, G, F, L>
where
    S: SearchProvider,
    G: ContentGenerator,
    F: ImageFetcher,
    L: ReviewLedger,
{
    #[must_use]
    pub fn new(
        search: S,
        generator: G,
        fetcher: F,
        ledger: L,
        image_store: ImageStore,
        options: PipelineOptions,
    ) -> Self {
        Self {
            search,
            policy: BackoffPolicy::default(),
            generator,
            fetcher,
            ledger,
            image_store,
            matcher: ProductMatcher::default(),
            chooser: Box::new(RandomChooser),
            options,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: ProductMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    #[must_use]
    pub fn with_chooser(mut self, chooser: impl Chooser + 'static) -> Self {
        self.chooser = Box::new(chooser);
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs every stage for `task` and returns the final state.
    pub async fn run(&self, task: &str) -> PipelineState {
        let mut state = PipelineState::new(task);
        let mut stage = Stage::Analyze;
        while stage != Stage::Done {
            tracing::debug!(stage = ?stage, product = %state.product_name, "entering stage");
            stage = self.step(stage, &mut state).await;
        }
        tracing::info!(
            product = %state.product_name,
            status = %state.current_post.status,
            filename = state.current_post.filename.as_deref().unwrap_or(""),
            revisions = state.revision_count,
            "pipeline finished"
        );
        state
    }

    /// Executes one stage and returns the stage to run next.
    pub async fn step(&self, stage: Stage, state: &mut PipelineState) -> Stage {
        match stage {
            Stage::Analyze => self.analyze(state),
            Stage::Research => self.research(state).await,
            Stage::CollectImages => Self::collect_images(state, self.options.max_images),
            Stage::Generate => self.generate(state).await,
            Stage::Review => self.review(state),
            Stage::Markdown => self.markdown(state).await,
            Stage::Save => self.save(state).await,
            Stage::Done => Stage::Done,
        }
    }

    fn analyze(&self, state: &mut PipelineState) -> Stage {
        let (clean_task, style_reference) = extract_style_reference(&state.task);
        state.product_name = self.matcher.extract(&clean_task);
        state.product_slug = slugify(&state.product_name);
        state.clean_task = clean_task;
        state.style_reference = style_reference;
        state.current_post = CurrentPost::default();

        tracing::info!(
            product = %state.product_name,
            slug = %state.product_slug,
            style_reference = ?state.style_reference,
            "analyzed task"
        );

        if self.options.force_regenerate {
            return Stage::Research;
        }
        match self.ledger.find(&state.product_name) {
            Ok(Some(existing)) => {
                tracing::info!(
                    product = %state.product_name,
                    existing = %existing.filename,
                    "review already exists, skipping"
                );
                state.current_post.status = PostStatus::Duplicate;
                state.feedback = format!("이미 작성된 리뷰가 있습니다: {}", existing.filename);
                state.completed = true;
                Stage::Done
            }
            Ok(None) => Stage::Research,
            Err(e) => {
                tracing::warn!(product = %state.product_name, error = %e, "ledger lookup failed, treating as new product");
                Stage::Research
            }
        }
    }

    async fn research(&self, state: &mut PipelineState) -> Stage {
        state.search_results = if self.options.disable_web_search {
            tracing::info!(product = %state.product_name, "web search disabled, skipping research");
            SearchResults::default()
        } else {
            collect_research(&self.search, &self.policy, &state.product_name).await
        };
        Stage::CollectImages
    }

    fn collect_images(state: &mut PipelineState, max_images: usize) -> Stage {
        state.images = select_images(&state.search_results.images, max_images);
        tracing::info!(
            product = %state.product_name,
            candidates = state.search_results.images.len(),
            selected = state.images.len(),
            "selected images"
        );
        Stage::Generate
    }

    async fn generate(&self, state: &mut PipelineState) -> Stage {
        let generated = if self.options.disable_llm {
            tracing::info!(product = %state.product_name, "generation disabled, using fallback template");
            Generated::template(&state.product_name)
        } else {
            let context = format_search_context(&state.search_results);
            let excerpt = state.style_reference.as_ref().and_then(|reference| {
                load_style_excerpt(&self.options.style_dir, reference).unwrap_or_else(|e| {
                    tracing::warn!(name = %reference.name, error = %e, "failed to read style reference");
                    None
                })
            });
            let feedback = state
                .current_post
                .needs_revision
                .then_some(state.feedback.as_str());
            let input = PromptInput {
                product_name: &state.product_name,
                task: &state.clean_task,
                context: &context,
                style_excerpt: excerpt.as_deref(),
                feedback,
            };
            generate_content(&self.generator, &input).await
        };

        let sources = state
            .search_results
            .basic_info
            .iter()
            .map(|hit| hit.url.clone())
            .collect();
        let post = &mut state.current_post;
        post.content = generated.content;
        post.from_template = generated.from_template;
        post.status = PostStatus::Generated;
        post.created_at = Some(Local::now());
        post.sources = sources;
        post.needs_revision = false;
        Stage::Review
    }

    fn review(&self, state: &mut PipelineState) -> Stage {
        match review_post(state, self.options.max_revisions, self.options.disable_web_search) {
            ReviewOutcome::Revise => Stage::Generate,
            ReviewOutcome::Proceed => Stage::Markdown,
        }
    }

    async fn markdown(&self, state: &mut PipelineState) -> Stage {
        state.local_images = self
            .image_store
            .store_all(&self.fetcher, &state.product_name, &state.product_slug, &state.images)
            .await;

        let body = render_body(&interleave(
            split_sections(&state.current_post.content),
            &state.local_images,
        ));
        let front_matter = build_front_matter(
            &FrontMatterInput {
                product_name: &state.product_name,
                content: &state.current_post.content,
                local_images: &state.local_images,
                author: &self.options.author,
                default_cover_image: &self.options.default_cover_image,
                now: Local::now(),
            },
            self.chooser.as_ref(),
        );
        let front = render_front_matter(&front_matter).unwrap_or_else(|e| {
            tracing::warn!(product = %state.product_name, error = %e, "failed to render front matter");
            String::new()
        });

        let mut markdown = format!("{front}\n{}\n", body.trim_end());
        let references = references_block(&state.search_results.basic_info);
        if !references.is_empty() {
            markdown.push('\n');
            markdown.push_str(&references);
        }

        state.current_post.markdown = markdown;
        state.current_post.status = PostStatus::MarkdownCreated;
        Stage::Save
    }

    async fn save(&self, state: &mut PipelineState) -> Stage {
        let mut short_id = Uuid::new_v4().simple().to_string();
        short_id.truncate(6);
        let filename = format!("review-{}-{short_id}.md", state.product_slug);
        let path = self.options.posts_dir.join(&filename);

        let written = match tokio::fs::create_dir_all(&self.options.posts_dir).await {
            Ok(()) => tokio::fs::write(&path, &state.current_post.markdown).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => {
                tracing::info!(product = %state.product_name, path = %path.display(), "saved post");
                let entry = LedgerEntry::new(&state.product_name, &filename, Local::now());
                if let Err(e) = self.ledger.append(entry) {
                    tracing::warn!(product = %state.product_name, error = %e, "failed to record post in ledger");
                }
            }
            Err(e) => {
                tracing::warn!(
                    product = %state.product_name,
                    path = %path.display(),
                    error = %e,
                    "failed to write post"
                );
            }
        }

        state.current_post.filename = Some(filename);
        state.current_post.status = PostStatus::Saved;
        state.completed = true;
        Stage::Done
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
