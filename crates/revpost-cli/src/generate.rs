//! `generate` command handler.
//!
//! Products are processed one at a time with a short pause in between so
//! the ledger file is never written concurrently and the search backend is
//! not hammered. A product that ends without a saved post is reported in
//! the summary, never propagated as an error.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use revpost_core::AppConfig;
use revpost_search::{BackoffPolicy, SearxClient};
use revpost_writer::{
    ChatCompletionsClient, HttpImageFetcher, ImageStore, JsonFileLedger, PipelineOptions,
    PipelineState, PostStatus, ReviewLedger, ReviewPipeline,
};

/// Products generated when none are named on the command line.
pub(crate) const DEFAULT_PRODUCTS: &[&str] =
    &["아이폰 16 프로 맥스", "갤럭시 S25 울트라", "갤럭시 Z 폴드7"];

const PRODUCT_PAUSE: Duration = Duration::from_secs(1);

/// Where the product list for a run comes from.
#[derive(Debug, Default)]
pub(crate) struct ProductSource {
    pub products: Vec<String>,
    pub file: Option<PathBuf>,
    pub from_ledger: bool,
}

/// One product name per non-blank line; `#` lines are comments.
pub(crate) fn parse_product_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Merges arguments, file and ledger products in that order, dropping
/// repeats. Falls back to [`DEFAULT_PRODUCTS`] when the result is empty.
///
/// # Errors
///
/// Returns an error if the product file or the ledger cannot be read.
pub(crate) fn resolve_products(
    source: &ProductSource,
    ledger: &impl ReviewLedger,
) -> anyhow::Result<Vec<String>> {
    let mut candidates: Vec<String> = source
        .products
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(path) = &source.file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read product list {}", path.display()))?;
        candidates.extend(parse_product_list(&raw));
    }

    if source.from_ledger {
        let entries = ledger.entries().context("failed to read review ledger")?;
        candidates.extend(entries.into_iter().map(|e| e.product_name));
    }

    if candidates.is_empty() {
        return Ok(DEFAULT_PRODUCTS.iter().map(ToString::to_string).collect());
    }

    let mut products: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !products.contains(&candidate) {
            products.push(candidate);
        }
    }
    Ok(products)
}

/// Per-run outcome counts, printed once every product has been processed.
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub saved: Vec<(String, String)>,
    pub duplicates: Vec<String>,
    pub unfinished: Vec<String>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, product: &str, state: &PipelineState) {
        match (state.current_post.status, &state.current_post.filename) {
            (PostStatus::Saved, Some(filename)) => {
                self.saved.push((product.to_string(), filename.clone()));
            }
            (PostStatus::Duplicate, _) => self.duplicates.push(product.to_string()),
            _ => self.unfinished.push(product.to_string()),
        }
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "generated {} post(s), skipped {} duplicate(s)",
            self.saved.len(),
            self.duplicates.len()
        )];
        for (product, filename) in &self.saved {
            lines.push(format!("  saved      {product} -> {filename}"));
        }
        for product in &self.duplicates {
            lines.push(format!("  duplicate  {product}"));
        }
        for product in &self.unfinished {
            lines.push(format!("  unfinished {product}"));
        }
        lines
    }
}

/// Runs the review pipeline for every resolved product.
///
/// # Errors
///
/// Returns an error if the product list cannot be resolved or an HTTP
/// client cannot be constructed. Per-product failures are logged and
/// reported in the summary.
pub(crate) async fn run_generate(config: &AppConfig, source: &ProductSource) -> anyhow::Result<()> {
    let ledger = JsonFileLedger::new(config.ledger_path.clone());
    let products = resolve_products(source, &ledger)?;

    let search = SearxClient::new(
        &config.search_base_url,
        config.search_timeout_secs,
        &config.user_agent,
    )?;
    let generator = ChatCompletionsClient::from_config(config)?;
    let fetcher = HttpImageFetcher::new(config.search_timeout_secs, &config.user_agent)?;
    let store = ImageStore::new(config.images_dir.clone(), &config.image_url_prefix);

    let pipeline = ReviewPipeline::new(
        search,
        generator,
        fetcher,
        ledger,
        store,
        PipelineOptions::from_config(config),
    )
    .with_policy(BackoffPolicy::new(
        config.search_max_attempts,
        config.search_retry_delay_ms,
    ));

    tracing::info!(
        products = products.len(),
        force_regenerate = config.force_regenerate,
        disable_web_search = config.disable_web_search,
        disable_llm = config.disable_llm,
        "starting generation run"
    );

    let mut summary = RunSummary::default();
    for (i, product) in products.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(PRODUCT_PAUSE).await;
        }
        let state = pipeline.run(&format!("{product} 리뷰 작성")).await;
        summary.record(product, &state);
    }

    for line in summary.lines() {
        println!("{line}");
    }
    Ok(())
}
