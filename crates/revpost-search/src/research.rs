//! Per-product research: the fixed query set and its aggregation into
//! [`SearchResults`].

use chrono::Datelike;
use revpost_core::{ImageHit, SearchHit, SearchKind, SearchResults};

use crate::provider::SearchProvider;
use crate::rate_limit::{search_with_retry, BackoffPolicy};

/// Which [`SearchResults`] bucket a query feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchCategory {
    BasicInfo,
    PriceInfo,
    RecentNews,
    UserReviews,
    Images,
}

/// One query issued during research.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchQuery {
    pub category: ResearchCategory,
    pub query: String,
    pub kind: SearchKind,
    pub max_results: usize,
    /// Image hits from this query are flagged as recent.
    pub recent: bool,
}

impl ResearchQuery {
    fn new(category: ResearchCategory, query: String, kind: SearchKind, max_results: usize) -> Self {
        Self {
            category,
            query,
            kind,
            max_results,
            recent: false,
        }
    }
}

/// The queries issued for `product`, in order: four text categories, then a
/// recency-flagged image search for `year` and a general image search.
#[must_use]
pub fn research_queries(product: &str, year: i32) -> Vec<ResearchQuery> {
    vec![
        ResearchQuery::new(
            ResearchCategory::BasicInfo,
            format!("{product} 리뷰 사양 특징"),
            SearchKind::Text,
            5,
        ),
        ResearchQuery::new(
            ResearchCategory::PriceInfo,
            format!("{product} 가격 최저가"),
            SearchKind::Text,
            3,
        ),
        ResearchQuery::new(
            ResearchCategory::RecentNews,
            product.to_string(),
            SearchKind::News,
            3,
        ),
        ResearchQuery::new(
            ResearchCategory::UserReviews,
            format!("{product} 사용후기 장단점 실사용"),
            SearchKind::Text,
            5,
        ),
        ResearchQuery {
            recent: true,
            ..ResearchQuery::new(
                ResearchCategory::Images,
                format!("{product} {year} 공식 이미지"),
                SearchKind::Images,
                6,
            )
        },
        ResearchQuery::new(
            ResearchCategory::Images,
            format!("{product} 제품 사진"),
            SearchKind::Images,
            6,
        ),
    ]
}

/// Runs every research query for `product` sequentially and aggregates the
/// hits. Never fails: a query that errors out contributes an empty list.
pub async fn collect_research<P: SearchProvider>(
    provider: &P,
    policy: &BackoffPolicy,
    product: &str,
) -> SearchResults {
    let year = chrono::Local::now().year();
    let mut results = SearchResults::default();

    for q in research_queries(product, year) {
        let hits = search_with_retry(provider, policy, &q.query, q.kind, q.max_results).await;
        tracing::debug!(
            product,
            query = %q.query,
            kind = %q.kind,
            hits = hits.len(),
            "research query finished"
        );
        match q.category {
            ResearchCategory::BasicInfo => results.basic_info.extend(hits),
            ResearchCategory::PriceInfo => results.price_info.extend(hits),
            ResearchCategory::RecentNews => results.recent_news.extend(hits),
            ResearchCategory::UserReviews => results.user_reviews.extend(hits),
            ResearchCategory::Images => results
                .images
                .extend(hits.into_iter().filter_map(|h| to_image_hit(h, q.recent))),
        }
    }

    tracing::info!(
        product,
        text_results = results.text_result_count(),
        images = results.images.len(),
        "research complete"
    );
    results
}

fn to_image_hit(hit: SearchHit, is_recent: bool) -> Option<ImageHit> {
    let url = hit.image_url?;
    Some(ImageHit {
        url,
        title: hit.title,
        source_page: Some(hit.url).filter(|u| !u.is_empty()),
        width: hit.width,
        height: hit.height,
        is_recent,
    })
}
