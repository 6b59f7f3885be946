use serde::{Deserialize, Serialize};

/// Which index a search query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Text,
    News,
    Images,
}

impl SearchKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Text => "text",
            SearchKind::News => "news",
            SearchKind::Images => "images",
        }
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked result returned by a search provider.
///
/// Image results carry `image_url` and, when the provider reports it, pixel
/// dimensions. Text and news results leave those fields empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// An image candidate found during research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHit {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// `true` when the hit came from the recency-flagged image query.
    pub is_recent: bool,
}

/// Aggregated research output, one list per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub basic_info: Vec<SearchHit>,
    pub price_info: Vec<SearchHit>,
    pub recent_news: Vec<SearchHit>,
    pub user_reviews: Vec<SearchHit>,
    pub images: Vec<ImageHit>,
}

impl SearchResults {
    /// Number of text results across the four text categories.
    #[must_use]
    pub fn text_result_count(&self) -> usize {
        self.basic_info.len() + self.price_info.len() + self.recent_news.len() + self.user_reviews.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_result_count() == 0 && self.images.is_empty()
    }
}
