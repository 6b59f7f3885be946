//! Wire types for the SearxNG JSON API.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct SearxResponse {
    #[serde(default)]
    pub results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearxResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "publishedDate")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub img_src: Option<String>,
    /// Image engines report dimensions as a string like `"1920 x 1080"`.
    #[serde(default)]
    pub resolution: Option<String>,
}
