use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("image fetch failed for {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("WebP encoding failed: {0}")]
    WebpEncode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
