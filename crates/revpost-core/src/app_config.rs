use std::path::PathBuf;

/// Runtime configuration for a generation run.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Regenerate even when the ledger already holds the product.
    pub force_regenerate: bool,
    /// Skip the research stage; every search category stays empty.
    pub disable_web_search: bool,
    /// Skip the generator and write the fixed fallback template.
    pub disable_llm: bool,
    pub posts_dir: PathBuf,
    pub images_dir: PathBuf,
    pub image_url_prefix: String,
    pub ledger_path: PathBuf,
    pub style_dir: PathBuf,
    pub author: String,
    pub default_cover_image: String,
    pub max_revisions: u32,
    pub search_base_url: String,
    pub search_timeout_secs: u64,
    pub search_max_attempts: u32,
    pub search_retry_delay_ms: u64,
    pub user_agent: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub llm_temperature: f32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("force_regenerate", &self.force_regenerate)
            .field("disable_web_search", &self.disable_web_search)
            .field("disable_llm", &self.disable_llm)
            .field("posts_dir", &self.posts_dir)
            .field("images_dir", &self.images_dir)
            .field("image_url_prefix", &self.image_url_prefix)
            .field("ledger_path", &self.ledger_path)
            .field("style_dir", &self.style_dir)
            .field("author", &self.author)
            .field("default_cover_image", &self.default_cover_image)
            .field("max_revisions", &self.max_revisions)
            .field("search_base_url", &self.search_base_url)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("search_max_attempts", &self.search_max_attempts)
            .field("search_retry_delay_ms", &self.search_retry_delay_ms)
            .field("user_agent", &self.user_agent)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_temperature", &self.llm_temperature)
            .finish()
    }
}
