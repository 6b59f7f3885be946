use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config pointed at a local SearxNG and a local Ollama.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_flag = |var: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, "false");
        parse_bool(&raw).ok_or_else(|| invalid(var, format!("expected a boolean, got \"{raw}\"")))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let force_regenerate = parse_flag("FORCE_REGENERATE")?;
    let disable_web_search = parse_flag("DISABLE_WEB_SEARCH")?;
    let disable_llm = parse_flag("DISABLE_LLM")?;

    let log_level = or_default("REVPOST_LOG_LEVEL", "info");
    let posts_dir = PathBuf::from(or_default("REVPOST_POSTS_DIR", "./app/posts"));
    let images_dir = PathBuf::from(or_default("REVPOST_IMAGES_DIR", "./app/public/images"));
    let image_url_prefix = or_default("REVPOST_IMAGE_URL_PREFIX", "/images")
        .trim_end_matches('/')
        .to_string();
    let ledger_path = PathBuf::from(or_default(
        "REVPOST_LEDGER_PATH",
        "./generated_reviews.json",
    ));
    let style_dir = PathBuf::from(or_default("REVPOST_STYLE_DIR", "./app/posts"));
    let author = or_default("REVPOST_AUTHOR", "리뷰 활짝");
    let default_cover_image = or_default("REVPOST_DEFAULT_COVER", "/images/default-cover.webp");
    let max_revisions = parse_u32("REVPOST_MAX_REVISIONS", "2")?;

    let search_base_url = or_default("REVPOST_SEARCH_BASE_URL", "http://localhost:8080");
    let search_timeout_secs = parse_u64("REVPOST_SEARCH_TIMEOUT_SECS", "30")?;
    let search_max_attempts = parse_u32("REVPOST_SEARCH_MAX_ATTEMPTS", "3")?;
    if search_max_attempts == 0 {
        return Err(invalid(
            "REVPOST_SEARCH_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let search_retry_delay_ms = parse_u64("REVPOST_SEARCH_RETRY_DELAY_MS", "2000")?;
    let user_agent = or_default("REVPOST_USER_AGENT", DEFAULT_USER_AGENT);

    let llm_base_url = or_default("REVPOST_LLM_BASE_URL", "http://localhost:11434/v1");
    let llm_model = or_default("REVPOST_LLM_MODEL", "gpt-oss:20b");
    let llm_api_key = lookup("REVPOST_LLM_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let llm_timeout_secs = parse_u64("REVPOST_LLM_TIMEOUT_SECS", "300")?;
    let llm_temperature = or_default("REVPOST_LLM_TEMPERATURE", "0.7")
        .parse::<f32>()
        .map_err(|e| invalid("REVPOST_LLM_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&llm_temperature) {
        return Err(invalid(
            "REVPOST_LLM_TEMPERATURE",
            format!("{llm_temperature} is outside 0.0..=2.0"),
        ));
    }

    Ok(AppConfig {
        log_level,
        force_regenerate,
        disable_web_search,
        disable_llm,
        posts_dir,
        images_dir,
        image_url_prefix,
        ledger_path,
        style_dir,
        author,
        default_cover_image,
        max_revisions,
        search_base_url,
        search_timeout_secs,
        search_max_attempts,
        search_retry_delay_ms,
        user_agent,
        llm_base_url,
        llm_model,
        llm_api_key,
        llm_timeout_secs,
        llm_temperature,
    })
}

/// Parse a mode-switch flag. Empty strings count as `false`.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
