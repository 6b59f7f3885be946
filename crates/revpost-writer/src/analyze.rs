//! Task analysis: style-token extraction, product-name matching, slugs.

use std::sync::LazyLock;

use regex::Regex;

use crate::state::StyleReference;

/// Brand and product-line nouns that anchor product-name extraction, in
/// priority order.
pub const DEFAULT_TRIGGERS: &[&str] = &[
    "에어팟",
    "갤럭시",
    "아이폰",
    "아이패드",
    "맥북",
    "애플워치",
    "다이슨",
    "LG",
    "삼성",
    "샤오미",
    "소니",
    "보스",
    "닌텐도",
    "플레이스테이션",
];

/// Words that describe the request rather than the product.
pub const GENERIC_WORDS: &[&str] = &["리뷰", "작성", "후기", "사용기", "해줘", "써줘"];

static STYLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([\w.\-]+)\s*\(\s*(\d+)\s*-\s*(\d+)\s*\)").expect("valid style token regex")
});

/// Removes the first `@name (start-end)` token from `task`.
///
/// Returns the task with the token stripped and whitespace collapsed, plus
/// the parsed reference. A token whose line numbers overflow is stripped but
/// not returned.
#[must_use]
pub fn extract_style_reference(task: &str) -> (String, Option<StyleReference>) {
    let Some(caps) = STYLE_TOKEN.captures(task) else {
        return (collapse_whitespace(task), None);
    };

    let reference = match (caps[2].parse::<usize>(), caps[3].parse::<usize>()) {
        (Ok(start), Ok(end)) => Some(StyleReference {
            name: caps[1].to_string(),
            start,
            end,
        }),
        _ => None,
    };

    let stripped = STYLE_TOKEN.replace(task, " ");
    (collapse_whitespace(&stripped), reference)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_generic(word: &str) -> bool {
    GENERIC_WORDS.iter().any(|g| word.contains(g))
}

/// Ordered trigger-word matcher with a fixed word window.
///
/// The first trigger (in list order) found inside any word anchors a window
/// of up to `before` words before it and `after` words after it. Generic
/// request words end the window on either side.
#[derive(Debug, Clone)]
pub struct ProductMatcher {
    triggers: Vec<String>,
    before: usize,
    after: usize,
}

impl Default for ProductMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGERS.iter().map(|t| (*t).to_string()).collect())
    }
}

impl ProductMatcher {
    #[must_use]
    pub fn new(triggers: Vec<String>) -> Self {
        Self {
            triggers,
            before: 1,
            after: 3,
        }
    }

    #[must_use]
    pub fn with_window(mut self, before: usize, after: usize) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    /// Extracts a product name from `text`.
    ///
    /// Falls back to `text` with generic words removed when no trigger
    /// matches. May return an empty string for an empty or all-generic task.
    #[must_use]
    pub fn extract(&self, text: &str) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        for trigger in &self.triggers {
            let needle = trigger.to_lowercase();
            if needle.is_empty() {
                continue;
            }
            let Some(anchor) = lowered.iter().position(|w| w.contains(&needle)) else {
                continue;
            };

            let mut start = anchor;
            while start > 0 && anchor - (start - 1) <= self.before && !is_generic(words[start - 1]) {
                start -= 1;
            }
            let mut end = anchor;
            while end + 1 < words.len() && end + 1 - anchor <= self.after && !is_generic(words[end + 1]) {
                end += 1;
            }
            return words[start..=end].join(" ");
        }

        words
            .iter()
            .filter(|w| !is_generic(w))
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// URL- and filename-safe form of `name`: lowercase, alphanumerics kept
/// (including Hangul), every other run of characters collapsed to one `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "product".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
