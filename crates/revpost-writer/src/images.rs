//! Image candidate scoring and selection.

use std::collections::HashSet;

use revpost_core::ImageHit;

use crate::state::ImageRef;

/// At most this many images are attached to a post.
pub const MAX_SELECTED_IMAGES: usize = 3;

/// Manufacturer and retail CDNs that serve full-size images quickly.
const FAST_HOSTS: &[&str] = &[
    "images.samsung.com",
    "image-us.samsung.com",
    "store.storeimages.cdn-apple.com",
    "www.apple.com",
    "m.media-amazon.com",
    "i.imgur.com",
    "upload.wikimedia.org",
    "shop-phinf.pstatic.net",
    "thumbnail.coupangcdn.com",
];

fn url_path_lower(url: &str) -> String {
    url.split(['?', '#']).next().unwrap_or(url).to_lowercase()
}

fn host(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
}

/// Heuristic preference score; higher is better.
///
/// Recency `+3`; JPEG/WebP `+2`, PNG `+1`, GIF `-2`; known fast host `+1`;
/// width 800–2500 `+2`, 400–799 `+1`, under 400 `-2`.
#[must_use]
pub fn score_image(hit: &ImageHit) -> i32 {
    let mut score = 0;
    if hit.is_recent {
        score += 3;
    }

    let path = url_path_lower(&hit.url);
    if path.ends_with(".jpg") || path.ends_with(".jpeg") || path.ends_with(".webp") {
        score += 2;
    } else if path.ends_with(".png") {
        score += 1;
    } else if path.ends_with(".gif") {
        score -= 2;
    }

    if host(&hit.url).is_some_and(|h| FAST_HOSTS.contains(&h.as_str())) {
        score += 1;
    }

    match hit.width {
        Some(w) if (800..=2500).contains(&w) => score += 2,
        Some(w) if (400..800).contains(&w) => score += 1,
        Some(w) if w < 400 => score -= 2,
        _ => {}
    }
    score
}

/// Picks up to `limit` images: recent candidates first, then by score,
/// skipping repeated URLs. Nothing is downloaded.
#[must_use]
pub fn select_images(candidates: &[ImageHit], limit: usize) -> Vec<ImageRef> {
    let mut scored: Vec<ImageRef> = candidates
        .iter()
        .filter(|hit| !hit.url.trim().is_empty())
        .map(|hit| ImageRef {
            url: hit.url.clone(),
            title: hit.title.clone(),
            width: hit.width,
            height: hit.height,
            is_recent: hit.is_recent,
            score: score_image(hit),
        })
        .collect();
    // Stable: ties keep search order.
    scored.sort_by(|a, b| b.is_recent.cmp(&a.is_recent).then(b.score.cmp(&a.score)));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|img| seen.insert(img.url.clone()))
        .take(limit)
        .collect()
}
