//! YAML front matter for generated posts.

use chrono::{DateTime, Local};
use rand::Rng;
use serde::Serialize;

use crate::error::WriterError;
use crate::state::LocalImage;

pub const CATEGORY: &str = "제품리뷰";

const TITLE_TEMPLATES: [&str; 3] = [
    "{product} 리뷰 - 실사용 후기와 장단점",
    "{product} 리뷰: 사기 전에 꼭 알아야 할 장단점",
    "{product} 솔직 리뷰 - 스펙, 가격, 추천 대상 총정리",
];

const EXCERPT_TEMPLATES: [&str; 3] = [
    "{product}에 대한 상세한 리뷰와 구매 가이드",
    "{product}의 주요 특징과 장단점, 가격 정보를 한눈에 정리했습니다.",
    "{product}, 어떤 분께 맞을까요? 장점과 단점을 꼼꼼히 살펴봤습니다.",
];

/// Picks an index in `0..len`. `len` is never zero.
pub trait Chooser: Send + Sync {
    fn choose(&self, len: usize) -> usize;
}

/// Uniformly random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChooser;

impl Chooser for RandomChooser {
    fn choose(&self, len: usize) -> usize {
        rand::rng().random_range(0..len.max(1))
    }
}

/// Always the same index, clamped to the last option.
#[derive(Debug, Clone, Copy)]
pub struct FixedChooser(pub usize);

impl Chooser for FixedChooser {
    fn choose(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub updated: String,
    pub author: String,
    pub excerpt: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: String,
    pub image_alt: String,
    pub rating: f64,
    pub noindex: bool,
}

/// Inputs that are not derived from the content itself.
#[derive(Debug, Clone, Copy)]
pub struct FrontMatterInput<'a> {
    pub product_name: &'a str,
    pub content: &'a str,
    pub local_images: &'a [LocalImage],
    pub author: &'a str,
    pub default_cover_image: &'a str,
    pub now: DateTime<Local>,
}

/// Crude rating: 4.0 shifted by 0.05 per bullet line and -0.05 per "단점"
/// mention, the shift bounded to ±0.5, clamped to `[1, 5]` with one decimal.
#[must_use]
pub fn compute_rating(content: &str) -> f64 {
    let bullets = content
        .lines()
        .map(str::trim_start)
        .filter(|l| l.starts_with("- ") || l.starts_with("* ") || l.starts_with("• "))
        .count();
    let cons = content.matches("단점").count();

    #[allow(clippy::cast_precision_loss)]
    let delta = (bullets as f64 - cons as f64) * 0.05;
    let rating = (4.0 + delta.clamp(-0.5, 0.5)).clamp(1.0, 5.0);
    (rating * 10.0).round() / 10.0
}

fn fill(template: &str, product_name: &str) -> String {
    template.replace("{product}", product_name)
}

/// Builds the front matter, using `chooser` for the title and excerpt
/// templates.
#[must_use]
pub fn build_front_matter(input: &FrontMatterInput<'_>, chooser: &dyn Chooser) -> FrontMatter {
    let title = fill(TITLE_TEMPLATES[chooser.choose(TITLE_TEMPLATES.len())], input.product_name);
    let excerpt = fill(
        EXCERPT_TEMPLATES[chooser.choose(EXCERPT_TEMPLATES.len())],
        input.product_name,
    );

    let mut tags = vec![input.product_name.to_string()];
    if let Some(first) = input.product_name.split_whitespace().next() {
        if first != input.product_name {
            tags.push(first.to_string());
        }
    }
    tags.push("리뷰".to_string());
    tags.push("실사용후기".to_string());

    let (image, image_alt) = match input.local_images.first() {
        Some(img) => (img.path.clone(), img.alt.clone()),
        None => (
            input.default_cover_image.to_string(),
            format!("{} 대표 이미지", input.product_name),
        ),
    };

    let date = input.now.format("%Y-%m-%d").to_string();
    FrontMatter {
        title,
        updated: date.clone(),
        date,
        author: input.author.to_string(),
        excerpt,
        category: CATEGORY.to_string(),
        tags,
        image,
        image_alt,
        rating: compute_rating(input.content),
        noindex: false,
    }
}

/// `---\n<yaml>---\n`
///
/// # Errors
///
/// Returns [`WriterError::Yaml`] if serialization fails.
pub fn render_front_matter(front_matter: &FrontMatter) -> Result<String, WriterError> {
    let yaml = serde_yaml::to_string(front_matter)?;
    Ok(format!("---\n{yaml}---\n"))
}
