//! Body assembly: section splitting, image interleaving, references.

use std::fmt::Write as _;

use revpost_core::SearchHit;

use crate::state::LocalImage;

/// One piece of the rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPart {
    Text(String),
    Image(LocalImage),
}

/// Splits `content` into sections; a `### ` line starts a new section unless
/// nothing has been accumulated yet.
///
/// Joining the sections with `"\n"` reproduces `content` exactly.
#[must_use]
pub fn split_sections(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    for line in content.split('\n') {
        if line.starts_with("### ") && !buffer.is_empty() {
            sections.push(buffer.join("\n"));
            buffer.clear();
        }
        buffer.push(line);
    }
    sections.push(buffer.join("\n"));
    sections
}

/// Places image `i` before section `i + 1`: the first section never gets an
/// image, and images beyond the section count are dropped.
#[must_use]
pub fn interleave(sections: Vec<String>, images: &[LocalImage]) -> Vec<BodyPart> {
    let mut parts = Vec::with_capacity(sections.len() + images.len());
    for (i, section) in sections.into_iter().enumerate() {
        if let Some(image) = i.checked_sub(1).and_then(|idx| images.get(idx)) {
            parts.push(BodyPart::Image(image.clone()));
        }
        parts.push(BodyPart::Text(section));
    }
    parts
}

/// Renders body parts; images become standalone `![alt](path)` paragraphs.
#[must_use]
pub fn render_body(parts: &[BodyPart]) -> String {
    parts
        .iter()
        .map(|part| match part {
            BodyPart::Text(text) => text.clone(),
            BodyPart::Image(image) => format!("\n![{}]({})\n", image.alt, image.path),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `## 참고 자료` list built from the first three basic-info results.
///
/// Empty when there are no usable sources.
#[must_use]
pub fn references_block(basic_info: &[SearchHit]) -> String {
    let links: Vec<&SearchHit> = basic_info
        .iter()
        .filter(|hit| !hit.url.trim().is_empty())
        .take(3)
        .collect();
    if links.is_empty() {
        return String::new();
    }

    let mut out = String::from("## 참고 자료\n\n");
    for hit in links {
        let title = hit.title.replace(['[', ']'], "");
        let title = if title.trim().is_empty() {
            hit.url.as_str()
        } else {
            title.trim()
        };
        let _ = writeln!(out, "- [{title}]({})", hit.url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(n: usize) -> LocalImage {
        LocalImage {
            path: format!("/images/p-{n}-0000000{n}.webp"),
            alt: format!("p 이미지 {n}"),
            width: 800,
            height: 600,
        }
    }

    fn rejoin(parts: &[BodyPart]) -> String {
        parts
            .iter()
            .filter_map(|p| match p {
                BodyPart::Text(t) => Some(t.as_str()),
                BodyPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    const CONTENT: &str = "도입 문단\n\n### 제품 소개\n소개\n\n### 장점\n- 가볍다\n### 단점\n- 비싸다\n";

    #[test]
    fn splits_on_heading_lines() {
        let sections = split_sections(CONTENT);
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0], "도입 문단\n");
        assert_eq!(sections[1], "### 제품 소개\n소개\n");
        assert_eq!(sections[3], "### 단점\n- 비싸다\n");
    }

    #[test]
    fn leading_heading_does_not_create_empty_section() {
        let sections = split_sections("### 제품 소개\n본문\n### 장점\n- a");
        assert_eq!(sections, vec!["### 제품 소개\n본문", "### 장점\n- a"]);
    }

    #[test]
    fn interleave_skips_first_section_and_rejoins_exactly() {
        let parts = interleave(split_sections(CONTENT), &[image(1), image(2), image(3), image(4)]);
        assert!(matches!(parts[0], BodyPart::Text(_)));
        assert!(matches!(parts[1], BodyPart::Image(ref i) if i.alt == "p 이미지 1"));
        let image_count = parts.iter().filter(|p| matches!(p, BodyPart::Image(_))).count();
        assert_eq!(image_count, 3, "one image per section after the first");
        assert_eq!(rejoin(&parts), CONTENT);
    }

    #[test]
    fn interleave_with_fewer_images_than_sections() {
        let parts = interleave(split_sections(CONTENT), &[image(1)]);
        let image_count = parts.iter().filter(|p| matches!(p, BodyPart::Image(_))).count();
        assert_eq!(image_count, 1);
        assert_eq!(rejoin(&parts), CONTENT);
    }

    #[test]
    fn rejoin_holds_for_content_without_headings() {
        let content = "제목 없는 글\n두 번째 줄";
        let parts = interleave(split_sections(content), &[image(1)]);
        assert_eq!(parts.len(), 1);
        assert_eq!(rejoin(&parts), content);
    }

    #[test]
    fn render_inserts_image_paragraphs() {
        let parts = interleave(split_sections("### A\na\n### B\nb"), &[image(1)]);
        assert_eq!(
            render_body(&parts),
            "### A\na\n\n![p 이미지 1](/images/p-1-00000001.webp)\n\n### B\nb"
        );
    }

    #[test]
    fn references_use_first_three_sources() {
        let hits: Vec<SearchHit> = (1..=4)
            .map(|i| SearchHit {
                title: format!("[출처] 기사 {i}"),
                url: format!("https://news.example.com/{i}"),
                ..SearchHit::default()
            })
            .collect();
        let block = references_block(&hits);
        assert!(block.starts_with("## 참고 자료\n\n"));
        assert!(block.contains("- [출처 기사 1](https://news.example.com/1)\n"));
        assert!(block.contains("https://news.example.com/3"));
        assert!(!block.contains("https://news.example.com/4"));
        assert!(references_block(&[]).is_empty());
    }
}
