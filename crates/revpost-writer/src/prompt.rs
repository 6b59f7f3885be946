//! Prompt construction and the fixed fallback review.

use std::fmt::Write as _;

use revpost_core::{SearchHit, SearchResults};

use crate::quality::REQUIRED_SECTIONS;

/// System prompt shared by every generation call.
pub const STYLE_GUIDE: &str = "\
당신은 제품 리뷰 블로그 '리뷰 활짝'의 전문 에디터입니다.
제공된 검색 결과를 근거로 독자가 구매 결정을 내릴 수 있도록 돕는 리뷰를 작성합니다.

문체:
- 1인칭 에디터 시점의 자연스러운 대화체로 씁니다.
- 직접 사용해 본 것처럼 꾸며 쓰지 않습니다. \"써 보니\", \"제가 직접\" 같은 표현은 금지입니다.
- 장점과 단점을 균형 있게 다루고, 과장된 광고 문구를 피합니다.
- 배터리 용량(mAh), 무게(g), 화면 크기(인치), 가격(원) 같은 구체적인 수치를 최소 5개 이상 포함합니다.

구조: 아래 섹션 제목을 정확히 그대로, 이 순서로 `### ` 헤딩으로 사용합니다.
### 제품 소개
### 주요 특징
### 장점
### 단점
### 가격 정보
### 총평 및 추천 대상

장점은 최소 3가지, 단점은 최소 2가지를 글머리표(-)로 정리합니다.
검색 결과가 부족하더라도 제품에 대한 일반적이고 유용한 정보로 리뷰를 완성합니다.
본문만 출력하고 프런트매터나 코드 블록은 쓰지 않습니다.";

/// Everything the user prompt is assembled from.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInput<'a> {
    pub product_name: &'a str,
    pub task: &'a str,
    pub context: &'a str,
    pub style_excerpt: Option<&'a str>,
    /// Reviewer feedback from the previous pass, or inline-gate failures.
    pub feedback: Option<&'a str>,
}

fn truncate_chars(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn push_category(out: &mut String, heading: &str, hits: &[SearchHit], limit: usize, body_chars: usize) {
    if hits.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "[{heading}]");
    for hit in hits.iter().take(limit) {
        let body = truncate_chars(&hit.body, body_chars);
        if hit.title.is_empty() {
            let _ = writeln!(out, "- {body}");
        } else {
            let _ = writeln!(out, "- {}: {body}", hit.title.trim());
        }
    }
}

/// Condenses research results into a prompt-sized digest.
///
/// Returns an empty string when there are no text results.
#[must_use]
pub fn format_search_context(results: &SearchResults) -> String {
    let mut out = String::new();
    push_category(&mut out, "제품 정보", &results.basic_info, 3, 200);
    push_category(&mut out, "가격 정보", &results.price_info, 3, 150);
    push_category(&mut out, "사용자 의견", &results.user_reviews, 3, 200);
    push_category(&mut out, "최근 소식", &results.recent_news, 2, 150);
    out
}

/// Builds the user prompt for one generation attempt.
#[must_use]
pub fn build_user_prompt(input: &PromptInput<'_>) -> String {
    let mut prompt = format!("제품: {}\n\n", input.product_name);

    if input.context.trim().is_empty() {
        let _ = write!(
            prompt,
            "수집된 정보: 없음\n검색 결과를 수집할 수 없었습니다. {}의 일반적인 특징과 사용자들이 자주 언급하는 내용을 바탕으로 작성하세요.\n\n",
            input.product_name
        );
    } else {
        let _ = write!(prompt, "수집된 정보:\n{}\n", input.context.trim_end());
    }

    if let Some(excerpt) = input.style_excerpt.filter(|e| !e.trim().is_empty()) {
        let _ = write!(
            prompt,
            "참고할 문체 예시 (내용이 아니라 어조와 리듬만 참고하세요):\n\"\"\"\n{}\n\"\"\"\n\n",
            excerpt.trim_end()
        );
    }

    if let Some(feedback) = input.feedback.filter(|f| !f.trim().is_empty()) {
        let _ = write!(prompt, "이전 원고에 대한 검토 의견: {}\n위 문제를 반드시 보완하세요.\n\n", feedback.trim());
    }

    let _ = write!(prompt, "요청: {}", input.task.trim());
    prompt
}

/// The review used when generation is disabled or every model call failed.
///
/// Contains every required section heading, so it always satisfies the
/// structural part of the quality gate.
#[must_use]
pub fn fallback_template(product_name: &str) -> String {
    let bodies = [
        format!(
            "{product_name}은(는) 최근 많은 관심을 받고 있는 제품입니다. 이 글에서는 공개된 정보를 바탕으로 {product_name}의 특징과 장단점, 가격대를 정리하고 어떤 분께 잘 맞는지 살펴봅니다."
        ),
        format!(
            "- 완성도 높은 디자인과 마감\n- 일상적인 사용에 충분한 성능\n- 이전 세대 대비 개선된 편의 기능\n\n{product_name}은(는) 전반적인 사용성을 다듬는 데 초점을 맞춘 제품입니다."
        ),
        "- 안정적인 기본기와 완성도\n- 직관적인 사용 경험\n- 생태계 및 액세서리 지원".to_string(),
        "- 경쟁 제품 대비 높은 가격대\n- 일부 기능은 사용 환경에 따라 체감이 크지 않을 수 있음".to_string(),
        "가격은 판매처와 프로모션에 따라 차이가 큽니다. 구매 전 공식 스토어와 주요 온라인 쇼핑몰의 최저가를 비교해 보시길 권합니다.".to_string(),
        format!(
            "{product_name}은(는) 검증된 완성도를 원하는 분께 추천할 만한 선택지입니다. 다만 가격에 민감하거나 최신 기능이 꼭 필요하지 않다면 이전 모델이나 경쟁 제품도 함께 비교해 보세요."
        ),
    ];

    REQUIRED_SECTIONS
        .iter()
        .zip(bodies)
        .map(|(heading, body)| format!("### {heading}\n\n{body}\n"))
        .collect::<Vec<_>>()
        .join("\n")
}
