//! Content quality gate.
//!
//! A pure check over generated text: length, density of concrete numeric
//! specs, required section headings and (for the review pass) whether any
//! research sources backed the content. The same [`evaluate`] runs inline
//! during generation and again at review, each with its own
//! [`QualityThresholds`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Section headings every review must contain, as exact `### <heading>` lines.
pub const REQUIRED_SECTIONS: [&str; 6] = [
    "제품 소개",
    "주요 특징",
    "장점",
    "단점",
    "가격 정보",
    "총평 및 추천 대상",
];

static METRIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d[\d,]*(?:\.\d+)?\s*(?:%|만원|원|인치|시간|mah|kg|mm|cm|ghz|gb|tb|hz|nits|inch|mp|g|w)",
    )
    .expect("valid metric regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityThresholds {
    /// Minimum length in Unicode scalar values.
    pub min_chars: usize,
    pub min_metrics: usize,
    pub require_sections: bool,
    pub require_sources: bool,
}

impl QualityThresholds {
    /// Applied to each candidate inside the generation loop.
    pub const INLINE: Self = Self {
        min_chars: 1500,
        min_metrics: 3,
        require_sections: true,
        require_sources: false,
    };

    /// Applied by the review stage to model output.
    pub const REVIEW: Self = Self {
        min_chars: 1200,
        min_metrics: 5,
        require_sections: true,
        require_sources: true,
    };

    /// Applied by the review stage to the fallback template.
    pub const TEMPLATE: Self = Self {
        min_chars: 300,
        min_metrics: 0,
        require_sections: true,
        require_sources: true,
    };
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityCheck {
    Length { actual: usize, required: usize },
    Metrics { actual: usize, required: usize },
    MissingSection(&'static str),
    Sources,
}

impl fmt::Display for QualityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityCheck::Length { actual, required } => {
                write!(f, "분량 부족({actual}/{required}자)")
            }
            QualityCheck::Metrics { actual, required } => {
                write!(f, "구체적 수치 부족({actual}/{required}개)")
            }
            QualityCheck::MissingSection(heading) => write!(f, "'### {heading}' 섹션 누락"),
            QualityCheck::Sources => f.write_str("참고 자료 없음"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityReport {
    pub char_count: usize,
    pub metric_count: usize,
    pub failed: Vec<QualityCheck>,
}

impl QualityReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Failed checks joined for use as reviewer feedback.
    #[must_use]
    pub fn summary(&self) -> String {
        self.failed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Counts numeric measurement tokens such as `5000mAh`, `6.8인치`, `1,690,000원`, `120Hz`.
///
/// An ASCII unit immediately followed by another ASCII letter is not a unit
/// (`5 games` does not count as grams). A bare uppercase `G` is a network
/// generation (`5G`), not grams.
#[must_use]
pub fn count_metrics(content: &str) -> usize {
    METRIC
        .find_iter(content)
        .filter(|m| !m.as_str().ends_with('G'))
        .filter(|m| {
            !content[m.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
        })
        .count()
}

/// `true` when `content` has a line that is exactly `### <heading>`.
#[must_use]
pub fn has_section(content: &str, heading: &str) -> bool {
    content
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix("### "))
        .any(|h| h.trim() == heading)
}

/// Evaluates `content` against `thresholds`.
///
/// `sources_used` is only consulted when the thresholds require sources.
#[must_use]
pub fn evaluate(content: &str, thresholds: &QualityThresholds, sources_used: bool) -> QualityReport {
    let char_count = content.chars().count();
    let metric_count = count_metrics(content);
    let mut failed = Vec::new();

    if char_count < thresholds.min_chars {
        failed.push(QualityCheck::Length {
            actual: char_count,
            required: thresholds.min_chars,
        });
    }
    if metric_count < thresholds.min_metrics {
        failed.push(QualityCheck::Metrics {
            actual: metric_count,
            required: thresholds.min_metrics,
        });
    }
    if thresholds.require_sections {
        failed.extend(
            REQUIRED_SECTIONS
                .iter()
                .filter(|heading| !has_section(content, heading))
                .map(|heading| QualityCheck::MissingSection(*heading)),
        );
    }
    if thresholds.require_sources && !sources_used {
        failed.push(QualityCheck::Sources);
    }

    QualityReport {
        char_count,
        metric_count,
        failed,
    }
}

#[cfg(test)]
#[path = "quality_test.rs"]
mod tests;
