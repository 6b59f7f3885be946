//! Content generation with the inline quality gate.

use crate::llm::ContentGenerator;
use crate::prompt::{build_user_prompt, fallback_template, PromptInput, STYLE_GUIDE};
use crate::quality::{evaluate, QualityThresholds};

/// Model calls per generation pass.
pub const MAX_GENERATION_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub content: String,
    pub from_template: bool,
    /// Model calls made, 0 when generation was skipped.
    pub attempts: u32,
}

impl Generated {
    #[must_use]
    pub fn template(product_name: &str) -> Self {
        Self {
            content: fallback_template(product_name),
            from_template: true,
            attempts: 0,
        }
    }
}

fn merge_feedback(reviewer: Option<&str>, inline: Option<&str>) -> Option<String> {
    match (reviewer.filter(|f| !f.is_empty()), inline) {
        (Some(r), Some(i)) => Some(format!("{r} / {i}")),
        (Some(r), None) => Some(r.to_string()),
        (None, Some(i)) => Some(i.to_string()),
        (None, None) => None,
    }
}

/// Calls `generator` up to [`MAX_GENERATION_ATTEMPTS`] times until a
/// candidate passes [`QualityThresholds::INLINE`]; each retry is told what
/// the previous candidate lacked.
///
/// If nothing passes, the longest candidate wins. If every call fails, the
/// fallback template for `input.product_name` is returned.
pub async fn generate_content<G: ContentGenerator>(generator: &G, input: &PromptInput<'_>) -> Generated {
    let mut best: Option<String> = None;
    let mut inline_feedback: Option<String> = None;

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let feedback = merge_feedback(input.feedback, inline_feedback.as_deref());
        let prompt = build_user_prompt(&PromptInput {
            feedback: feedback.as_deref(),
            ..*input
        });

        match generator.complete(STYLE_GUIDE, &prompt).await {
            Ok(text) => {
                let report = evaluate(&text, &QualityThresholds::INLINE, true);
                if report.passed() {
                    tracing::info!(
                        product = input.product_name,
                        attempt,
                        chars = report.char_count,
                        "candidate passed inline quality gate"
                    );
                    return Generated {
                        content: text,
                        from_template: false,
                        attempts: attempt,
                    };
                }
                tracing::info!(
                    product = input.product_name,
                    attempt,
                    chars = report.char_count,
                    failed = %report.summary(),
                    "candidate below inline quality gate"
                );
                if best
                    .as_ref()
                    .is_none_or(|b| text.chars().count() > b.chars().count())
                {
                    best = Some(text);
                }
                inline_feedback = Some(report.summary());
            }
            Err(e) => {
                tracing::warn!(product = input.product_name, attempt, error = %e, "generation call failed");
            }
        }
    }

    match best {
        Some(content) => Generated {
            content,
            from_template: false,
            attempts: MAX_GENERATION_ATTEMPTS,
        },
        None => {
            tracing::warn!(
                product = input.product_name,
                "every generation call failed, using fallback template"
            );
            Generated {
                attempts: MAX_GENERATION_ATTEMPTS,
                ..Generated::template(input.product_name)
            }
        }
    }
}
