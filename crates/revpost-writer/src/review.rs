//! The review stage: formal quality check and the revise decision.

use crate::quality::{evaluate, QualityThresholds};
use crate::state::PipelineState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Send the post back to generation.
    Revise,
    /// Accept the post, passing or not.
    Proceed,
}

/// Checks the current post and records the outcome on `state`.
///
/// Template content is held to [`QualityThresholds::TEMPLATE`], model output
/// to [`QualityThresholds::REVIEW`]. The sources check counts as satisfied
/// when web search is disabled. A failing post is revised while
/// `revision_count < max_revisions`; after that it proceeds regardless.
pub fn review_post(state: &mut PipelineState, max_revisions: u32, web_search_disabled: bool) -> ReviewOutcome {
    let thresholds = if state.current_post.from_template {
        QualityThresholds::TEMPLATE
    } else {
        QualityThresholds::REVIEW
    };
    let sources_used = web_search_disabled || state.search_results.text_result_count() > 0;
    let report = evaluate(&state.current_post.content, &thresholds, sources_used);

    if !report.passed() && state.revision_count < max_revisions {
        state.revision_count += 1;
        state.current_post.needs_revision = true;
        state.feedback = format!("개선 필요: {}", report.summary());
        tracing::info!(
            product = %state.product_name,
            revision = state.revision_count,
            max_revisions,
            feedback = %state.feedback,
            "review failed, revising"
        );
        return ReviewOutcome::Revise;
    }

    state.current_post.needs_revision = false;
    state.feedback = if report.passed() {
        "검토 통과 - 품질 기준 충족".to_string()
    } else {
        format!("최대 재시도 횟수({max_revisions}) 도달 - 현재 상태로 진행")
    };
    tracing::info!(
        product = %state.product_name,
        revisions = state.revision_count,
        passed = report.passed(),
        feedback = %state.feedback,
        "review finished"
    );
    ReviewOutcome::Proceed
}
