use std::future::Future;

use revpost_core::{SearchHit, SearchKind};

use crate::error::SearchError;

/// A web search backend.
///
/// Implementations report failures as [`SearchError`]; callers that need the
/// never-fails contract go through [`crate::search_with_retry`].
pub trait SearchProvider: Send + Sync {
    fn search(
        &self,
        query: &str,
        kind: SearchKind,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;
}
