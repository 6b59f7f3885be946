//! Web search for product research.
//!
//! Wraps a search backend behind [`SearchProvider`], retries transient
//! failures under a [`BackoffPolicy`], and aggregates per-category results
//! with [`collect_research`]. Every category degrades to an empty list rather
//! than failing the caller.

pub mod client;
pub mod error;
pub mod provider;
pub mod rate_limit;
pub mod research;

mod types;

pub use client::SearxClient;
pub use error::SearchError;
pub use provider::SearchProvider;
pub use rate_limit::{search_with_retry, BackoffPolicy};
pub use research::{collect_research, research_queries, ResearchCategory, ResearchQuery};
