use async_trait::async_trait;

use crate::api::{ApiError, SearchResultSet};

/// The two remote calls the search box makes. Implemented by
/// [`crate::api::ApiClient`]; tests substitute a scripted backend.
#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ApiError>;
    async fn search(&self, query: &str) -> Result<SearchResultSet, ApiError>;
}
