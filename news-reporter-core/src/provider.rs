use async_trait::async_trait;

use crate::error::CoreResult;
use crate::model::SearchResult;

/// Runs a web-backed search and reduces the answer to a `SearchResult`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, query: &str) -> CoreResult<SearchResult>;
}

/// Turns text into encoded audio bytes.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn synthesize(&self, text: &str) -> CoreResult<Vec<u8>>;
}

/// A dummy provider that returns empty results and silent audio.
/// Useful for tests or as a placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProvider;

#[async_trait]
impl SearchProvider for NullProvider {
    fn name(&self) -> &str { "null" }

    async fn search(&self, query: &str) -> CoreResult<SearchResult> {
        Ok(SearchResult::empty(query))
    }
}

#[async_trait]
impl SpeechProvider for NullProvider {
    fn name(&self) -> &str { "null" }

    async fn synthesize(&self, _text: &str) -> CoreResult<Vec<u8>> {
        Ok(Vec::new())
    }
}
