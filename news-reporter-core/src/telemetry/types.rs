use serde::{Deserialize, Serialize};

use crate::error::NewsReporterError;
use crate::model::SearchResult;

/// Structured record of one search call, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLog {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub query: Option<String>,
    pub latency_ms: Option<u64>,

    pub citations: Option<usize>,
    pub summary_chars: Option<usize>,

    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

impl SearchLog {
    pub fn new() -> Self { Self::default() }
    pub fn provider(mut self, v: &str) -> Self { self.provider = Some(v.to_string()); self }
    pub fn model(mut self, v: &str) -> Self { self.model = Some(v.to_string()); self }
    pub fn query(mut self, v: &str) -> Self { self.query = Some(v.to_string()); self }
    pub fn latency_ms(mut self, v: u64) -> Self { self.latency_ms = Some(v); self }

    /// Fill the outcome fields from a search outcome.
    pub fn outcome(mut self, outcome: &Result<SearchResult, NewsReporterError>) -> Self {
        match outcome {
            Ok(result) => {
                self.citations = Some(result.citations.len());
                self.summary_chars = Some(result.summary.chars().count());
            }
            Err(e) => {
                self.error_kind = Some(e.kind().to_string());
                self.error_message = Some(e.to_string());
            }
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.error_kind.is_none()
    }
}
