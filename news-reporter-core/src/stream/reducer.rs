use chrono::Utc;
use futures_util::stream::{Stream, StreamExt};

use super::classifier::{classify, ClassifiedEvent};
use super::frame::EventRecord;
use crate::error::CoreResult;
use crate::model::{Citation, SearchResult};

/// Accumulation state for one query. Not shared: one reducer per stream.
#[derive(Debug)]
pub struct StreamReducer {
    query: String,
    summary: String,
    citations: Vec<Citation>,
}

impl StreamReducer {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            summary: String::new(),
            citations: Vec::new(),
        }
    }

    /// Fold one classified event into the state.
    pub fn apply(&mut self, event: ClassifiedEvent) {
        match event {
            ClassifiedEvent::TextDelta(delta) => self.summary.push_str(&delta),
            ClassifiedEvent::CitationAdded(citation) => {
                // First one wins; later duplicates do not update it.
                if !self.citations.iter().any(|c| c.url == citation.url) {
                    self.citations.push(citation);
                }
            }
            ClassifiedEvent::Ignored => {}
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Consume the state and stamp the result with the completion time.
    pub fn finish(self) -> SearchResult {
        SearchResult {
            query: self.query,
            citations: self.citations,
            summary: self.summary,
            timestamp: Utc::now(),
        }
    }
}

/// Reduce a frame stream to a `SearchResult`.
///
/// Stops at the first terminal record or when the stream ends. The first
/// read error is returned as-is and the partial state is dropped.
pub async fn reduce<S>(query: &str, mut frames: S) -> CoreResult<SearchResult>
where
    S: Stream<Item = CoreResult<EventRecord>> + Unpin,
{
    let mut reducer = StreamReducer::new(query);
    let mut frame_count = 0usize;
    let mut saw_done = false;

    while let Some(record) = frames.next().await {
        let record = record?;
        if record.is_terminal() {
            saw_done = true;
            break;
        }
        frame_count += 1;
        reducer.apply(classify(&record.payload));
    }

    if !saw_done {
        tracing::debug!(frames = frame_count, "stream ended without [DONE]");
    }
    tracing::debug!(
        frames = frame_count,
        citations = reducer.citations().len(),
        summary_chars = reducer.summary().chars().count(),
        "stream reduced"
    );
    Ok(reducer.finish())
}
