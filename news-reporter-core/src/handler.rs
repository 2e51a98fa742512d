use std::path::Path;
use std::sync::Arc;

use crate::audio::{save_audio, AudioPlayer};
use crate::display::render_result;
use crate::error::{CoreResult, NewsReporterError};
use crate::model::SearchResult;
use crate::provider::{SearchProvider, SpeechProvider};

/// What `narrate` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narration {
    Played,
    NothingToPlay,
}

/// Wires search, speech and playback together for the CLI.
pub struct SearchHandler {
    search: Arc<dyn SearchProvider>,
    speech: Arc<dyn SpeechProvider>,
    player: Arc<dyn AudioPlayer>,
    width: usize,
}

impl SearchHandler {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        speech: Arc<dyn SpeechProvider>,
        player: Arc<dyn AudioPlayer>,
        width: usize,
    ) -> Self {
        Self {
            search,
            speech,
            player,
            width,
        }
    }

    pub async fn search(&self, query: &str) -> CoreResult<SearchResult> {
        tracing::debug!(provider = self.search.name(), query, "searching");
        self.search.search(query).await
    }

    /// Search and render for display. Fails only if the search fails.
    pub async fn search_and_render(&self, query: &str) -> CoreResult<(SearchResult, String)> {
        let result = self.search(query).await?;
        let rendered = render_result(&result, self.width);
        Ok((result, rendered))
    }

    /// Speak the summary of an existing result.
    pub async fn narrate(&self, result: &SearchResult) -> CoreResult<Narration> {
        if result.summary.is_empty() {
            return Ok(Narration::NothingToPlay);
        }
        let audio = self.speech.synthesize(&result.summary).await?;
        self.player.play(&audio).await?;
        Ok(Narration::Played)
    }

    /// Search, then save the spoken summary to `path`.
    pub async fn save_audio_summary(&self, query: &str, path: &Path) -> CoreResult<SearchResult> {
        let result = self.search(query).await?;
        if result.summary.is_empty() {
            return Err(NewsReporterError::Validation("no summary available to save".into()));
        }
        let audio = self.speech.synthesize(&result.summary).await?;
        save_audio(path, &audio).await?;
        Ok(result)
    }
}
