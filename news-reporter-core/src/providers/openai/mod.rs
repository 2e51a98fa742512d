use std::time::Instant;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use secrecy::{ExposeSecret, SecretString};
use tracing_futures::Instrument;

use crate::config::{Config, Settings};
use crate::error::{CoreResult, NewsReporterError};
use crate::http_client::HttpClient;
use crate::model::{InputItem, ResponseRequest, Role, SearchResult, SpeechRequest, Tool};
use crate::normalizer::normalize_query;
use crate::provider::{SearchProvider, SpeechProvider};
use crate::stream::{reduce, EventFrames};
use crate::telemetry::{emit_search, SearchLog};

/// Client for the responses endpoint (streamed web search) and the speech endpoint.
#[derive(Debug)]
pub struct OpenAi {
    http: HttpClient,
    speech_http: HttpClient,
    base: String,
    name: String, // usually "openai"
    api_key: SecretString,
    settings: Settings,
}

impl OpenAi {
    pub fn new(http: HttpClient, speech_http: HttpClient, cfg: &Config) -> Self {
        Self {
            http,
            speech_http,
            base: cfg.base_url.clone(),
            name: "openai".into(),
            api_key: SecretString::new(cfg.api_key.expose_secret().into()),
            settings: cfg.settings.clone(),
        }
    }

    /// Build both HTTP clients from the config's timeouts.
    pub fn from_config(cfg: &Config) -> CoreResult<Self> {
        let http = HttpClient::new(&cfg.settings.http)?;
        let speech_http = HttpClient::with_timeout(&cfg.settings.http, cfg.settings.tts.request_timeout_ms)?;
        Ok(Self::new(http, speech_http, cfg))
    }

    #[cfg(test)]
    pub fn new_for_tests(server_base: &str) -> Self {
        let cfg = Config::new(SecretString::new("test-key".into()), server_base, Settings::default());
        OpenAi::from_config(&cfg).unwrap()
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key.expose_secret()),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }

    /// The streamed request for `query`, anchored to `today`.
    pub fn build_search_request(&self, query: &str, today: NaiveDate) -> ResponseRequest {
        let date = today.format("%Y-%m-%d").to_string();
        let system = format!(
            "You are an assistant that searches for the latest news and information.\n\
             Current date: {date}\n\
             \n\
             Follow these instructions:\n\
             1. Always use the web_search_preview tool to search for the latest information.\n\
             2. Prefer information from today ({date}) or as recent as possible.\n\
             3. Avoid stale information (more than a week old) and focus on the latest news.\n\
             4. Summarize the search results in {language} and include the source URLs.\n\
             5. If the date of a piece of information is unclear, say so explicitly.",
            language = self.settings.language,
        );
        let user = format!("[As of {date}] {query} (latest information, today's news)");

        ResponseRequest {
            model: self.settings.model.clone(),
            input: vec![
                InputItem::message(Role::System, system),
                InputItem::message(Role::User, user),
            ],
            tools: vec![Tool::web_search_preview()],
            tool_choice: Some("required".into()),
            stream: true,
            temperature: Some(self.settings.temperature),
        }
    }

    async fn stream_search(&self, query: &str) -> CoreResult<SearchResult> {
        let payload = self.build_search_request(query, Local::now().date_naive());
        let owned_headers = self.headers();
        let hdrs: Vec<(&str, &str)> = owned_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = format!("{}/responses", self.base);
        let lines = self.http.post_sse_lines(&url, &payload, &hdrs).await?;
        reduce(query, EventFrames::new(lines)).await
    }
}

#[async_trait]
impl SearchProvider for OpenAi {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> CoreResult<SearchResult> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Err(NewsReporterError::Validation("search query is empty".into()));
        }

        let started = Instant::now();
        let span = tracing::info_span!("search", provider = %self.name, model = %self.settings.model);
        let outcome = self.stream_search(&query).instrument(span).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(result) => tracing::info!(
                latency_ms,
                citations = result.citations.len(),
                "search completed"
            ),
            Err(e) => tracing::warn!(latency_ms, error = %e, "search failed"),
        }
        emit_search(
            SearchLog::new()
                .provider(&self.name)
                .model(&self.settings.model)
                .query(&query)
                .latency_ms(latency_ms)
                .outcome(&outcome),
        );
        outcome
    }
}

#[async_trait]
impl SpeechProvider for OpenAi {
    fn name(&self) -> &str {
        &self.name
    }

    async fn synthesize(&self, text: &str) -> CoreResult<Vec<u8>> {
        let tts = &self.settings.tts;
        let payload = SpeechRequest {
            model: tts.model.clone(),
            input: text.to_string(),
            voice: tts.voice.clone(),
            response_format: tts.format.clone(),
        };
        let owned_headers = self.headers();
        let hdrs: Vec<(&str, &str)> = owned_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = format!("{}/audio/speech", self.base);
        let audio = self
            .speech_http
            .post_bytes(&url, &payload, &hdrs)
            .instrument(tracing::debug_span!("synthesize", model = %tts.model, voice = %tts.voice))
            .await?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio)
    }
}
