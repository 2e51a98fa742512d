use thiserror::Error;

/// Core error type for news-reporter.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
///
/// Content-level anomalies in the event stream (bad JSON, unknown event
/// types, odd annotations) never show up here; only transport failures do.
#[derive(Debug, Error)]
pub enum NewsReporterError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// The response body failed mid-stream. Any partially reduced result is discarded.
    #[error("stream read failed: {0}")]
    StreamRead(String),

    #[error("rate limited by provider {provider}")]
    RateLimited {
        provider: String,
        retry_after: Option<u64>,
    },

    #[error("provider unavailable: {provider} ({reason})")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("upstream error from {provider}: {code} {message}")]
    ProviderError {
        provider: String,
        code: String,
        message: String,
    },

    #[error("audio playback failed: {0}")]
    Audio(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NewsReporterError {
    /// Short stable label for logs and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::StreamRead(_) => "stream_read",
            Self::RateLimited { .. } => "rate_limited",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ProviderError { .. } => "provider_error",
            Self::Audio(_) => "audio",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, NewsReporterError>;
