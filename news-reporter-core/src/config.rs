use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::{CoreResult, NewsReporterError};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_CONFIG_PATH: &str = "NEWS_REPORTER_CONFIG";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpCfg {
    /// TCP connect timeout in milliseconds (default 5000ms)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Total request timeout in milliseconds (default 60000ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Optional per-host idle connection pool cap (None = reqwest default)
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            pool_max_idle_per_host: None,
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_request_timeout_ms() -> u64 {
    60_000
}

/// Speech synthesis settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TtsCfg {
    #[serde(default = "default_tts_model")]
    pub model: String,
    /// One of alloy, echo, fable, onyx, nova, shimmer.
    #[serde(default = "default_tts_voice")]
    pub voice: String,
    #[serde(default = "default_tts_format")]
    pub format: String,
    /// Synthesis of a long summary is slow; this is deliberately above `HttpCfg`'s default.
    #[serde(default = "default_tts_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for TtsCfg {
    fn default() -> Self {
        Self {
            model: default_tts_model(),
            voice: default_tts_voice(),
            format: default_tts_format(),
            request_timeout_ms: default_tts_timeout_ms(),
        }
    }
}

fn default_tts_model() -> String {
    "tts-1".into()
}
fn default_tts_voice() -> String {
    "alloy".into()
}
fn default_tts_format() -> String {
    "mp3".into()
}
fn default_tts_timeout_ms() -> u64 {
    120_000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerCfg {
    /// Program and arguments; the audio bytes are written to its stdin.
    #[serde(default = "default_player_command")]
    pub command: Vec<String>,
}

impl Default for PlayerCfg {
    fn default() -> Self {
        Self {
            command: default_player_command(),
        }
    }
}

fn default_player_command() -> Vec<String> {
    ["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet", "-"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_language() -> String {
    "Japanese".into()
}
fn default_display_width() -> usize {
    80
}

/// Tunables that may come from a settings file. Every field has a default,
/// so an empty file (or no file) is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Language the summary is requested in.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_display_width")]
    pub display_width: usize,
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub tts: TtsCfg,
    #[serde(default)]
    pub player: PlayerCfg,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            language: default_language(),
            display_width: default_display_width(),
            http: HttpCfg::default(),
            tts: TtsCfg::default(),
            player: PlayerCfg::default(),
        }
    }
}

impl Settings {
    /// Load settings from a file path (JSON or TOML by extension). If the
    /// extension is missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(NewsReporterError::from)?;
        let s = std::str::from_utf8(&bytes).map_err(|e| NewsReporterError::Other(e.into()))?;
        let settings: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str::<Self>(s).map_err(|e| NewsReporterError::Other(e.into()))?
            }
            Some("toml") => {
                toml::from_str::<Self>(s).map_err(|e| NewsReporterError::Other(e.into()))?
            }
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| NewsReporterError::Other(e.into()))
                .or_else(|_| {
                    toml::from_str::<Self>(s).map_err(|e| NewsReporterError::Other(e.into()))
                })?,
        };
        Ok(settings)
    }
}

/// Resolved runtime configuration, passed explicitly to the clients that need it.
#[derive(Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub base_url: String,
    pub settings: Settings,
}

impl Config {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, settings: Settings) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            settings,
        }
    }

    /// Build from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                NewsReporterError::Validation(format!("{ENV_API_KEY} environment variable is required"))
            })?;

        let base_url = lookup(ENV_BASE_URL)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let settings = match lookup(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
            Some(path) => Settings::from_path(path)?,
            None => Settings::default(),
        };

        Ok(Self::new(SecretString::new(api_key.into()), base_url, settings))
    }
}
