pub mod audio;
pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod handler;
pub mod http_client;
pub mod model;
pub mod normalizer;
pub mod provider;
pub mod providers;
pub mod stream;
pub mod telemetry;
