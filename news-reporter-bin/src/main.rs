use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use news_reporter_core::{
    audio::CommandPlayer,
    config::Config,
    handler::{Narration, SearchHandler},
    providers::openai::OpenAi,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Search the web for the latest news and print an AI summary with sources",
    long_about = None
)]
struct Cli {
    /// Search query; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Offer to read the summary aloud after displaying it
    #[arg(short, long, conflicts_with = "json")]
    audio: bool,

    /// Save the spoken summary to FILE instead of displaying results
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["audio", "json"])]
    save: Option<PathBuf>,

    /// Wrap output to this many columns (defaults to the configured width)
    #[arg(long)]
    width: Option<usize>,

    /// Print the result as JSON instead of the text layout
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    println!("{prompt}");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional.
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let query = cli.query.join(" ");
    if query.trim().is_empty() {
        bail!("empty search query");
    }

    let cfg = Config::from_env().context("configuration error (hint: export OPENAI_API_KEY=...)")?;
    let width = cli.width.unwrap_or(cfg.settings.display_width);

    let openai = Arc::new(OpenAi::from_config(&cfg)?);
    let player = Arc::new(CommandPlayer::from_config(&cfg.settings.player)?);
    let handler = SearchHandler::new(openai.clone(), openai, player, width);

    if let Some(path) = cli.save {
        println!("Generating spoken summary: {}", path.display());
        handler
            .save_audio_summary(&query, &path)
            .await
            .context("saving audio summary failed")?;
        println!("Saved audio summary to {}", path.display());
        return Ok(());
    }

    if !cli.json {
        let now = Local::now().format("%Y-%m-%d %H:%M");
        println!("Searching for the latest information: {query} (as of {now})");
        println!("{}", "-".repeat(50));
    }

    let (result, rendered) = handler
        .search_and_render(&query)
        .await
        .context("search failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{rendered}");
    }

    if cli.audio && confirm("\nPlay the summary as audio? (y/N): ").await? {
        match handler.narrate(&result).await {
            Ok(Narration::Played) => println!("Playback finished."),
            Ok(Narration::NothingToPlay) => println!("No summary available to play."),
            // Narration is optional; the search itself succeeded.
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "audio playback failed");
                eprintln!("warning: audio playback failed: {e}");
            }
        }
    }

    if !cli.json {
        println!("\nDone.");
    }
    Ok(())
}
