use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::PlayerCfg;
use crate::error::{CoreResult, NewsReporterError};

/// Plays encoded audio. Decoding is the player's business.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: &[u8]) -> CoreResult<()>;
}

/// Pipes audio into an external program's stdin and waits for it to exit.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &PlayerCfg) -> CoreResult<Self> {
        let (program, args) = cfg
            .command
            .split_first()
            .ok_or_else(|| NewsReporterError::Validation("player command is empty".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, audio: &[u8]) -> CoreResult<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NewsReporterError::Audio(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A player that exits early closes the pipe; its exit status tells the story.
            if let Err(e) = stdin.write_all(audio).await {
                tracing::debug!(error = %e, "player closed stdin early");
            }
            drop(stdin);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| NewsReporterError::Audio(format!("failed to wait for {}: {e}", self.program)))?;
        if !status.success() {
            return Err(NewsReporterError::Audio(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}

/// Write encoded audio to `path`.
pub async fn save_audio(path: impl AsRef<Path>, audio: &[u8]) -> CoreResult<()> {
    tokio::fs::write(path.as_ref(), audio).await?;
    tracing::info!(path = %path.as_ref().display(), bytes = audio.len(), "audio saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn from_config_splits_program_and_args() {
        let cfg = PlayerCfg {
            command: vec!["mpv".into(), "--no-video".into(), "-".into()],
        };
        let p = CommandPlayer::from_config(&cfg).unwrap();
        assert_eq!(p.program, "mpv");
        assert_eq!(p.args, vec!["--no-video".to_string(), "-".to_string()]);
    }

    #[test]
    fn empty_command_is_invalid() {
        let err = CommandPlayer::from_config(&PlayerCfg { command: vec![] }).unwrap_err();
        assert!(matches!(err, NewsReporterError::Validation(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pipes_audio_to_program() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("played.bin");
        let player = CommandPlayer::new(
            "sh",
            vec!["-c".into(), format!("cat > '{}'", out.display())],
        );
        player.play(b"audio-bytes").await.expect("play ok");
        assert_eq!(std::fs::read(&out).unwrap(), b"audio-bytes");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_audio_error() {
        let player = CommandPlayer::new("sh", vec!["-c".into(), "cat > /dev/null; exit 3".into()]);
        let err = player.play(b"x").await.unwrap_err();
        assert!(matches!(err, NewsReporterError::Audio(_)));
    }

    #[tokio::test]
    async fn missing_program_is_audio_error() {
        let player = CommandPlayer::new("definitely-not-a-real-player-binary", vec![]);
        let err = player.play(b"x").await.unwrap_err();
        assert!(matches!(err, NewsReporterError::Audio(_)));
    }

    #[tokio::test]
    async fn save_audio_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.mp3");
        save_audio(&path, b"ID3").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3");
    }
}
