//! Temp audio handling and format conversion

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::SpeechError;

/// Temp file removed on drop.
///
/// Turn handling writes uploaded audio and its converted form to disk for
/// the duration of one request; the guard removes them on every exit path.
#[derive(Debug)]
pub struct TempAudio {
    path: PathBuf,
}

impl TempAudio {
    pub async fn write(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<Self, SpeechError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    /// Claim an existing file so it is removed on drop
    pub fn adopt(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Vec<u8>, SpeechError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove temp audio");
            }
        }
    }
}

/// Convert uploaded audio to 16 kHz mono 16-bit PCM WAV with ffmpeg.
///
/// Returns a guard for the output file; the caller keeps the input guard
/// alive until conversion finishes.
pub async fn transcode_to_wav(
    input: &Path,
    output: &Path,
    sample_rate: u32,
) -> Result<TempAudio, SpeechError> {
    // Adopt before spawning so a partial output is removed when ffmpeg fails
    let guard = TempAudio::adopt(output.to_path_buf());
    let status = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ar")
        .arg(sample_rate.to_string())
        .arg("-ac")
        .arg("1")
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| SpeechError::Transcode(format!("failed to launch ffmpeg: {}", e)))?;

    if !status.success() {
        return Err(SpeechError::Transcode(format!(
            "ffmpeg exited with {}",
            status
        )));
    }
    debug!(output = %output.display(), sample_rate, "audio converted");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_audio_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path;
        {
            let audio = TempAudio::write(dir.path(), "turn.webm", b"data")
                .await
                .unwrap();
            path = audio.path().to_path_buf();
            assert!(path.exists());
            assert_eq!(audio.read().await.unwrap(), b"data");
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_transcode_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("not-audio.webm");
        tokio::fs::write(&input, b"not audio at all").await.unwrap();
        let output = dir.path().join("out.wav");
        tokio::fs::write(&output, b"partial").await.unwrap();

        // Fails whether ffmpeg rejects the input or is not installed;
        // the output must be gone either way.
        let result = transcode_to_wav(&input, &output, 16000).await;
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_adopt_missing_file_drop_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let audio = TempAudio::adopt(dir.path().join("never-written.wav"));
        drop(audio);
    }
}
