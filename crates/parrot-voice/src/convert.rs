//! Telephony transcoding through an external `ffmpeg` process.

use crate::config::ConverterConfig;
use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Converts provider audio into the telephony format.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>, ConversionError>;
}

/// Sample rate of telephony audio in Hz.
pub const TELEPHONY_SAMPLE_RATE: u32 = 16_000;
/// Channel count of telephony audio.
pub const TELEPHONY_CHANNELS: u16 = 1;

/// Resamples to 16 kHz, downmixes to mono, and encodes s16le PCM WAV.
///
/// The output parameters are fixed: cached telephony artifacts carry no
/// record of them, so every `.wav` entry must share one layout.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    binary: PathBuf,
    timeout: Duration,
    scratch_dir: Option<PathBuf>,
}

impl FfmpegConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            scratch_dir: None,
        }
    }

    /// Places per-conversion scratch directories under `dir` instead of the
    /// system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn scratch(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("parrot-convert-");
        match &self.scratch_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, primary: &[u8]) -> Result<Vec<u8>, ConversionError> {
        // Removed on drop, including every early return below.
        let scratch = self.scratch()?;
        let input = scratch.path().join("input.mp3");
        let output = scratch.path().join("output.wav");

        tokio::fs::write(&input, primary).await?;

        let mut command = Command::new(&self.binary);
        command
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-nostdin")
            .arg("-y")
            .arg("-i")
            .arg(&input)
            .arg("-ar")
            .arg(TELEPHONY_SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg(TELEPHONY_CHANNELS.to_string())
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(ConversionError::Spawn)?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ConversionError::TimedOut(self.timeout.as_secs()))??;

        if !result.status.success() {
            debug!(
                status = %result.status,
                stderr = %String::from_utf8_lossy(&result.stderr).trim(),
                "transcoder diagnostics"
            );
            return Err(ConversionError::Failed(result.status.to_string()));
        }

        match tokio::fs::read(&output).await {
            Ok(wav) if !wav.is_empty() => Ok(wav),
            Ok(_) => Err(ConversionError::MissingOutput),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConversionError::MissingOutput)
            }
            Err(e) => Err(ConversionError::Io(e)),
        }
    }
}
