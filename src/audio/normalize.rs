//! Audio normalization through an external transcoder.
//!
//! The transcoder writes to a `_converted.wav` sibling which is renamed over
//! the original on success, so a failed conversion leaves the uploaded clip
//! exactly as it arrived. Not safe to run concurrently for the same filename
//! (both conversions target the same sibling path).

use crate::config::AudioConfig;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Codec adapter seam: the one operation handlers need from a transcoder.
/// Swappable in tests for a no-op.
pub trait AudioNormalizer: Send + Sync {
    /// Re-encode the file at `path` to the canonical format, replacing it in
    /// place. On failure the original file is untouched.
    fn normalize(&self, path: &Path) -> Result<()>;
}

/// Normalizer backed by an `ffmpeg` invocation.
pub struct FfmpegNormalizer {
    binary: String,
    codec: String,
    channels: u16,
    sample_rate: u32,
}

impl FfmpegNormalizer {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            binary: config.ffmpeg_path.clone(),
            codec: config.codec.clone(),
            channels: config.channels,
            sample_rate: config.sample_rate,
        }
    }

    /// Sibling path the transcoder writes to before the rename.
    fn converted_path(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{}_converted.wav", stem))
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-acodec".to_string(),
            self.codec.clone(),
            "-ac".to_string(),
            self.channels.to_string(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

impl AudioNormalizer for FfmpegNormalizer {
    fn normalize(&self, path: &Path) -> Result<()> {
        let converted = Self::converted_path(path);
        let args = self.args(path, &converted);

        tracing::debug!(binary = %self.binary, ?args, "Running transcoder");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to start transcoder '{}'", self.binary))?;

        if !output.status.success() {
            // A partial sibling may exist after a mid-encode failure.
            let _ = std::fs::remove_file(&converted);

            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(anyhow!(
                "Transcoder exited with {}: {}",
                output.status,
                tail.join(" / ")
            ));
        }

        std::fs::rename(&converted, path)
            .with_context(|| format!("Failed to replace {} with converted output", path.display()))?;

        tracing::info!(path = %path.display(), "Audio normalized");
        Ok(())
    }
}

/// Normalizer that accepts every file as-is. Test seam.
#[cfg(test)]
pub struct NoopNormalizer;

#[cfg(test)]
impl AudioNormalizer for NoopNormalizer {
    fn normalize(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
