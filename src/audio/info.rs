//! File metadata for the `/file_info/{filename}` endpoint.
//!
//! Plain files report stat data only; `.wav` files additionally report the
//! header parameters the curation front-end shows next to each clip.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Metadata payload. The WAV fields are absent for non-`.wav` files.
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub size: u64,
    /// Creation time as epoch seconds; falls back to the modification time on
    /// filesystems without birth times.
    pub created: f64,
    pub modified: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    /// Bytes per sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framerate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_frames: Option<u32>,
    /// `n_frames / framerate`, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Stat `filename` inside `dir` and, for WAV files, read the header.
pub fn gather(dir: &Path, filename: &str) -> AppResult<FileInfo> {
    let path = dir.join(filename);
    if !path.exists() {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let metadata = std::fs::metadata(&path)?;
    let modified = metadata.modified().map(epoch_seconds).unwrap_or(0.0);
    let created = metadata
        .created()
        .map(epoch_seconds)
        .unwrap_or(modified);

    let mut info = FileInfo {
        filename: filename.to_string(),
        size: metadata.len(),
        created,
        modified,
        channels: None,
        sample_width: None,
        framerate: None,
        n_frames: None,
        duration: None,
    };

    if filename.to_ascii_lowercase().ends_with(".wav") {
        let reader = hound::WavReader::open(&path)
            .map_err(|e| AppError::Internal(format!("Failed to read WAV header: {}", e)))?;
        let spec = reader.spec();
        let frames = reader.duration();

        info.channels = Some(spec.channels);
        info.sample_width = Some(spec.bits_per_sample / 8);
        info.framerate = Some(spec.sample_rate);
        info.n_frames = Some(frames);
        info.duration = Some(frames as f64 / spec.sample_rate as f64);
    }

    Ok(info)
}

fn epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, frames: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_info_reports_header_parameters() {
        let dir = tempfile::tempdir().unwrap();
        write_test_wav(&dir.path().join("clip1.wav"), 2205);

        let info = gather(dir.path(), "clip1.wav").unwrap();
        assert_eq!(info.channels, Some(1));
        assert_eq!(info.sample_width, Some(2));
        assert_eq!(info.framerate, Some(22050));
        assert_eq!(info.n_frames, Some(2205));
        assert_eq!(info.duration, Some(2205.0 / 22050.0));
        assert!(info.size > 0);
    }

    #[test]
    fn test_plain_file_has_no_wav_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("metadata.txt"), "clip1|text\n").unwrap();

        let info = gather(dir.path(), "metadata.txt").unwrap();
        assert!(info.channels.is_none());
        assert!(info.duration.is_none());
        assert_eq!(info.size, 11);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = gather(dir.path(), "nope.wav").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
