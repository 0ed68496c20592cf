//! # Configuration Management
//!
//! Loads application configuration from multiple sources:
//! - Built-in defaults (the `Default` impl below)
//! - An optional `config.toml` next to the binary
//! - Environment variables with the `APP_` prefix (e.g. `APP_SERVER_PORT`)
//! - Bare `HOST` / `PORT` variables used by deployment platforms
//!
//! Later sources override earlier ones. The loaded configuration is validated
//! once at startup so bad values fail fast instead of surfacing mid-request.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub audio: AudioConfig,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where uploaded files land and how large an upload may be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Folder holding the transcription index and the `.wav` clips.
    /// Created at startup if missing; relocatable at runtime via `/set_folder`.
    pub folder: String,

    /// Upload size cap in MiB. Multipart bodies beyond this are rejected.
    pub max_upload_mb: usize,
}

/// Canonical audio format produced by normalization, plus the transcoder binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Transcoder executable, resolved via PATH unless absolute.
    pub ffmpeg_path: String,

    /// Output codec passed to the transcoder (`-acodec`).
    pub codec: String,

    /// Output channel count (`-ac`).
    pub channels: u16,

    /// Output sample rate in Hz (`-ar`).
    pub sample_rate: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                folder: "wavs".to_string(),
                max_upload_mb: 16,
            },
            audio: AudioConfig {
                ffmpeg_path: "ffmpeg".to_string(),
                codec: "pcm_s16le".to_string(),
                channels: 1,
                sample_rate: 22050,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `config.toml`, and environment
    /// variables, in that priority order.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Deployment platforms commonly inject these without the APP_ prefix.
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.storage.folder.trim().is_empty() {
            return Err(anyhow::anyhow!("Storage folder cannot be empty"));
        }

        if self.storage.max_upload_mb == 0 {
            return Err(anyhow::anyhow!("Upload limit must be greater than 0"));
        }

        if self.audio.channels == 0 {
            return Err(anyhow::anyhow!("Audio channel count must be greater than 0"));
        }

        if self.audio.sample_rate == 0 {
            return Err(anyhow::anyhow!("Audio sample rate must be greater than 0"));
        }

        if self.audio.codec.trim().is_empty() {
            return Err(anyhow::anyhow!("Audio codec cannot be empty"));
        }

        Ok(())
    }

    /// Upload cap in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.storage.max_upload_mb * 1024 * 1024
    }
}
