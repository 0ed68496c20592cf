//! # Application State Management
//!
//! Shared state handed to every HTTP request handler via `web::Data`.
//!
//! All curator state that the Flask-era tool kept in module globals — the
//! storage folder, the in-memory transcription index, and the path of the
//! last-uploaded index file — lives here behind a single `RwLock`, so every
//! mutating operation is a serialized read-modify-write. The on-disk index
//! file is the source of truth; the map is a cache kept in sync by
//! [`AppState::replace_transcripts`] and [`AppState::update_transcript`].
//!
//! Request metrics sit behind their own lock and are updated by the metrics
//! middleware on every request.

use crate::audio::normalize::AudioNormalizer;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::transcript::store;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Mutable curator state: one lock covers the folder, the index map, and the
/// remembered index-file path, so concurrent edits cannot interleave.
#[derive(Debug)]
pub struct StorageState {
    /// Folder holding the index file and the `.wav` clips.
    pub folder: PathBuf,

    /// In-memory transcription index, `audio_id` → text.
    pub index: HashMap<String, String>,

    /// Where the last-uploaded index file was saved, if any. Single-entry
    /// edits rewrite this file in place.
    pub index_file: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<RwLock<StorageState>>,
    pub metrics: Arc<RwLock<AppMetrics>>,
    pub normalizer: Arc<dyn AudioNormalizer>,
    pub start_time: Instant,
}

/// Request metrics collected across all endpoints.
#[derive(Debug, Default)]
pub struct AppMetrics {
    pub request_count: u64,
    pub error_count: u64,
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    pub fn new(config: AppConfig, normalizer: Arc<dyn AudioNormalizer>) -> Self {
        let folder = PathBuf::from(&config.storage.folder);
        Self {
            config,
            storage: Arc::new(RwLock::new(StorageState {
                folder,
                index: HashMap::new(),
                index_file: None,
            })),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            normalizer,
            start_time: Instant::now(),
        }
    }

    /// Current storage folder.
    pub fn folder(&self) -> PathBuf {
        self.storage.read().unwrap().folder.clone()
    }

    /// Point the process at a new storage folder, creating it if absent.
    /// Existing files are not moved.
    pub fn relocate_folder(&self, raw: &str) -> std::io::Result<PathBuf> {
        let path = PathBuf::from(raw);
        std::fs::create_dir_all(&path)?;
        let mut storage = self.storage.write().unwrap();
        storage.folder = path.clone();
        Ok(path)
    }

    /// Copy of the current in-memory index.
    pub fn transcripts_snapshot(&self) -> HashMap<String, String> {
        self.storage.read().unwrap().index.clone()
    }

    /// Replace the whole index with the entries parsed from a freshly
    /// uploaded file, and remember where that file lives.
    pub fn replace_transcripts(&self, entries: HashMap<String, String>, source: &Path) {
        let mut storage = self.storage.write().unwrap();
        storage.index = entries;
        storage.index_file = Some(source.to_path_buf());
    }

    /// Upsert a single transcription, keeping the on-disk index file in sync.
    ///
    /// The write lock is held across the file rewrite so two concurrent edits
    /// cannot interleave their read-rewrite of the same file. Returns whether
    /// a line in the file was actually replaced; an id that only exists in
    /// memory still succeeds and leaves the file untouched.
    pub fn update_transcript(&self, audio_id: &str, text: &str) -> AppResult<bool> {
        let mut storage = self.storage.write().unwrap();
        storage
            .index
            .insert(audio_id.to_string(), text.to_string());

        let rewritten = match &storage.index_file {
            Some(path) if path.exists() => store::rewrite_entry(path, audio_id, text)?,
            _ => false,
        };

        Ok(rewritten)
    }

    /// Path of the last-uploaded index file, if any.
    pub fn index_file(&self) -> Option<PathBuf> {
        self.storage.read().unwrap().index_file.clone()
    }

    pub fn increment_request_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.request_count += 1;
    }

    pub fn increment_error_count(&self) {
        let mut metrics = self.metrics.write().unwrap();
        metrics.error_count += 1;
    }

    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write().unwrap();

        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();
        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;

        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        let metrics = self.metrics.read().unwrap();
        AppMetrics {
            request_count: metrics.request_count,
            error_count: metrics.error_count,
            endpoint_metrics: metrics.endpoint_metrics.clone(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
