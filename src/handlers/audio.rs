//! Audio clip endpoints.
//!
//! ## Available Endpoints:
//! - `POST /record` - save an uploaded/recorded clip and normalize it
//! - `GET /wavs/{filename}` - serve a stored clip's raw bytes
//! - `GET /file_info/{filename}` - stat plus WAV header metadata

use crate::audio::info;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Save a recorded or uploaded clip as `<audio_id>.wav` and normalize it to
/// the canonical format.
///
/// ## Request:
/// Multipart form data with the clip in a field named "audio" and a text
/// field "audio_id".
///
/// The clip is written first and normalized in place afterwards; a failed
/// normalization reports a 500 and leaves the un-normalized upload on disk.
pub async fn record(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let limit = state.config.max_upload_bytes();
    let (file, fields) = super::drain_multipart(&mut payload, "audio", limit).await?;

    let audio = file.ok_or_else(|| AppError::BadRequest("No audio file provided".to_string()))?;

    let audio_id = fields
        .get("audio_id")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("No audio ID provided".to_string()))?;

    if audio.filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }
    if !super::allowed_file(&audio.filename) {
        return Err(AppError::BadRequest("Invalid file type".to_string()));
    }

    let safe_id = super::sanitize_filename(audio_id);
    if safe_id.is_empty() {
        return Err(AppError::BadRequest("Invalid audio ID".to_string()));
    }

    let path = state.folder().join(format!("{}.wav", safe_id));
    std::fs::write(&path, &audio.bytes)
        .map_err(|e| AppError::Internal(format!("Failed to save audio: {}", e)))?;

    state
        .normalizer
        .normalize(&path)
        .map_err(|e| AppError::Internal(format!("Error processing audio: {}", e)))?;

    tracing::info!(audio_id = %safe_id, bytes = audio.bytes.len(), "Clip saved and normalized");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Audio {} saved and converted successfully", audio_id),
    })))
}

/// Serve a stored clip's raw bytes.
pub async fn serve_audio(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> AppResult<NamedFile> {
    let name = super::sanitize_filename(&filename);
    if name.is_empty() {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    NamedFile::open(state.folder().join(name))
        .map_err(|_| AppError::NotFound("File not found".to_string()))
}

/// File metadata: size and timestamps for every file, WAV header parameters
/// (channels, sample width, frame rate, frames, duration) for `.wav` files.
pub async fn file_info(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = super::sanitize_filename(&filename);
    if name.is_empty() {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let info = info::gather(&state.folder(), &name)?;
    Ok(HttpResponse::Ok().json(info))
}
