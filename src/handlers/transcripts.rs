//! Transcription index endpoints.
//!
//! ## Available Endpoints:
//! - `GET /` - HTML view of the current transcription index
//! - `POST /upload_transcriptions` - replace the index from an uploaded file
//! - `POST /update_transcription` - edit a single entry, file kept in sync

use crate::error::{AppError, AppResult};
use crate::natsort;
use crate::state::AppState;
use crate::transcript;
use actix_multipart::Multipart;
use actix_web::{http::header::ContentType, web, HttpResponse};
use serde_json::json;

/// Render the current index as a minimal HTML page, natural-ordered by id.
pub async fn index_page(state: web::Data<AppState>) -> HttpResponse {
    let entries = state.transcripts_snapshot();
    let mut ids: Vec<&String> = entries.keys().collect();
    ids.sort_by(|a, b| natsort::natural_cmp(a.as_str(), b.as_str()));

    let mut rows = String::new();
    for id in ids {
        rows.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(id),
            escape_html(&entries[id])
        ));
    }

    let page = format!(
        "<!DOCTYPE html>\n<html>\n  <head><title>Speech Dataset Curator</title></head>\n  <body>\n    <h1>Transcriptions</h1>\n    <table border=\"1\">\n      <tr><th>Audio ID</th><th>Text</th></tr>\n{}    </table>\n  </body>\n</html>\n",
        rows
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}

/// Replace the whole transcription index from an uploaded `.txt` file.
///
/// ## Request:
/// Multipart form data with the index file in a field named "file"
///
/// ## Response:
/// ```json
/// {
///   "status": "success",
///   "message": "Transcriptions uploaded successfully",
///   "transcriptions": {"clip1": "hello there"},
///   "filename": "metadata.txt",
///   "skipped_lines": 0
/// }
/// ```
pub async fn upload_transcriptions(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let limit = state.config.max_upload_bytes();
    let (file, _fields) = super::drain_multipart(&mut payload, "file", limit).await?;

    let file = file.ok_or_else(|| AppError::BadRequest("No file part".to_string()))?;
    if file.filename.is_empty() {
        return Err(AppError::BadRequest("No selected file".to_string()));
    }
    if !super::allowed_file(&file.filename) {
        return Err(AppError::BadRequest("Invalid file type".to_string()));
    }

    let saved_name = super::sanitize_filename(&file.filename);
    if saved_name.is_empty() {
        return Err(AppError::BadRequest("Invalid file name".to_string()));
    }

    let path = state.folder().join(&saved_name);
    std::fs::write(&path, &file.bytes)
        .map_err(|e| AppError::Internal(format!("Failed to save file: {}", e)))?;

    let parsed = transcript::parse_index_file(&path)
        .map_err(|e| AppError::Internal(format!("Error processing file: {}", e)))?;

    tracing::info!(
        file = %saved_name,
        entries = parsed.entries.len(),
        skipped = parsed.skipped,
        "Transcription index replaced"
    );

    state.replace_transcripts(parsed.entries.clone(), &path);

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Transcriptions uploaded successfully",
        "transcriptions": parsed.entries,
        "filename": file.filename,
        "skipped_lines": parsed.skipped,
    })))
}

/// Edit a single transcription.
///
/// ## Request:
/// ```json
/// {"audio_id": "clip1", "text": "corrected text"}
/// ```
///
/// Upserts the in-memory entry; when an index file is known, its matching
/// line is rewritten in place. An id that only exists in memory still
/// succeeds and leaves the file alone.
pub async fn update_transcription(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> AppResult<HttpResponse> {
    let audio_id = body
        .get("audio_id")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing audio_id field".to_string()))?;

    let text = body
        .get("text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::BadRequest("Missing text field".to_string()))?;

    let file_updated = state.update_transcript(audio_id, text)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Transcription for {} updated", audio_id),
        "file_updated": file_updated,
    })))
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::normalize::NoopNormalizer;
    use crate::config::AppConfig;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::path::Path;
    use std::sync::Arc;

    fn test_state(dir: &Path) -> AppState {
        let mut config = AppConfig::default();
        config.storage.folder = dir.to_string_lossy().into_owned();
        AppState::new(config, Arc::new(NoopNormalizer))
    }

    fn multipart_upload(field: &str, filename: &str, contents: &str) -> (String, String) {
        let boundary = "testboundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{contents}\r\n--{b}--\r\n",
            b = boundary,
        );
        (
            format!("multipart/form-data; boundary={}", boundary),
            body,
        )
    }

    #[actix_web::test]
    async fn test_upload_replaces_index_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .route("/upload_transcriptions", web::post().to(upload_transcriptions)),
        )
        .await;

        let (content_type, body) =
            multipart_upload("file", "metadata.txt", "clip1|first\nclip2|second");
        let req = test::TestRequest::post()
            .uri("/upload_transcriptions")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "success");
        assert_eq!(resp["transcriptions"]["clip1"], "first");
        assert_eq!(resp["skipped_lines"], 0);

        // A second upload wipes entries that are absent from the new file.
        let (content_type, body) = multipart_upload("file", "metadata.txt", "clip3|third");
        let req = test::TestRequest::post()
            .uri("/upload_transcriptions")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let snapshot = state.transcripts_snapshot();
        assert!(!snapshot.contains_key("clip1"));
        assert_eq!(snapshot.get("clip3").map(String::as_str), Some("third"));
    }

    #[actix_web::test]
    async fn test_upload_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .route("/upload_transcriptions", web::post().to(upload_transcriptions)),
        )
        .await;

        let (content_type, body) = multipart_upload("file", "metadata.csv", "clip1|text");
        let req = test::TestRequest::post()
            .uri("/upload_transcriptions")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_requires_audio_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .route("/update_transcription", web::post().to(update_transcription)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/update_transcription")
            .set_json(json!({"text": "no id"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_memory_only_id_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .route("/update_transcription", web::post().to(update_transcription)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/update_transcription")
            .set_json(json!({"audio_id": "clip1", "text": "memory only"}))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "success");
        assert_eq!(resp["file_updated"], false);
        assert_eq!(
            state.transcripts_snapshot().get("clip1").map(String::as_str),
            Some("memory only")
        );
    }

    #[actix_web::test]
    async fn test_index_page_renders_entries() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state.update_transcript("clip1", "hello <world>").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/", web::get().to(index_page)),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("clip1"));
        assert!(page.contains("hello &lt;world&gt;"));
    }

    #[::std::prelude::v1::test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
