//! Storage folder endpoints.
//!
//! ## Available Endpoints:
//! - `GET /list_files_sorted` - allowed filenames in natural order
//! - `GET /list_files` - allowed filenames in directory order (legacy)
//! - `POST /set_folder` - relocate the storage folder

use crate::error::{AppError, AppResult};
use crate::natsort;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::path::Path;

/// Allowed filenames present in the storage folder, natural-sorted so
/// `clip2.wav` lists before `clip10.wav`.
pub async fn list_files_sorted(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut names = allowed_entries(&state.folder())?;
    natsort::natural_sort(&mut names);
    Ok(HttpResponse::Ok().json(names))
}

/// Allowed filenames in whatever order the directory yields them. Kept for
/// front-ends that still sort client-side.
pub async fn list_files(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let names = allowed_entries(&state.folder())?;
    Ok(HttpResponse::Ok().json(names))
}

/// Relocate the storage folder.
///
/// ## Request:
/// ```json
/// {"folder": "/data/session2"}
/// ```
///
/// The folder is created if absent. Files at the old location are not moved
/// and stay reachable only through the old path.
pub async fn set_folder(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> AppResult<HttpResponse> {
    let folder = body
        .get("folder")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing folder field".to_string()))?;

    let path = state
        .relocate_folder(folder)
        .map_err(|e| AppError::Internal(format!("Failed to create folder: {}", e)))?;

    tracing::info!(folder = %path.display(), "Storage folder relocated");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Upload folder set to {}", path.display()),
    })))
}

fn allowed_entries(dir: &Path) -> AppResult<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::Internal(format!("Failed to list storage folder: {}", e)))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| AppError::Internal(format!("Failed to list storage folder: {}", e)))?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if super::allowed_file(&name) {
            names.push(name);
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::normalize::NoopNormalizer;
    use crate::config::AppConfig;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn test_state(dir: &Path) -> AppState {
        let mut config = AppConfig::default();
        config.storage.folder = dir.to_string_lossy().into_owned();
        AppState::new(config, Arc::new(NoopNormalizer))
    }

    #[::std::prelude::v1::test]
    fn test_allowed_entries_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip1.wav"), b"x").unwrap();
        std::fs::write(dir.path().join("metadata.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.pdf"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("subdir.wav")).unwrap();

        let mut names = allowed_entries(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["clip1.wav", "metadata.txt"]);
    }

    #[actix_web::test]
    async fn test_sorted_listing_uses_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["clip10.wav", "clip2.wav", "clip1.wav"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .route("/list_files_sorted", web::get().to(list_files_sorted)),
        )
        .await;

        let req = test::TestRequest::get().uri("/list_files_sorted").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            serde_json::json!(["clip1.wav", "clip2.wav", "clip10.wav"])
        );
    }

    #[actix_web::test]
    async fn test_set_folder_requires_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(dir.path())))
                .route("/set_folder", web::post().to(set_folder)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/set_folder")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_set_folder_creates_and_switches() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let target = dir.path().join("fresh");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .route("/set_folder", web::post().to(set_folder)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/set_folder")
            .set_json(json!({"folder": target.to_string_lossy()}))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "success");
        assert!(target.is_dir());
        assert_eq!(state.folder(), target);
    }
}
