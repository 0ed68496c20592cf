//! # HTTP Request Handlers
//!
//! One module per endpoint group, plus the upload helpers they share:
//! - **transcripts**: index page, transcription-file upload, single edits
//! - **audio**: clip recording/normalization, raw serving, file metadata
//! - **files**: directory listings and storage-folder relocation

pub mod audio;
pub mod files;
pub mod transcripts;

pub use audio::*;
pub use files::*;
pub use transcripts::*;

use crate::error::{AppError, AppResult};
use actix_multipart::Multipart;
use futures_util::stream::StreamExt;
use std::collections::HashMap;

/// Extensions accepted for uploads and listings.
pub(crate) const ALLOWED_EXTENSIONS: [&str; 2] = ["txt", "wav"];

/// A file part drained from a multipart payload. `filename` is the raw
/// client-provided name, empty when the part carried none.
pub(crate) struct UploadPart {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Extension check: the substring after the last `.`, case-insensitively.
/// Names without a dot are rejected.
pub(crate) fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a client-supplied name to a safe basename: directory components
/// stripped, anything outside `[A-Za-z0-9._-]` replaced by `_`, leading dots
/// removed. May return an empty string, which callers must reject.
pub(crate) fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Drain a multipart payload: capture the file part named `file_field`, and
/// collect every other part as a UTF-8 text field. The accumulated body size
/// is checked against `limit` while reading, rejecting oversized uploads
/// before they are buffered whole.
pub(crate) async fn drain_multipart(
    payload: &mut Multipart,
    file_field: &str,
    limit: usize,
) -> AppResult<(Option<UploadPart>, HashMap<String, String>)> {
    let mut file: Option<UploadPart> = None;
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut total: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let (field_name, filename) = {
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| AppError::BadRequest("Missing content disposition".to_string()))?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| AppError::BadRequest("Missing field name".to_string()))?
                .to_string();
            let filename = content_disposition.get_filename().map(|s| s.to_string());
            (name, filename)
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
            total += chunk.len();
            if total > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "Upload exceeds the {} MiB limit",
                    limit / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if field_name == file_field {
            file = Some(UploadPart {
                filename: filename.unwrap_or_default(),
                bytes,
            });
        } else {
            let value = String::from_utf8(bytes).map_err(|_| {
                AppError::BadRequest(format!("Field '{}' is not valid UTF-8", field_name))
            })?;
            fields.insert(field_name, value);
        }
    }

    Ok((file, fields))
}
