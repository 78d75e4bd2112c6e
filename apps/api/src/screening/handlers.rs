//! Axum route handlers for the Screening API.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::models::ScreeningResult;
use crate::screening::pipeline::ScreeningRequest;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    pub screening_id: Uuid,
    pub screened_at: DateTime<Utc>,
    pub result: ScreeningResult,
}

impl ScreeningResponse {
    fn new(result: ScreeningResult) -> Self {
        Self {
            screening_id: Uuid::new_v4(),
            screened_at: Utc::now(),
            result,
        }
    }
}

/// An uploaded resume: the extension from the client's filename plus the raw bytes.
struct UploadedResume {
    extension: Option<String>,
    data: Vec<u8>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screenings
///
/// Screens a resume against a job description, both given as paths relative to the
/// configured `DOCUMENT_ROOT`. Document problems (missing file, unsupported format) are part
/// of the result, not an HTTP error.
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(request): Json<ScreeningRequest>,
) -> Result<Json<ScreeningResponse>, AppError> {
    let root = state.config.document_root.as_deref().ok_or_else(|| {
        AppError::Validation(
            "Path screening is disabled; upload the documents to /api/v1/screenings/upload"
                .to_string(),
        )
    })?;

    let root = tokio::fs::canonicalize(root)
        .await
        .with_context(|| format!("Document root {} is not accessible", root.display()))?;
    let resume_path = resolve_document_path(&root, &request.resume_path, "resume_path").await?;
    let jd_path = resolve_document_path(&root, &request.jd_path, "jd_path").await?;

    let result = state
        .screener
        .run(ScreeningRequest {
            resume_path,
            jd_path,
        })
        .await;

    Ok(Json(ScreeningResponse::new(result)))
}

/// POST /api/v1/screenings/upload
///
/// Multipart variant: `resume` is a file whose extension selects the parser,
/// `job_description` is either a text field or a file. Uploads live in a temporary
/// directory that is removed once the screening completes.
pub async fn handle_screen_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let mut resume: Option<UploadedResume> = None;
    let mut job_description: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("resume") => {
                let extension = field
                    .file_name()
                    .and_then(|name| Path::new(name).extension())
                    .map(|ext| ext.to_string_lossy().to_lowercase());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume: {e}")))?;
                resume = Some(UploadedResume {
                    extension,
                    data: data.to_vec(),
                });
            }
            Some("job_description") => {
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job_description: {e}"))
                })?;
                job_description = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let resume =
        resume.ok_or_else(|| AppError::Validation("resume field is required".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description field is required".to_string()))?;

    let dir = tempfile::tempdir().context("Failed to create upload directory")?;
    let resume_path = upload_path(dir.path(), "resume", resume.extension.as_deref());
    let jd_path = dir.path().join("job_description.txt");

    tokio::fs::write(&resume_path, &resume.data)
        .await
        .context("Failed to store uploaded resume")?;
    tokio::fs::write(&jd_path, &job_description)
        .await
        .context("Failed to store uploaded job description")?;

    let result = state
        .screener
        .run(ScreeningRequest {
            resume_path,
            jd_path,
        })
        .await;

    Ok(Json(ScreeningResponse::new(result)))
}

/// Confines a requested path to `root`, which must already be canonical. Only plain relative
/// components are accepted. An existing target is canonicalised so a symlink cannot lead out
/// of the root; a missing one is left for the document source to report.
async fn resolve_document_path(
    root: &Path,
    requested: &Path,
    field: &str,
) -> Result<PathBuf, AppError> {
    if requested.as_os_str().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    if !requested
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(AppError::Validation(format!(
            "{field} must be a relative path inside the document root"
        )));
    }

    let joined = root.join(requested);
    match tokio::fs::canonicalize(&joined).await {
        Ok(resolved) if resolved.starts_with(root) => Ok(resolved),
        Ok(_) => Err(AppError::Validation(format!(
            "{field} must be a relative path inside the document root"
        ))),
        Err(_) => Ok(joined),
    }
}

/// Only the extension of a client filename is kept; the stem is fixed.
fn upload_path(dir: &Path, stem: &str, extension: Option<&str>) -> PathBuf {
    match extension {
        Some(ext) if !ext.is_empty() => dir.join(format!("{stem}.{ext}")),
        _ => dir.join(stem),
    }
}
