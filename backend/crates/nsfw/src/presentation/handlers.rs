//! HTTP Handlers

use crate::application::audit_query::AuditQueryUseCase;
use crate::application::config::NsfwConfig;
use crate::application::detect_image::{DetectImageInput, DetectImageUseCase};
use crate::domain::classifier::ContentClassifier;
use crate::domain::repository::{AuditLogRepository, RateLimitRepository};
use crate::error::{NsfwError, NsfwResult, round_confidence};
use crate::presentation::dto::{
    AuditLogsQuery, AuditLogsResponse, CheckApprovedResponse, StatsResponse,
};
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use platform::client::{extract_user_id, rate_limit_key};
use std::sync::Arc;

const UPLOAD_FIELD: &str = "file";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared state for gate handlers
#[derive(Clone)]
pub struct NsfwAppState<R>
where
    R: AuditLogRepository + RateLimitRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub classifier: Arc<dyn ContentClassifier>,
    pub config: Arc<NsfwConfig>,
}

/// The `file` part of an upload, fully buffered
#[derive(Debug)]
struct UploadedFile {
    bytes: Vec<u8>,
    file_name: String,
    content_type: String,
}

impl UploadedFile {
    fn is_image(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("image/")
    }
}

/// POST /api/nsfw-check
pub async fn check_image<R>(
    State(state): State<NsfwAppState<R>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> NsfwResult<Json<CheckApprovedResponse>>
where
    R: AuditLogRepository + RateLimitRepository + Clone + Send + Sync + 'static,
{
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Request is not a multipart upload");
        NsfwError::NoImage
    })?;

    let upload = read_upload(multipart).await?.ok_or(NsfwError::NoImage)?;

    if !upload.is_image() {
        return Err(NsfwError::InvalidFileType(upload.content_type));
    }

    let user_id = extract_user_id(&headers);

    if !state.repo.check(rate_limit_key(user_id.as_deref())).await? {
        return Err(NsfwError::RateLimitExceeded {
            retry_after_secs: state.config.retry_after_secs(),
        });
    }

    let use_case = DetectImageUseCase::new(
        state.repo.clone(),
        state.classifier.clone(),
        state.config.clone(),
    );

    let declared_file_size = upload.bytes.len() as u64;
    let result = use_case
        .execute(DetectImageInput {
            buffer: upload.bytes,
            file_name: upload.file_name,
            user_id,
            declared_file_size: Some(declared_file_size),
        })
        .await;

    if result.is_nsfw {
        return Err(NsfwError::ContentRejected {
            category: result.category,
            confidence: result.confidence,
        });
    }

    Ok(Json(CheckApprovedResponse {
        approved: true,
        category: result.category,
        confidence: round_confidence(result.confidence),
    }))
}

/// GET /api/nsfw-check/stats
pub async fn stats<R>(State(state): State<NsfwAppState<R>>) -> NsfwResult<Json<StatsResponse>>
where
    R: AuditLogRepository + RateLimitRepository + Clone + Send + Sync + 'static,
{
    let use_case = AuditQueryUseCase::new(state.repo.clone(), state.config.clone());
    let stats = use_case.stats().await?;

    Ok(Json(StatsResponse {
        stats,
        timestamp: Utc::now(),
    }))
}

/// GET /api/nsfw-check/audit-logs
pub async fn audit_logs<R>(
    State(state): State<NsfwAppState<R>>,
    Query(query): Query<AuditLogsQuery>,
) -> NsfwResult<Json<AuditLogsResponse>>
where
    R: AuditLogRepository + RateLimitRepository + Clone + Send + Sync + 'static,
{
    let use_case = AuditQueryUseCase::new(state.repo.clone(), state.config.clone());
    let logs = use_case.recent(query.limit.as_deref()).await?;

    Ok(Json(AuditLogsResponse {
        count: logs.len(),
        logs,
        timestamp: Utc::now(),
    }))
}

/// Buffer the first `file` field; other fields are skipped
async fn read_upload(mut multipart: Multipart) -> NsfwResult<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(UploadedFile {
            bytes: bytes.to_vec(),
            file_name,
            content_type,
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> NsfwError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        NsfwError::PayloadTooLarge
    } else {
        NsfwError::Multipart(err.body_text())
    }
}
