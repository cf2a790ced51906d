//! Share link handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::documents::{load_writable, DocumentResponse};
use crate::AppState;
use lexforge_common::{
    auth::Identity,
    db::models::Document,
    errors::{AppError, Result},
    metrics, share,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    pub document_id: Uuid,

    /// Link lifetime in days
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareResponse {
    pub success: bool,
    pub share_url: String,
    pub share_token: String,
    pub share_expiry: DateTime<Utc>,
    pub document: Document,
}

#[derive(Debug, Deserialize)]
pub struct SharedDocumentQuery {
    pub token: Option<String>,
}

/// Issue a share link for one of the caller's documents
pub async fn create_share(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateShareRequest>,
) -> Result<Json<CreateShareResponse>> {
    load_writable(&state.repo, request.document_id, &identity).await?;

    let link = state.share_links.issue(request.expires_in, Utc::now())?;
    let document = state
        .repo
        .issue_share(request.document_id, link.token.clone(), link.expires_at)
        .await?;
    metrics::record_document_event("shared");

    tracing::info!(
        document_id = %document.id,
        expires_at = %link.expires_at,
        "Share link issued"
    );

    Ok(Json(CreateShareResponse {
        success: true,
        share_url: link.url,
        share_token: link.token,
        share_expiry: link.expires_at,
        document,
    }))
}

/// Resolve a share token to its document
pub async fn get_shared_document(
    State(state): State<AppState>,
    Query(params): Query<SharedDocumentQuery>,
) -> Result<Json<DocumentResponse>> {
    let token = params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: "token".to_string(),
        })?;

    let document = state
        .repo
        .find_by_share_token(&token)
        .await?
        .ok_or(AppError::ShareNotFound)?;

    share::ensure_share_valid(&document)?;

    Ok(Json(DocumentResponse::new(document)))
}
