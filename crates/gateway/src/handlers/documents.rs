//! Document management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use lexforge_common::{
    auth::Identity,
    db::{models::Document, DocumentPatch, NewDocument, OwnerFilter, Repository},
    errors::{AppError, Result},
    metrics,
};

#[derive(Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub document: Document,
}

impl DocumentResponse {
    pub fn new(document: Document) -> Self {
        Self {
            success: true,
            document,
        }
    }
}

#[derive(Serialize)]
pub struct DocumentListResponse {
    pub success: bool,
    pub documents: Vec<Document>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub document: Document,
    pub content: String,
    pub file_name: String,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Load a document the caller may modify
pub async fn load_writable(repo: &Repository, id: Uuid, identity: &Identity) -> Result<Document> {
    let document = repo
        .find_document_by_id(id)
        .await?
        .ok_or_else(|| AppError::DocumentNotFound { id: id.to_string() })?;

    if !document.is_writable_by(identity.owner()) {
        tracing::warn!(
            document_id = %id,
            owner = identity.owner().unwrap_or("anonymous"),
            "Document access denied"
        );
        return Err(AppError::NotOwner { id: id.to_string() });
    }

    Ok(document)
}

/// Create a document owned by the caller
pub async fn create_document(
    State(state): State<AppState>,
    identity: Identity,
    Json(input): Json<NewDocument>,
) -> Result<(StatusCode, Json<DocumentResponse>)> {
    input.validate()?;

    let document = state.repo.create_document(input, identity.0.clone()).await?;
    metrics::record_document_event("created");

    tracing::info!(
        document_id = %document.id,
        owner = identity.owner().unwrap_or("anonymous"),
        template_id = %document.template_id,
        "Document created"
    );

    Ok((StatusCode::CREATED, Json(DocumentResponse::new(document))))
}

/// List the caller's documents, newest first
pub async fn list_documents(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<DocumentListResponse>> {
    let filter = OwnerFilter::from_identity(identity.owner());
    let documents = state.repo.list_documents(&filter).await?;

    Ok(Json(DocumentListResponse {
        success: true,
        documents,
    }))
}

/// Get a document by ID
pub async fn get_document(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>> {
    let document = load_writable(&state.repo, id, &identity).await?;
    Ok(Json(DocumentResponse::new(document)))
}

/// Update name, content, template or favorite flag
pub async fn update_document(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(patch): Json<DocumentPatch>,
) -> Result<Json<DocumentResponse>> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(AppError::Validation {
            message: "No fields to update".to_string(),
            field: None,
        });
    }

    load_writable(&state.repo, id, &identity).await?;
    let document = state.repo.update_document(id, patch).await?;
    metrics::record_document_event("updated");

    tracing::info!(document_id = %id, "Document updated");

    Ok(Json(DocumentResponse::new(document)))
}

/// Return the document text for download and count the download
pub async fn download_document(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadResponse>> {
    load_writable(&state.repo, id, &identity).await?;
    let document = state.repo.record_download(id).await?;
    metrics::record_document_event("downloaded");

    tracing::info!(document_id = %id, downloads = document.downloads, "Document downloaded");

    Ok(Json(DownloadResponse {
        success: true,
        content: document.content.clone(),
        file_name: download_file_name(&document.name),
        document,
    }))
}

/// Delete a document
pub async fn delete_document(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    load_writable(&state.repo, id, &identity).await?;

    if !state.repo.delete_document(id).await? {
        return Err(AppError::DocumentNotFound { id: id.to_string() });
    }
    metrics::record_document_event("deleted");

    tracing::info!(document_id = %id, "Document deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Document deleted successfully".to_string(),
    }))
}

fn download_file_name(name: &str) -> String {
    format!("{}.pdf", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("Lease Agreement"), "Lease Agreement.pdf");
    }
}
