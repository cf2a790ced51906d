//! Demo data handler

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use lexforge_common::{
    db::{models::Document, seed::demo_documents, OwnerFilter},
    errors::Result,
};

#[derive(Serialize)]
pub struct SeededDocument {
    pub id: Uuid,
    pub name: String,
}

impl From<&Document> for SeededDocument {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            name: document.name.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub documents: Vec<SeededDocument>,
}

/// Insert the ownerless demo documents unless some already exist
pub async fn seed_documents(State(state): State<AppState>) -> Result<Json<SeedResponse>> {
    let existing = state.repo.list_documents(&OwnerFilter::Ownerless).await?;

    if !existing.is_empty() {
        return Ok(Json(SeedResponse {
            success: true,
            message: format!("{} demo documents already exist", existing.len()),
            documents: existing.iter().map(SeededDocument::from).collect(),
        }));
    }

    let mut created = Vec::new();
    for input in demo_documents() {
        created.push(state.repo.create_document(input, None).await?);
    }

    tracing::info!(count = created.len(), "Demo documents seeded");

    Ok(Json(SeedResponse {
        success: true,
        message: format!("Created {} demo documents", created.len()),
        documents: created.iter().map(SeededDocument::from).collect(),
    }))
}
