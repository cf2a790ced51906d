//! In-memory document store
//!
//! Backs tests and local development without PostgreSQL.

use super::models::Document;
use super::store::{DocumentStore, OwnerFilter};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Document store holding everything in a vector, in insertion order
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub async fn insert(&self, document: Document) {
        self.documents.write().await.push(document);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_many(&self, filter: &OwnerFilter) -> Result<Vec<Document>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|doc| doc.id == id)
            .cloned())
    }

    async fn set_expiry_date(&self, id: Uuid, expiry_date: Option<NaiveDate>) -> Result<Document> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| AppError::DocumentNotFound { id: id.to_string() })?;

        document.expiry_date = expiry_date;
        Ok(document.clone())
    }
}
