//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling.

use crate::db::models::*;
use crate::db::store::{DocumentPatch, DocumentStore, NewDocument, OwnerFilter};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    UpdateMany,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    fn owner_condition(filter: &OwnerFilter) -> SimpleExpr {
        match filter {
            OwnerFilter::Owner(id) => DocumentColumn::OwnerId.eq(id.clone()),
            OwnerFilter::Ownerless => DocumentColumn::OwnerId.is_null(),
        }
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Document Operations
    // ========================================================================

    /// Create a new document
    pub async fn create_document(
        &self,
        input: NewDocument,
        owner_id: Option<String>,
    ) -> Result<Document> {
        self.insert_document(input.build(owner_id)).await
    }

    /// Insert a fully built document
    pub async fn insert_document(&self, document: Document) -> Result<Document> {
        let active = DocumentActiveModel {
            id: Set(document.id),
            name: Set(document.name),
            content: Set(document.content),
            template_id: Set(document.template_id),
            owner_id: Set(document.owner_id),
            size: Set(document.size),
            file_type: Set(document.file_type),
            is_favorite: Set(document.is_favorite),
            expiry_date: Set(document.expiry_date),
            is_shared: Set(document.is_shared),
            share_token: Set(document.share_token),
            share_expiry: Set(document.share_expiry),
            downloads: Set(document.downloads),
            last_downloaded: Set(document.last_downloaded),
            created_at: Set(document.created_at),
        };

        active.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// List documents visible under `filter`, newest first
    pub async fn list_documents(&self, filter: &OwnerFilter) -> Result<Vec<Document>> {
        DocumentEntity::find()
            .filter(Self::owner_condition(filter))
            .order_by_desc(DocumentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find document by ID
    pub async fn find_document_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        DocumentEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Load a document for modification, failing when it does not exist
    async fn load_for_update(&self, id: Uuid) -> Result<DocumentActiveModel> {
        let document = DocumentEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::DocumentNotFound { id: id.to_string() })?;

        Ok(document.into())
    }

    /// Apply a partial update
    pub async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let mut document = self.load_for_update(id).await?;

        if let Some(name) = patch.name {
            document.name = Set(name);
        }
        if let Some(content) = patch.content {
            document.size = Set(display_size(content.len()));
            document.content = Set(content);
        }
        if let Some(template_id) = patch.template_id {
            document.template_id = Set(template_id);
        }
        if let Some(is_favorite) = patch.is_favorite {
            document.is_favorite = Set(is_favorite);
        }

        document.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Count a download and stamp its time
    pub async fn record_download(&self, id: Uuid) -> Result<Document> {
        let result = Self::download_increment(id, Utc::now())
            .exec(self.write_conn())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::DocumentNotFound { id: id.to_string() });
        }

        DocumentEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::DocumentNotFound { id: id.to_string() })
    }

    /// Increment in SQL so concurrent downloads are all counted
    fn download_increment(id: Uuid, at: DateTime<Utc>) -> UpdateMany<DocumentEntity> {
        DocumentEntity::update_many()
            .col_expr(
                DocumentColumn::Downloads,
                Expr::col(DocumentColumn::Downloads).add(1),
            )
            .col_expr(
                DocumentColumn::LastDownloaded,
                Expr::value(DateTimeWithTimeZone::from(at)),
            )
            .filter(DocumentColumn::Id.eq(id))
    }

    /// Delete document by ID
    pub async fn delete_document(&self, id: Uuid) -> Result<bool> {
        let result = DocumentEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Share Operations
    // ========================================================================

    /// Attach a share token to a document
    pub async fn issue_share(
        &self,
        id: Uuid,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Document> {
        let mut document = self.load_for_update(id).await?;

        document.share_token = Set(Some(token));
        document.share_expiry = Set(Some(expires_at.into()));
        document.is_shared = Set(true);

        document.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Find document by share token
    pub async fn find_by_share_token(&self, token: &str) -> Result<Option<Document>> {
        DocumentEntity::find()
            .filter(DocumentColumn::ShareToken.eq(token))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl DocumentStore for Repository {
    async fn find_many(&self, filter: &OwnerFilter) -> Result<Vec<Document>> {
        DocumentEntity::find()
            .filter(Self::owner_condition(filter))
            .order_by_asc(DocumentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        self.find_document_by_id(id).await
    }

    async fn set_expiry_date(&self, id: Uuid, expiry_date: Option<NaiveDate>) -> Result<Document> {
        let mut document = self.load_for_update(id).await?;
        document.expiry_date = Set(expiry_date);
        document.update(self.write_conn()).await.map_err(Into::into)
    }
}
