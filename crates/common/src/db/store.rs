//! Document store abstraction
//!
//! The query pipeline and the expiry scanner only need a narrow view of
//! persistence; this trait is that view. `Repository` implements it over
//! PostgreSQL, `InMemoryDocumentStore` over a vector.

use crate::db::models::{display_size, Document};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Which documents a caller can see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    /// Documents owned by this identity
    Owner(String),
    /// Demo documents with no owner
    Ownerless,
}

impl OwnerFilter {
    /// Anonymous callers see the ownerless demo set
    pub fn from_identity(identity: Option<&str>) -> Self {
        match identity {
            Some(id) => OwnerFilter::Owner(id.to_string()),
            None => OwnerFilter::Ownerless,
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            OwnerFilter::Owner(id) => document.owner_id.as_deref() == Some(id.as_str()),
            OwnerFilter::Ownerless => document.owner_id.is_none(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, OwnerFilter::Ownerless)
    }
}

/// Read access to documents plus the single write the expiry scanner makes
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load every document visible under `filter`, in creation order
    async fn find_many(&self, filter: &OwnerFilter) -> Result<Vec<Document>>;

    /// Find a single document
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>>;

    /// Store (or clear) the extracted expiry date
    async fn set_expiry_date(&self, id: Uuid, expiry_date: Option<NaiveDate>) -> Result<Document>;
}

/// Input for creating a document
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[validate(length(min = 1, max = 500))]
    pub name: String,

    #[validate(length(min = 1, max = 1_000_000))]
    pub content: String,

    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Display size; computed from the content when absent
    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub file_type: Option<String>,
}

fn default_template_id() -> String {
    "blank".to_string()
}

impl NewDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            template_id: default_template_id(),
            size: None,
            file_type: None,
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = template_id.into();
        self
    }

    /// Materialize into a fresh document owned by `owner_id`
    pub fn build(self, owner_id: Option<String>) -> Document {
        let size = self
            .size
            .unwrap_or_else(|| display_size(self.content.len()));

        Document {
            id: Uuid::new_v4(),
            name: self.name,
            content: self.content,
            template_id: self.template_id,
            owner_id,
            size,
            file_type: self.file_type.unwrap_or_else(|| "pdf".to_string()),
            is_favorite: false,
            expiry_date: None,
            is_shared: false,
            share_token: None,
            share_expiry: None,
            downloads: 0,
            last_downloaded: None,
            created_at: chrono::Utc::now().into(),
        }
    }
}

/// Partial update of a document's editable fields
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[validate(length(min = 1, max = 500))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 1_000_000))]
    pub content: Option<String>,

    pub template_id: Option<String>,

    pub is_favorite: Option<bool>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.content.is_none()
            && self.template_id.is_none()
            && self.is_favorite.is_none()
    }

    /// Apply to an in-memory document; mirrors the repository update
    pub fn apply(self, document: &mut Document) {
        if let Some(name) = self.name {
            document.name = name;
        }
        if let Some(content) = self.content {
            document.size = display_size(content.len());
            document.content = content;
        }
        if let Some(template_id) = self.template_id {
            document.template_id = template_id;
        }
        if let Some(is_favorite) = self.is_favorite {
            document.is_favorite = is_favorite;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_filter_matches() {
        let mine = NewDocument::new("Lease", "terms").build(Some("user_1".into()));
        let demo = NewDocument::new("Demo", "terms").build(None);

        let filter = OwnerFilter::from_identity(Some("user_1"));
        assert!(filter.matches(&mine));
        assert!(!filter.matches(&demo));

        let anonymous = OwnerFilter::from_identity(None);
        assert!(anonymous.is_anonymous());
        assert!(anonymous.matches(&demo));
        assert!(!anonymous.matches(&mine));
    }

    #[test]
    fn test_build_defaults() {
        let doc = NewDocument::new("NDA", "x".repeat(2048)).build(None);
        assert_eq!(doc.size, "2.0 KB");
        assert_eq!(doc.file_type, "pdf");
        assert_eq!(doc.template_id, "blank");
        assert!(!doc.is_favorite);
        assert!(!doc.is_shared);
        assert_eq!(doc.downloads, 0);
    }

    #[test]
    fn test_patch_apply() {
        let mut doc = NewDocument::new("Lease", "old").build(None);
        let patch = DocumentPatch {
            is_favorite: Some(true),
            content: Some("new body".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        patch.apply(&mut doc);
        assert!(doc.is_favorite);
        assert_eq!(doc.content, "new body");
        assert_eq!(doc.name, "Lease");
        assert_eq!(doc.size, "8 B");
    }
}
