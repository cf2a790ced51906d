//! Document entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    /// Full document text; the unit of retrieval for queries
    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text")]
    pub template_id: String,

    /// Identity of the owner; `None` marks a demo document
    #[sea_orm(column_type = "Text", nullable)]
    pub owner_id: Option<String>,

    /// Human readable size, e.g. "1.2 KB"
    #[sea_orm(column_type = "Text")]
    pub size: String,

    #[sea_orm(column_type = "Text")]
    pub file_type: String,

    pub is_favorite: bool,

    /// Populated by the expiry scanner
    pub expiry_date: Option<Date>,

    pub is_shared: bool,

    #[sea_orm(column_type = "Text", nullable, unique)]
    pub share_token: Option<String>,

    pub share_expiry: Option<DateTimeWithTimeZone>,

    pub downloads: i32,

    pub last_downloaded: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Text searched by the query pipeline
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.content).to_lowercase()
    }

    /// Whether a share link was issued and has since lapsed
    pub fn is_share_expired(&self) -> bool {
        match self.share_expiry {
            Some(expiry) => chrono::Utc::now() > expiry,
            None => false,
        }
    }

    /// Whether `identity` may modify this document.
    ///
    /// Ownerless demo documents are open to everyone.
    pub fn is_writable_by(&self, identity: Option<&str>) -> bool {
        match self.owner_id.as_deref() {
            None => true,
            Some(owner) => identity == Some(owner),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Format a byte length the way document sizes are displayed
pub fn display_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_size() {
        assert_eq!(display_size(512), "512 B");
        assert_eq!(display_size(1229), "1.2 KB");
        assert_eq!(display_size(3 * 1024 * 1024), "3.0 MB");
    }
}
