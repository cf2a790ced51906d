//! Share links
//!
//! A share link is a random token stored on the document together with an
//! expiry timestamp. Expiry is only checked when the link is followed.

use crate::config::ShareConfig;
use crate::db::models::Document;
use crate::errors::{AppError, Result};
use chrono::{DateTime, Duration, Utc};

/// Random bytes per token (hex-encoded to twice as many characters)
pub const SHARE_TOKEN_BYTES: usize = 20;

/// Longest lifetime a caller may request
pub const MAX_SHARE_DAYS: i64 = 365;

/// A freshly issued link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub token: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues share links
#[derive(Debug, Clone)]
pub struct ShareLinks {
    public_base_url: String,
    default_expiry_days: i64,
}

impl ShareLinks {
    pub fn new(config: &ShareConfig) -> Self {
        Self {
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            default_expiry_days: config.default_expiry_days,
        }
    }

    /// New token valid for `expires_in_days` (or the configured default)
    pub fn issue(&self, expires_in_days: Option<i64>, now: DateTime<Utc>) -> Result<ShareLink> {
        let days = expires_in_days.unwrap_or(self.default_expiry_days);
        if !(1..=MAX_SHARE_DAYS).contains(&days) {
            return Err(AppError::Validation {
                message: format!("expiresIn must be between 1 and {} days", MAX_SHARE_DAYS),
                field: Some("expiresIn".to_string()),
            });
        }

        let token = generate_share_token();
        Ok(ShareLink {
            url: self.url_for(&token),
            token,
            expires_at: now + Duration::days(days),
        })
    }

    pub fn url_for(&self, token: &str) -> String {
        format!("{}/shared/{}", self.public_base_url, token)
    }
}

/// 40 hex characters from a CSPRNG
pub fn generate_share_token() -> String {
    let bytes: [u8; SHARE_TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Gate a document fetched by share token
pub fn ensure_share_valid(document: &Document) -> Result<()> {
    if document.is_share_expired() {
        tracing::info!(document_id = %document.id, "Expired share link followed");
        return Err(AppError::ShareExpired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewDocument;

    fn links() -> ShareLinks {
        ShareLinks::new(&ShareConfig {
            default_expiry_days: 7,
            public_base_url: "https://docs.example.com/".to_string(),
        })
    }

    #[test]
    fn test_token_shape() {
        let token = generate_share_token();
        assert_eq!(token.len(), SHARE_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_share_token());
    }

    #[test]
    fn test_issue_default_expiry() {
        let now = Utc::now();
        let link = links().issue(None, now).unwrap();
        assert_eq!(link.expires_at, now + Duration::days(7));
        assert_eq!(link.url, format!("https://docs.example.com/shared/{}", link.token));
    }

    #[test]
    fn test_issue_rejects_bad_lifetime() {
        let now = Utc::now();
        assert!(matches!(links().issue(Some(0), now), Err(AppError::Validation { .. })));
        assert!(links().issue(Some(MAX_SHARE_DAYS + 1), now).is_err());
        assert!(links().issue(Some(30), now).is_ok());
    }

    #[test]
    fn test_share_expiry_gate() {
        let mut doc = NewDocument::new("NDA", "terms").build(None);
        doc.share_expiry = Some((Utc::now() + Duration::days(1)).into());
        assert!(ensure_share_valid(&doc).is_ok());

        doc.share_expiry = Some((Utc::now() - Duration::seconds(1)).into());
        assert!(matches!(ensure_share_valid(&doc), Err(AppError::ShareExpired)));
    }
}
