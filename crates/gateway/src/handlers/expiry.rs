//! Expiry date handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::documents::DocumentResponse;
use crate::AppState;
use lexforge_common::{
    auth::Identity,
    db::OwnerFilter,
    errors::Result,
    expiry::ScanReport,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshExpiryRequest {
    pub document_id: Uuid,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub report: ScanReport,
}

impl ScanResponse {
    fn from_report(report: ScanReport) -> Self {
        let message = report
            .results
            .is_empty()
            .then(|| "No documents found to scan".to_string());

        Self {
            success: true,
            message,
            report,
        }
    }
}

/// Extract and store the expiry date of one document
pub async fn refresh_expiry(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<RefreshExpiryRequest>,
) -> Result<Json<DocumentResponse>> {
    let document = state
        .expiry
        .refresh_document(&state.repo, request.document_id, identity.owner())
        .await?;

    Ok(Json(DocumentResponse::new(document)))
}

/// Scan all of the caller's documents for expiry dates
pub async fn scan_expiry(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ScanResponse>> {
    let filter = OwnerFilter::from_identity(identity.owner());
    let report = state.expiry.scan(&state.repo, &filter).await?;

    Ok(Json(ScanResponse::from_report(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scan_message() {
        let json = serde_json::to_value(ScanResponse::from_report(ScanReport::default())).unwrap();
        assert_eq!(json["message"], "No documents found to scan");
        assert_eq!(json["processed"], 0);
        assert_eq!(json["updated"], 0);
        assert!(json["results"].as_array().unwrap().is_empty());
    }
}
