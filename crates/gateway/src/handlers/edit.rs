//! AI editing handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use lexforge_common::{
    editing::TIMEOUT_MESSAGE,
    errors::{AppError, ErrorCode, ErrorDetails, ErrorResponse},
};

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub success: bool,
    pub edited_content: String,
}

/// Apply an editing instruction (or draft a template) with the generator
pub async fn edit_document(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> Response {
    match state.editor.edit(&request.content, &request.prompt).await {
        Ok(edited_content) => Json(EditResponse {
            success: true,
            edited_content,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Timeouts get a message the caller can act on
fn error_response(error: AppError) -> Response {
    match error {
        AppError::GenerationTimeout { timeout_ms } => {
            tracing::warn!(timeout_ms, "Edit generation timed out");
            let body = ErrorResponse {
                success: false,
                error: ErrorDetails {
                    code: ErrorCode::GenerationTimeout,
                    message: TIMEOUT_MESSAGE.to_string(),
                    details: None,
                },
            };
            (StatusCode::GATEWAY_TIMEOUT, Json(body)).into_response()
        }
        other => other.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_friendly_504() {
        let response = error_response(AppError::GenerationTimeout { timeout_ms: 8000 });
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_generation_error_is_502() {
        let response = error_response(AppError::GenerationError {
            message: "quota".into(),
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
