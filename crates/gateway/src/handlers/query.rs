//! Document query handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use lexforge_common::{auth::Identity, errors::Result, query::AnswerResult};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: AnswerResult,
}

/// Answer a question over the caller's documents
pub async fn query_documents(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let result = state
        .engine
        .answer_query(&request.query, identity.owner())
        .await?;

    Ok(Json(QueryResponse {
        success: true,
        result,
    }))
}
