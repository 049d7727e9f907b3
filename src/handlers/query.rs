//! Query endpoint handler
//!
//! Handles POST /upload_and_query. The caller always gets HTTP 200 with an
//! `answer`; relay failures are rendered as warning text.

use crate::handlers::AppState;
use crate::middleware::RequestId;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

/// Query request from the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Answer returned to the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}

/// POST /upload_and_query handler
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    tracing::debug!(
        request_id = %request_id,
        query_length = request.query.len(),
        "Received query"
    );

    let answer = match state.relay().ask(&request.query).await {
        Ok(answer) => {
            tracing::info!(
                request_id = %request_id,
                answer_length = answer.len(),
                "Query answered"
            );
            answer
        }
        Err(e) => {
            if e.is_upstream() {
                tracing::error!(request_id = %request_id, error = ?e, "Query relay failed");
            } else {
                tracing::warn!(request_id = %request_id, error = %e, "Query rejected");
            }
            e.warning()
        }
    };

    Json(QueryResponse { answer })
}
