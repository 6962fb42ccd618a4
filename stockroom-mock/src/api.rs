use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use shared::{
    ApiResponse, AppError, AppResult, CreditNoteRecord, ErrorCode, LineItemRecord, ReturnRequest,
    SubmitReturnResponse,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Unknown transactions yield an empty list, not an error
async fn transaction_line_items(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> ApiResponse<Vec<LineItemRecord>> {
    let items = state.store.line_items(&transaction_id);
    tracing::debug!(transaction_id = %transaction_id, count = items.len(), "Line items listed");
    ApiResponse::success(items)
}

async fn submit_return(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<ApiResponse<SubmitReturnResponse>> {
    let credit_note_id = state.store.record_return(&request).inspect_err(|e| {
        tracing::warn!(
            transaction_id = %request.transaction_id,
            code = %e.code,
            message = %e.message,
            "Return rejected"
        );
    })?;
    Ok(ApiResponse::success(SubmitReturnResponse { credit_note_id }))
}

async fn credit_note(
    State(state): State<Arc<AppState>>,
    Path(credit_note_id): Path<String>,
) -> AppResult<ApiResponse<CreditNoteRecord>> {
    let record = state.store.credit_note(&credit_note_id).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CreditNoteNotFound,
            format!("Credit note {} not found", credit_note_id),
        )
    })?;
    Ok(ApiResponse::success(record))
}

/// Build the backend router with state, tracing and CORS attached
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/transactions/{transaction_id}/line-items",
            get(transaction_line_items),
        )
        .route("/api/returns", post(submit_return))
        .route("/api/credit-notes/{credit_note_id}", get(credit_note))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
