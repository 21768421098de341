//! # Guest Commands

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use innkeep_core::{Guest, NewGuest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/guests", post(register_guest))
        .route("/api/guests/lookup", get(find_guest))
        .route("/api/guests/{id}", get(get_guest).delete(delete_guest))
}

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub document_type: String,
    pub document_number: String,
}

/// POST /api/guests
pub async fn register_guest(
    State(state): State<AppState>,
    Json(body): Json<NewGuest>,
) -> ApiResult<Guest> {
    let guest = state.db.guests().register(&body).await?;
    Ok(ApiResponse::ok("Guest registered", guest))
}

/// GET /api/guests/{id}
pub async fn get_guest(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Guest> {
    let guest = state
        .db
        .guests()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Guest", &id))?;
    Ok(ApiResponse::ok("Guest", guest))
}

/// GET /api/guests/lookup?document_type=CC&document_number=...
pub async fn find_guest(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Guest> {
    let guest = state
        .db
        .guests()
        .find_by_document(&query.document_type, &query.document_number)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "Guest",
                &format!("{} {}", query.document_type, query.document_number),
            )
        })?;
    Ok(ApiResponse::ok("Guest", guest))
}

/// DELETE /api/guests/{id}
pub async fn delete_guest(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.db.guests().delete(&id).await?;
    Ok(ApiResponse::ok("Guest deleted", ()))
}
