//! # Config Commands
//!
//! Health probe and the public part of the configuration.

use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/config", get(get_config))
}

/// What the browser needs to label its screens.
#[derive(Debug, Clone, Serialize)]
pub struct HotelInfo {
    pub hotel_name: String,
    /// VAT applied to invoices, as a percentage.
    pub vat_percentage: f64,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> ApiResult<()> {
    if !state.db.health_check().await {
        return Err(ApiError::internal("Database unavailable"));
    }
    Ok(ApiResponse::ok("healthy", ()))
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> ApiResult<HotelInfo> {
    debug!("get_config command");
    Ok(ApiResponse::ok(
        "Configuration",
        HotelInfo {
            hotel_name: state.config.hotel_name.clone(),
            vat_percentage: innkeep_core::VAT_RATE.percentage(),
        },
    ))
}
