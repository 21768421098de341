//! # Consumption Commands
//!
//! The minibar ledger and the product catalog behind it.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use innkeep_core::{Consumption, Product};
use innkeep_db::{ConsumptionRecorded, NewConsumption, NewProduct};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/consumptions", post(record_consumption))
        .route(
            "/api/reservations/{id}/consumptions",
            get(list_consumptions),
        )
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}/restock", post(restock_product))
        .route("/api/products/{id}/active", put(set_product_active))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Restock {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetActive {
    pub active: bool,
}

/// POST /api/consumptions
///
/// With `settle_now` the response carries the receipt and the item never
/// reaches the invoice.
pub async fn record_consumption(
    State(state): State<AppState>,
    Json(body): Json<NewConsumption>,
) -> ApiResult<ConsumptionRecorded> {
    let recorded = state.db.consumptions().record(&body).await?;

    let message = match &recorded.receipt {
        Some(receipt) => format!("Consumption paid, receipt {}", receipt.id),
        None => "Consumption charged to the reservation".to_string(),
    };
    Ok(ApiResponse::ok(message, recorded))
}

/// GET /api/reservations/{id}/consumptions
pub async fn list_consumptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Consumption>> {
    let items = state.db.consumptions().list_for_reservation(&id).await?;
    Ok(ApiResponse::ok(format!("{} consumptions", items.len()), items))
}

/// GET /api/products?limit=N - active products by name.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Product>> {
    let limit = params.limit.unwrap_or(100).clamp(1, 500);
    let products = state.db.products().list_active(limit).await?;
    Ok(ApiResponse::ok(format!("{} products", products.len()), products))
}

/// GET /api/products/{id}
pub async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(ApiResponse::ok("Product", product))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> ApiResult<Product> {
    let product = state.db.products().insert(&body).await?;
    Ok(ApiResponse::ok("Product created", product))
}

/// POST /api/products/{id}/restock - returns the new stock level.
pub async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Restock>,
) -> ApiResult<i64> {
    let stock = state.db.products().restock(&id, body.delta).await?;
    Ok(ApiResponse::ok(format!("{} units in stock", stock), stock))
}

/// PUT /api/products/{id}/active
pub async fn set_product_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetActive>,
) -> ApiResult<()> {
    state.db.products().set_active(&id, body.active).await?;
    let message = if body.active {
        "Product activated"
    } else {
        "Product retired"
    };
    Ok(ApiResponse::ok(message, ()))
}
