//! # Invoice Commands
//!
//! Generate, pay, void, and display invoices.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use chrono::Utc;

use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use innkeep_core::billing::InvoiceView;
use innkeep_core::{Invoice, InvoiceStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reservations/{id}/invoice",
            get(reservation_invoice).post(generate_invoice),
        )
        .route("/api/invoices/{id}", get(view_invoice))
        .route("/api/invoices/{id}/pay", post(mark_paid))
        .route("/api/invoices/{id}/void", post(void_invoice))
}

/// POST /api/reservations/{id}/invoice
pub async fn generate_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Invoice> {
    let invoice = state.db.invoices().generate(&id, Utc::now()).await?;
    Ok(ApiResponse::ok(
        format!("Invoice issued for {}", invoice.total()),
        invoice,
    ))
}

/// GET /api/reservations/{id}/invoice
pub async fn reservation_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Invoice> {
    let invoice = state
        .db
        .invoices()
        .for_reservation(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice for reservation", &id))?;
    Ok(ApiResponse::ok("Invoice", invoice))
}

/// GET /api/invoices/{id} - line items at today's prices, totals as billed.
pub async fn view_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<InvoiceView> {
    let view = state.db.invoices().view(&id).await?;
    Ok(ApiResponse::ok("Invoice", view))
}

/// POST /api/invoices/{id}/pay
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<InvoiceStatus> {
    let status = state.db.invoices().mark_paid(&id).await?;
    Ok(ApiResponse::ok("Invoice paid", status))
}

/// POST /api/invoices/{id}/void
pub async fn void_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<InvoiceStatus> {
    let status = state.db.invoices().void(&id).await?;
    Ok(ApiResponse::ok("Invoice voided", status))
}
