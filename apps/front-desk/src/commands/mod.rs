//! # Command Handlers
//!
//! Every front desk operation exposed over HTTP.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (router assembly)
//! ├── room.rs         ◄─── Room board, assignment, state changes
//! ├── reservation.rs  ◄─── Booking, confirmation, check-in/out, companions
//! ├── invoice.rs      ◄─── Invoice generation, payment, voiding, display
//! ├── consumption.rs  ◄─── Minibar ledger and product stock
//! ├── guest.rs        ◄─── Guest registry
//! └── config.rs       ◄─── Health and hotel configuration
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Request Flow                                         │
//! │                                                                         │
//! │  Browser                                                                │
//! │  ───────                                                                │
//! │  fetch('/api/rooms/6f1c.../assign', {                                   │
//! │    method: 'POST',                                                      │
//! │    body: JSON.stringify({ reservation_id: 'a9d2...' })                  │
//! │  });                                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn assign_room(                                                  │
//! │      State(state): State<AppState>,  ◄── Database + config             │
//! │      Path(id): Path<String>,         ◄── From the URL                  │
//! │      Json(body): Json<AssignRoom>,   ◄── From the request body         │
//! │  ) -> ApiResult<AssignmentOutcome>                                      │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  { "status": "ok", "message": "Room assigned", "data": {...} }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers hold no business logic: they read the clock, call one
//! repository operation, and wrap the result.

pub mod config;
pub mod consumption;
pub mod guest;
pub mod invoice;
pub mod reservation;
pub mod room;

use axum::Router;

use crate::state::AppState;

/// All API routes, without middleware or state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(config::router())
        .merge(room::router())
        .merge(reservation::router())
        .merge(invoice::router())
        .merge(consumption::router())
        .merge(guest::router())
}
