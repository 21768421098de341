//! # Room Commands
//!
//! The room board, assignment of rooms to reservations, and state changes.
//!
//! ## Assignment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/rooms/{id}/assign  { reservation_id }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RoomRepository::assign (one transaction)                               │
//! │       ├── already linked?      → ok, only the state is refreshed       │
//! │       ├── room limit reached?  → 409                                   │
//! │       ├── dates overlap?       → 409 (names the conflicting booking)   │
//! │       ▼                                                                 │
//! │  link + room becomes Occupied                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiResponse, ApiResult};
use crate::state::AppState;
use innkeep_core::RoomState;
use innkeep_db::{AssignmentOutcome, RoomOverview};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/{id}/assign", post(assign_room))
        .route("/api/rooms/{id}/state", put(set_room_state))
}

#[derive(Debug, Deserialize)]
pub struct AssignRoom {
    pub reservation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoomState {
    pub state: RoomState,
}

/// GET /api/rooms - the room board with the current guest of each room.
pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<Vec<RoomOverview>> {
    let rooms = state.db.rooms().overview(Utc::now()).await?;
    Ok(ApiResponse::ok(format!("{} rooms", rooms.len()), rooms))
}

/// POST /api/rooms/{id}/assign
pub async fn assign_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<AssignRoom>,
) -> ApiResult<AssignmentOutcome> {
    let outcome = state.db.rooms().assign(&id, &body.reservation_id).await?;

    let message = match &outcome.reservation {
        Some(summary) => format!("Room assigned to {}", summary.guest_name),
        None => "Room assigned".to_string(),
    };
    info!(room_id = %id, reservation_id = %body.reservation_id, "assign_room command");
    Ok(ApiResponse::ok(message, outcome))
}

/// PUT /api/rooms/{id}/state
///
/// Available and Cleaning release every linked reservation that has not
/// ended yet.
pub async fn set_room_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<SetRoomState>,
) -> ApiResult<AssignmentOutcome> {
    let outcome = state.db.rooms().set_state(&id, body.state, Utc::now()).await?;

    let message = if outcome.released > 0 {
        format!("Room is now {}; {} booking(s) released", outcome.state, outcome.released)
    } else {
        format!("Room is now {}", outcome.state)
    };
    Ok(ApiResponse::ok(message, outcome))
}
