//! # Innkeep Front Desk Library
//!
//! HTTP JSON API for the hotel front desk. `main.rs` only parses arguments
//! and calls [`run`]; the router is built here so tests can drive it
//! in-process.
//!
//! ## Module Organization
//! ```text
//! innkeep_front_desk/
//! ├── lib.rs          ◄─── You are here (router, logging, server)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (Database + config)
//! │   └── config.rs   ◄─── FrontDeskConfig loading
//! ├── commands/
//! │   ├── mod.rs      ◄─── Route assembly
//! │   ├── room.rs     ◄─── Room board, assignment, state
//! │   ├── reservation.rs
//! │   ├── invoice.rs
//! │   ├── consumption.rs
//! │   ├── guest.rs
//! │   └── config.rs   ◄─── Health, hotel info
//! └── error.rs        ◄─── ApiError / ApiResponse envelopes
//! ```

pub mod commands;
pub mod error;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use innkeep_db::Database;
use state::{AppState, FrontDeskConfig};

/// Builds the application router with middleware and state.
pub fn build_router(state: AppState) -> Router {
    commands::routes()
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the server until it is stopped.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Configuration ───────────────────────────────────────────────────► │
/// │     • defaults → front-desk.toml → INNKEEP_* environment               │
/// │                                                                         │
/// │  2. Connect to Database ─────────────────────────────────────────────► │
/// │     • SQLite with WAL mode and a busy timeout                          │
/// │     • Run pending migrations (schema + guard triggers)                 │
/// │                                                                         │
/// │  3. Build Router ────────────────────────────────────────────────────► │
/// │     • /api/* handlers, TraceLayer                                      │
/// │                                                                         │
/// │  4. Serve ───────────────────────────────────────────────────────────► │
/// │     • until Ctrl-C, then close the pool                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config: FrontDeskConfig) -> anyhow::Result<()> {
    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let db = Database::new(config.db_config()).await?;
    info!(db_path = %config.db_path.display(), "Database connected and migrations applied");

    let addr = config.socket_addr()?;
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Front desk listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Front desk stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // no signal handler available; serve until the process is killed
        std::future::pending::<()>().await;
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=innkeep_db=trace` - Show trace for the database crate only
/// - Default: `info,innkeep=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,innkeep=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use innkeep_db::{DbConfig, NewRoom, NewRoomCategory};

    async fn app() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.clone(), FrontDeskConfig::default());
        (build_router(state), db)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn seed_room(db: &Database, number: &str) -> String {
        let category = db
            .rooms()
            .insert_category(&NewRoomCategory {
                name: format!("Doble {number}"),
                base_price: 100_000,
                description: None,
                view: None,
            })
            .await
            .unwrap();
        db.rooms()
            .insert(&NewRoom {
                number: number.to_string(),
                category_id: category.id,
                additional_price: 20_000,
            })
            .await
            .unwrap()
            .id
    }

    fn booking(check_in: &str, check_out: &str) -> Value {
        json!({
            "first_name": "Ana",
            "last_name": "Restrepo",
            "identification": "1020304050",
            "email": "ana@example.com",
            "phone": "3001234567",
            "check_in": check_in,
            "check_out": check_out,
            "required_rooms": 1,
            "guest_count": 2,
            "payment_method": "credit_card"
        })
    }

    #[tokio::test]
    async fn test_health_and_config() {
        let (app, _db) = app().await;

        let (status, body) = call(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = call(&app, "GET", "/api/config", None).await;
        assert_eq!(body["data"]["vat_percentage"], 19.0);
    }

    #[tokio::test]
    async fn test_unknown_room_is_404() {
        let (app, _db) = app().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/rooms/missing/assign",
            Some(json!({ "reservation_id": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_stay_through_the_api() {
        let (app, db) = app().await;
        let room_id = seed_room(&db, "101").await;
        let check_in = (chrono::Utc::now() + chrono::Duration::days(1)).format("%Y-%m-%dT14:00:00Z");
        let check_out = (chrono::Utc::now() + chrono::Duration::days(3)).format("%Y-%m-%dT12:00:00Z");

        let (status, body) = call(
            &app,
            "POST",
            "/api/reservations",
            Some(booking(&check_in.to_string(), &check_out.to_string())),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let reservation_id = body["data"]["id"].as_str().unwrap().to_string();

        // unconfirmed: check-in is refused
        call(&app, "POST", &format!("/api/rooms/{room_id}/assign"), Some(json!({ "reservation_id": reservation_id }))).await;
        let (status, body) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/check-in"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "PRECONDITION_FAILED");

        let (_, body) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/confirmation"), None).await;
        assert_eq!(body["data"], "confirmed");

        let (status, body) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/check-in"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stay_state"], "active");

        // no paid invoice yet
        let (status, _) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/check-out"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = call(
            &app,
            "POST",
            "/api/guests",
            Some(json!({
                "first_name": "Ana",
                "last_name": "Restrepo",
                "document_type": "CC",
                "document_number": "1020304050"
            })),
        )
        .await;
        let guest_id = body["data"]["id"].as_str().unwrap().to_string();
        call(
            &app,
            "PUT",
            &format!("/api/reservations/{reservation_id}/primary-guest"),
            Some(json!({ "guest_id": guest_id })),
        )
        .await;

        let (status, body) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/invoice"), None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["total"], 285_600);
        let invoice_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/invoice"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        call(&app, "POST", &format!("/api/invoices/{invoice_id}/pay"), None).await;
        let (status, body) = call(&app, "POST", &format!("/api/reservations/{reservation_id}/check-out"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stay_state"], "completed");
    }

    #[tokio::test]
    async fn test_consumption_validation() {
        let (app, _db) = app().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/consumptions",
            Some(json!({ "product_id": "p", "reservation_id": "r", "quantity": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
