//! # innkeep-db: Database Layer for the Front Desk
//!
//! This crate provides database access for the hotel front desk.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Front Desk Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /api/reservations/{id}/check-in)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     innkeep-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ RoomRepo       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ReservationRepo│    │ 001_initial  │  │   │
//! │  │   │               │    │ InvoiceRepo    │    │  + triggers  │  │   │
//! │  │   │               │    │ Consumption... │    │              │  │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘  │   │
//! │  │                                │ rules checked inside the tx    │   │
//! │  │                                ▼                                │   │
//! │  │                         innkeep-core                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use innkeep_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("front-desk.db")).await?;
//!
//! let outcome = db.rooms().assign(&room_id, &reservation_id).await?;
//! let state = db.reservations().check_in(&reservation_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::consumption::{ConsumptionRecorded, ConsumptionRepository, NewConsumption};
pub use repository::guest::GuestRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::reservation::{DeleteOutcome, ReservationRepository};
pub use repository::room::{AssignmentOutcome, NewRoom, NewRoomCategory, RoomOverview, RoomRepository};
