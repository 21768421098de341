//! # innkeep-core: Pure Business Logic for the Front Desk
//!
//! This crate holds the rules of the hotel front desk as pure functions with
//! zero I/O dependencies. The database crate loads rows, calls into these
//! rules while holding its transaction, and writes the result.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Innkeep Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Browser front end (out of tree)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  apps/front-desk (axum handlers)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               innkeep-db (transactions, SQLite)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls rules inside the transaction     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ innkeep-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐      │   │
//! │  │   │   stay    │ │assignment │ │ lifecycle │ │  billing  │      │   │
//! │  │   │ nights,   │ │ limit,    │ │ check-in, │ │ lodging,  │      │   │
//! │  │   │ overlap   │ │ conflicts │ │ check-out │ │ tax, total│      │   │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Room, Reservation, Invoice, Consumption, ...)
//! - [`money`] - Integer money in the smallest currency unit
//! - [`stay`] - Half-open stay periods, night counts, room-count default
//! - [`assignment`] - Room assignment rules (limit, date conflicts)
//! - [`lifecycle`] - Check-in / check-out / confirmation guards
//! - [`billing`] - Invoice totals and display line items
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use innkeep_core::money::Money;
//! use innkeep_core::VAT_RATE;
//!
//! let lodging = Money::new(240_000);
//! let tax = lodging.tax_floor(VAT_RATE).unwrap();
//! assert_eq!(tax.amount(), 45_600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assignment;
pub mod billing;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod stay;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use stay::StayPeriod;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Value-added tax applied to every invoice: 19% (1900 basis points).
///
/// Fixed by law for lodging and minibar sales; not a configuration value.
pub const VAT_RATE: TaxRate = TaxRate::from_bps(1900);

/// Maximum quantity of a single product in one consumption entry.
pub const MAX_CONSUMPTION_QUANTITY: i64 = 999;
