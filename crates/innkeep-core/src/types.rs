//! # Domain Types
//!
//! Core domain types used throughout the front desk.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐  N:1  ┌──────────────┐                               │
//! │  │     Room     │──────►│ RoomCategory │  base_price                   │
//! │  │ state, +price│       └──────────────┘                               │
//! │  └──────┬───────┘                                                       │
//! │         │ N:M (reservation_rooms)                                       │
//! │  ┌──────▼───────┐  N:1  ┌──────────────┐                               │
//! │  │ Reservation  │──────►│    Guest     │  primary guest (nullable)     │
//! │  │ stay_state   │  N:M  │              │  companions                   │
//! │  │ booking      │──────►│              │                               │
//! │  └──┬───────┬───┘       └──────────────┘                               │
//! │     │ 1:1   │ 1:N                                                       │
//! │  ┌──▼────┐ ┌▼────────────┐ N:1 ┌─────────┐                             │
//! │  │Invoice│ │ Consumption │────►│ Product │  stock                      │
//! │  └───────┘ └─────┬───────┘     └─────────┘                             │
//! │                  │ 0..1                                                 │
//! │              ┌───▼────┐                                                 │
//! │              │Receipt │  only for consumptions settled on the spot     │
//! │              └────────┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All identifiers are UUID v4 strings. All amounts are `i64` in the smallest
//! currency unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stay::{self, StayPeriod};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1900 bps = 19%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// State Enums
// =============================================================================

/// Operational state of a physical room.
///
/// Only the assignment and stay lifecycle operations change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    #[default]
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

impl RoomState {
    /// Setting one of these states by hand releases future bookings.
    pub fn releases_future_bookings(&self) -> bool {
        matches!(self, RoomState::Available | RoomState::Cleaning)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoomState::Available => "Available",
            RoomState::Occupied => "Occupied",
            RoomState::Cleaning => "Cleaning",
            RoomState::Maintenance => "Maintenance",
        };
        f.write_str(label)
    }
}

/// Physical presence of the guest: Pending → Active → Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StayState {
    /// Booked, not yet checked in.
    #[default]
    Pending,
    /// Checked in.
    Active,
    /// Checked out.
    Completed,
}

impl fmt::Display for StayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StayState::Pending => "pending",
            StayState::Active => "active",
            StayState::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Staff confirmation of a booking, independent of the stay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Unconfirmed,
    Confirmed,
}

impl BookingStatus {
    /// The other value; confirmation is a toggle, not a one-way step.
    pub fn toggled(&self) -> Self {
        match self {
            BookingStatus::Unconfirmed => BookingStatus::Confirmed,
            BookingStatus::Confirmed => BookingStatus::Unconfirmed,
        }
    }
}

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Voided,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Voided => "voided",
        };
        f.write_str(label)
    }
}

/// How the guest intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    /// Charged to the guest's company.
    CompanyBilled,
}

// =============================================================================
// Rooms
// =============================================================================

/// A room type with a base nightly price shared by all rooms of that type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RoomCategory {
    pub id: String,
    /// Unique display name ("Doble", "Suite").
    pub name: String,
    pub base_price: i64,
    pub description: Option<String>,
    /// View from the room ("Mar", "Ciudad").
    pub view: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A physical, priced, stateful unit of inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    pub id: String,
    /// Display label ("204").
    pub number: String,
    pub category_id: String,
    /// Added to the category base price.
    pub additional_price: i64,
    pub state: RoomState,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A room joined with its category price, as billed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RoomRate {
    pub room_id: String,
    pub number: String,
    pub category_name: String,
    pub base_price: i64,
    pub additional_price: i64,
}

impl RoomRate {
    /// Category base price plus the room's own delta.
    pub fn nightly(&self) -> CoreResult<Money> {
        Money::new(self.base_price)
            .checked_add(Money::new(self.additional_price))
            .ok_or(CoreError::AmountOverflow("nightly rate"))
    }
}

// =============================================================================
// Guests
// =============================================================================

/// A registered guest.
///
/// `(document_type, document_number)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Guest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// "CC", "CE", "PASSPORT", ...
    pub document_type: String,
    pub document_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// City or country the guest travels from.
    pub origin: Option<String>,
    pub travel_reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for registering a guest.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewGuest {
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub origin: Option<String>,
    pub travel_reason: Option<String>,
}

// =============================================================================
// Reservations
// =============================================================================

/// A guest's booking for a date range.
///
/// Contact and billing fields are a snapshot taken at booking time; they are
/// not linked to the guest registry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Reservation {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub department: Option<String>,
    pub company_name: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub check_in: DateTime<Utc>,
    #[ts(as = "String")]
    pub check_out: DateTime<Utc>,
    /// Rooms requested; `None` or non-positive means one.
    pub required_rooms: Option<i64>,
    pub guest_count: Option<i64>,
    pub payment_method: PaymentMethod,
    pub stay_state: StayState,
    pub booking_status: BookingStatus,
    /// Cleared when the guest record is deleted.
    pub primary_guest_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// The booked stay as a half-open period.
    #[inline]
    pub fn period(&self) -> StayPeriod {
        StayPeriod::from_bounds(self.check_in, self.check_out)
    }

    /// Maximum number of rooms this reservation may hold.
    #[inline]
    pub fn room_limit(&self) -> i64 {
        stay::room_limit(self.required_rooms)
    }

    /// Name from the booking snapshot.
    pub fn booked_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_confirmed(&self) -> bool {
        self.booking_status == BookingStatus::Confirmed
    }
}

/// Input for booking a stay.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReservation {
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub department: Option<String>,
    pub company_name: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub check_in: DateTime<Utc>,
    #[ts(as = "String")]
    pub check_out: DateTime<Utc>,
    pub required_rooms: Option<i64>,
    pub guest_count: Option<i64>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub primary_guest_id: Option<String>,
}

/// Input for changing the dates or room count of a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StayUpdate {
    #[ts(as = "Option<String>")]
    pub check_in: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub check_out: Option<DateTime<Utc>>,
    pub required_rooms: Option<i64>,
}

/// Short description of a reservation linked to a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationSummary {
    pub id: String,
    /// Primary guest's name, or the booking name when no guest is linked.
    pub guest_name: String,
    #[ts(as = "String")]
    pub check_in: DateTime<Utc>,
    #[ts(as = "String")]
    pub check_out: DateTime<Utc>,
}

/// Room requirement of a reservation against what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationDetail {
    pub reservation_id: String,
    pub required_rooms: i64,
    pub assigned_rooms: i64,
}

// =============================================================================
// Invoices
// =============================================================================

/// The frozen, one-per-reservation settlement record.
///
/// Subtotals never change after creation; only `status` advances.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    /// `None` once the reservation has been deleted.
    pub reservation_id: Option<String>,
    pub guest_id: Option<String>,
    /// Billed guest's name at issue time.
    pub billed_to: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub nights: i64,
    pub lodging_subtotal: i64,
    pub consumption_subtotal: i64,
    pub tax: i64,
    pub total: i64,
    pub status: InvoiceStatus,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::new(self.total)
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

// =============================================================================
// Products & Consumptions
// =============================================================================

/// A minibar product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Unique.
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub is_active: bool,
    /// Storage key of the product photo, if any.
    pub photo: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A purchase charged to a reservation.
///
/// Uses the snapshot pattern: name and unit price are frozen at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Consumption {
    pub id: String,
    pub reservation_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    /// Paid on the spot; excluded from invoice aggregation.
    pub settled: bool,
    #[ts(as = "String")]
    pub consumed_at: DateTime<Utc>,
}

impl Consumption {
    /// Unit price snapshot × quantity.
    pub fn line_total(&self) -> CoreResult<Money> {
        Money::new(self.unit_price)
            .checked_mul(self.quantity)
            .ok_or(CoreError::AmountOverflow("consumption line"))
    }
}

/// Proof of payment for a consumption settled immediately.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Receipt {
    pub id: String,
    pub consumption_id: String,
    pub reservation_id: String,
    pub amount: i64,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_toggles() {
        assert_eq!(BookingStatus::Unconfirmed.toggled(), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::Confirmed.toggled(), BookingStatus::Unconfirmed);
    }

    #[test]
    fn test_room_state_release_rule() {
        assert!(RoomState::Available.releases_future_bookings());
        assert!(RoomState::Cleaning.releases_future_bookings());
        assert!(!RoomState::Occupied.releases_future_bookings());
        assert!(!RoomState::Maintenance.releases_future_bookings());
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&RoomState::Maintenance).unwrap(),
            "\"maintenance\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CompanyBilled).unwrap(),
            "\"company_billed\""
        );
    }

    #[test]
    fn test_room_rate_nightly() {
        let rate = RoomRate {
            room_id: "r".into(),
            number: "101".into(),
            category_name: "Doble".into(),
            base_price: 100_000,
            additional_price: 20_000,
        };
        assert_eq!(rate.nightly().unwrap().amount(), 120_000);
    }

    #[test]
    fn test_room_rate_nightly_overflow() {
        let rate = RoomRate {
            room_id: "r".into(),
            number: "101".into(),
            category_name: "Suite".into(),
            base_price: 5_000_000_000_000_000_000,
            additional_price: 5_000_000_000_000_000_000,
        };
        assert!(matches!(rate.nightly(), Err(CoreError::AmountOverflow(_))));
    }
}
