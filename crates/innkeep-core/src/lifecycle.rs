//! # Stay Lifecycle Guards
//!
//! Preconditions for moving a reservation through its stay states.
//!
//! ## State Machine
//! ```text
//!                 check_in                    check_out
//!   ┌─────────┐  confirmed, ≥1 room  ┌────────┐  invoice paid  ┌───────────┐
//!   │ Pending │ ───────────────────► │ Active │ ─────────────► │ Completed │
//!   └─────────┘                      └────────┘                └───────────┘
//!        rooms → Occupied                  rooms → Cleaning
//!
//!   booking status (orthogonal):  Unconfirmed ⇄ Confirmed   (toggle, any time)
//! ```
//!
//! Every guard runs before the caller writes anything, so a rejection leaves
//! the reservation and its rooms untouched.

use crate::error::{CoreError, CoreResult};
use crate::types::{Invoice, InvoiceStatus, Reservation, StayState};

/// Guards Pending → Active. Returns the new stay state.
pub fn check_in(reservation: &Reservation, assigned_rooms: i64) -> CoreResult<StayState> {
    match reservation.stay_state {
        StayState::Active => return Err(CoreError::AlreadyCheckedIn(reservation.id.clone())),
        StayState::Completed => {
            return Err(CoreError::InvalidStayState {
                reservation_id: reservation.id.clone(),
                state: reservation.stay_state,
            })
        }
        StayState::Pending => {}
    }

    if !reservation.is_confirmed() {
        return Err(CoreError::NotConfirmed(reservation.id.clone()));
    }

    if assigned_rooms < 1 {
        return Err(CoreError::NoRoomsAssigned(reservation.id.clone()));
    }

    Ok(StayState::Active)
}

/// Guards Active → Completed. Returns the new stay state.
///
/// The reservation's invoice must exist and be exactly paid; a voided
/// invoice does not release the guest.
pub fn check_out(reservation: &Reservation, invoice: Option<&Invoice>) -> CoreResult<StayState> {
    match reservation.stay_state {
        StayState::Completed => return Err(CoreError::AlreadyCheckedOut(reservation.id.clone())),
        StayState::Pending => return Err(CoreError::NotCheckedIn(reservation.id.clone())),
        StayState::Active => {}
    }

    let invoice = invoice.ok_or_else(|| CoreError::InvoiceMissing(reservation.id.clone()))?;
    if invoice.status != InvoiceStatus::Paid {
        return Err(CoreError::InvoiceUnpaid {
            invoice_id: invoice.id.clone(),
            status: invoice.status,
        });
    }

    Ok(StayState::Completed)
}

/// Dates and room count can change until the guest has left.
pub fn ensure_editable(reservation: &Reservation) -> CoreResult<()> {
    if reservation.stay_state == StayState::Completed {
        return Err(CoreError::InvalidStayState {
            reservation_id: reservation.id.clone(),
            state: reservation.stay_state,
        });
    }
    Ok(())
}

/// Guards Pending → Paid. Voided invoices may still be paid.
pub fn mark_paid(invoice: &Invoice) -> CoreResult<InvoiceStatus> {
    if invoice.status == InvoiceStatus::Paid {
        return Err(CoreError::InvoiceAlreadyPaid(invoice.id.clone()));
    }
    Ok(InvoiceStatus::Paid)
}

/// Guards Pending → Voided.
pub fn void(invoice: &Invoice) -> CoreResult<InvoiceStatus> {
    if invoice.status != InvoiceStatus::Pending {
        return Err(CoreError::InvoiceNotVoidable {
            invoice_id: invoice.id.clone(),
            status: invoice.status,
        });
    }
    Ok(InvoiceStatus::Voided)
}

// =============================================================================
// Unit Tests
// =============================================================================
