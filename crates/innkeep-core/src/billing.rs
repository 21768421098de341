//! # Billing
//!
//! Invoice arithmetic and the invoice display model.
//!
//! ## Invoice Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  nights        = max(1, check_out.date − check_in.date)                 │
//! │  lodging       = nights × Σ rooms (category.base + room.additional)     │
//! │  consumptions  = Σ unsettled (unit_price snapshot × quantity)           │
//! │  pre_tax       = lodging + consumptions                                 │
//! │  tax           = floor(pre_tax × 19%)                                   │
//! │  total         = pre_tax + tax                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The totals are frozen into the invoice row once. [`InvoiceView`] later
//! rebuilds line items from current room prices and consumption rows and
//! pairs them with those frozen totals; when prices change after invoicing
//! the line items no longer add up to the stored total. The stored total is
//! the legal record and is never recomputed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stay::StayPeriod;
use crate::types::{Consumption, Invoice, Reservation, RoomRate};
use crate::VAT_RATE;

// =============================================================================
// Totals
// =============================================================================

/// Amounts frozen into a new invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub nights: i64,
    pub lodging_subtotal: Money,
    pub consumption_subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Computes the totals for a stay. Settled consumptions are skipped.
    ///
    /// Fails with [`CoreError::AmountOverflow`] instead of wrapping when
    /// prices are too large for the integer money range.
    pub fn compute(
        period: &StayPeriod,
        rooms: &[RoomRate],
        consumptions: &[Consumption],
    ) -> CoreResult<Self> {
        let nights = period.nights();
        let nightly = checked_total(rooms.iter().map(RoomRate::nightly), "nightly rate")?;
        let lodging_subtotal = nightly
            .checked_mul(nights)
            .ok_or(CoreError::AmountOverflow("lodging subtotal"))?;

        let consumption_subtotal = checked_total(
            consumptions
                .iter()
                .filter(|c| !c.settled)
                .map(Consumption::line_total),
            "consumption subtotal",
        )?;

        let pre_tax = lodging_subtotal
            .checked_add(consumption_subtotal)
            .ok_or(CoreError::AmountOverflow("pre-tax total"))?;
        let tax = pre_tax
            .tax_floor(VAT_RATE)
            .ok_or(CoreError::AmountOverflow("tax"))?;
        let total = pre_tax
            .checked_add(tax)
            .ok_or(CoreError::AmountOverflow("invoice total"))?;

        Ok(InvoiceTotals {
            nights,
            lodging_subtotal,
            consumption_subtotal,
            tax,
            total,
        })
    }
}

fn checked_total(
    amounts: impl Iterator<Item = CoreResult<Money>>,
    what: &'static str,
) -> CoreResult<Money> {
    let amounts = amounts.collect::<CoreResult<Vec<_>>>()?;
    Money::checked_sum(amounts).ok_or(CoreError::AmountOverflow(what))
}

/// Preconditions for issuing an invoice. Returns the guest to bill.
///
/// Order: duplicate invoice, then rooms, then primary guest.
pub fn ensure_can_invoice<'a>(
    reservation: &'a Reservation,
    existing: Option<&Invoice>,
    assigned_rooms: usize,
) -> CoreResult<&'a str> {
    if let Some(invoice) = existing {
        return Err(CoreError::InvoiceAlreadyExists {
            reservation_id: reservation.id.clone(),
            invoice_id: invoice.id.clone(),
        });
    }
    if assigned_rooms == 0 {
        return Err(CoreError::NoRoomsAssigned(reservation.id.clone()));
    }
    reservation
        .primary_guest_id
        .as_deref()
        .ok_or_else(|| CoreError::NoPrimaryGuest(reservation.id.clone()))
}

// =============================================================================
// Display Model
// =============================================================================

/// One room line: current nightly price × invoiced nights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomLine {
    pub room_number: String,
    pub category: String,
    pub nightly: Money,
    pub nights: i64,
    pub amount: Money,
}

/// One consumption line: price snapshot × quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsumptionLine {
    pub product: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
}

/// An invoice with live line items next to its frozen totals.
///
/// Callers pass only the consumptions that were billed (not settled).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub rooms: Vec<RoomLine>,
    pub consumptions: Vec<ConsumptionLine>,
}

impl InvoiceView {
    pub fn build(
        invoice: Invoice,
        rooms: &[RoomRate],
        consumptions: &[Consumption],
    ) -> CoreResult<Self> {
        let nights = invoice.nights;
        let rooms = rooms
            .iter()
            .map(|rate| {
                let nightly = rate.nightly()?;
                Ok(RoomLine {
                    room_number: rate.number.clone(),
                    category: rate.category_name.clone(),
                    nightly,
                    nights,
                    amount: nightly
                        .checked_mul(nights)
                        .ok_or(CoreError::AmountOverflow("room line"))?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let consumptions = consumptions
            .iter()
            .map(|c| {
                Ok(ConsumptionLine {
                    product: c.product_name.clone(),
                    quantity: c.quantity,
                    unit_price: Money::new(c.unit_price),
                    amount: c.line_total()?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(InvoiceView {
            invoice,
            rooms,
            consumptions,
        })
    }

    /// Sum of the live room lines; may differ from the frozen subtotal.
    pub fn live_lodging(&self) -> CoreResult<Money> {
        Money::checked_sum(self.rooms.iter().map(|line| line.amount))
            .ok_or(CoreError::AmountOverflow("room lines"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::{invoice, reservation};
    use crate::types::{BookingStatus, InvoiceStatus, StayState};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn rate(number: &str, base: i64, extra: i64) -> RoomRate {
        RoomRate {
            room_id: format!("room-{number}"),
            number: number.to_string(),
            category_name: "Doble".to_string(),
            base_price: base,
            additional_price: extra,
        }
    }

    fn consumption(qty: i64, price: i64, settled: bool) -> Consumption {
        Consumption {
            id: "c".to_string(),
            reservation_id: "r-1".to_string(),
            product_id: "p".to_string(),
            product_name: "Agua".to_string(),
            quantity: qty,
            unit_price: price,
            settled,
            consumed_at: at(2, 20),
        }
    }

    #[test]
    fn test_two_night_single_room() {
        let period = StayPeriod::new(at(1, 14), at(3, 12)).unwrap();
        let totals =
            InvoiceTotals::compute(&period, &[rate("101", 100_000, 20_000)], &[]).unwrap();

        assert_eq!(totals.nights, 2);
        assert_eq!(totals.lodging_subtotal.amount(), 240_000);
        assert_eq!(totals.consumption_subtotal.amount(), 0);
        assert_eq!(totals.tax.amount(), 45_600);
        assert_eq!(totals.total.amount(), 285_600);
    }

    #[test]
    fn test_same_day_bills_one_night() {
        let period = StayPeriod::new(at(5, 9), at(5, 18)).unwrap();
        let totals = InvoiceTotals::compute(&period, &[rate("101", 80_000, 0)], &[]).unwrap();
        assert_eq!(totals.nights, 1);
        assert_eq!(totals.lodging_subtotal.amount(), 80_000);
    }

    #[test]
    fn test_settled_consumptions_excluded() {
        let period = StayPeriod::new(at(1, 14), at(2, 12)).unwrap();
        let totals = InvoiceTotals::compute(
            &period,
            &[rate("101", 100_000, 0)],
            &[consumption(2, 3_500, false), consumption(1, 9_000, true)],
        )
        .unwrap();
        assert_eq!(totals.consumption_subtotal.amount(), 7_000);
        // floor(107000 × 0.19) = 20330
        assert_eq!(totals.tax.amount(), 20_330);
        assert_eq!(totals.total.amount(), 127_330);
    }

    #[test]
    fn test_multiple_rooms_summed_per_night() {
        let period = StayPeriod::new(at(1, 14), at(4, 12)).unwrap();
        let totals = InvoiceTotals::compute(
            &period,
            &[rate("101", 100_000, 0), rate("102", 100_000, 15_000)],
            &[],
        )
        .unwrap();
        assert_eq!(totals.lodging_subtotal.amount(), 3 * 215_000);
    }

    #[test]
    fn test_invoice_preconditions() {
        let r = reservation(StayState::Active, BookingStatus::Confirmed);
        assert_eq!(ensure_can_invoice(&r, None, 1).unwrap(), "g-1");

        let existing = invoice(InvoiceStatus::Voided);
        assert!(matches!(
            ensure_can_invoice(&r, Some(&existing), 1),
            Err(CoreError::InvoiceAlreadyExists { .. })
        ));
        assert!(matches!(
            ensure_can_invoice(&r, None, 0),
            Err(CoreError::NoRoomsAssigned(_))
        ));

        let mut orphan = r.clone();
        orphan.primary_guest_id = None;
        assert!(matches!(
            ensure_can_invoice(&orphan, None, 1),
            Err(CoreError::NoPrimaryGuest(_))
        ));
    }

    #[test]
    fn test_view_uses_live_prices_with_frozen_totals() {
        // invoice froze 240000 lodging; room price rose afterwards
        let view = InvoiceView::build(
            invoice(InvoiceStatus::Pending),
            &[rate("101", 110_000, 20_000)],
            &[consumption(1, 4_000, false)],
        )
        .unwrap();
        assert_eq!(view.rooms[0].amount.amount(), 260_000);
        assert_eq!(view.live_lodging().unwrap().amount(), 260_000);
        assert_eq!(view.invoice.lodging_subtotal, 240_000);
        assert_eq!(view.invoice.total, 285_600);
        assert_eq!(view.consumptions[0].amount.amount(), 4_000);
    }

    #[test]
    fn test_huge_prices_are_rejected_not_wrapped() {
        let period = StayPeriod::new(at(1, 14), at(3, 12)).unwrap();

        // each price is valid on its own, the nightly sum is not
        let err = InvoiceTotals::compute(
            &period,
            &[rate("901", 5_000_000_000_000_000_000, 5_000_000_000_000_000_000)],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow("nightly rate")));

        // fits per night, overflows over two nights
        let err = InvoiceTotals::compute(&period, &[rate("902", i64::MAX / 2 + 1, 0)], &[])
            .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow("lodging subtotal")));

        // lodging fits (i64::MAX - 1), adding the tax does not
        let err = InvoiceTotals::compute(&period, &[rate("903", i64::MAX / 2, 0)], &[])
            .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow("invoice total")));
    }

    #[test]
    fn test_huge_consumption_is_rejected() {
        let period = StayPeriod::new(at(1, 14), at(2, 12)).unwrap();
        let err = InvoiceTotals::compute(
            &period,
            &[rate("101", 100_000, 0)],
            &[consumption(999, i64::MAX / 100, false)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow("consumption line")));
    }
}
