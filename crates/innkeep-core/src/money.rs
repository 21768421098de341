//! # Money Module
//!
//! Provides the `Money` type for monetary values.
//!
//! ## Integer Money
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is an i64 in the smallest currency unit.                 │
//! │                                                                         │
//! │  Room rate    120000                                                    │
//! │  × 2 nights   240000                                                    │
//! │  VAT 19%       45600  ← floor(240000 × 1900 / 10000)                    │
//! │  Total        285600                                                    │
//! │                                                                         │
//! │  No floating point anywhere on the billing path.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use innkeep_core::money::Money;
//!
//! let rate = Money::new(120_000);
//! let lodging = rate.checked_mul(2).unwrap();
//! assert_eq!(lodging.amount(), 240_000);
//! assert_eq!(Money::new(i64::MAX).checked_add(rate), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// RoomCategory.base_price ─┐
///                          ├─► nightly rate ─► × nights ─► lodging subtotal ─┐
/// Room.additional_price ───┘                                                  │
///                                                                             ├─► pre-tax ─► + VAT ─► grand total
/// Consumption.unit_price × quantity ─────────────────► consumption subtotal ──┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from an amount in the smallest unit.
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Adds two amounts; `None` when the result leaves the i64 range.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(amount) => Some(Money(amount)),
            None => None,
        }
    }

    /// Multiplies by a quantity (units, nights); `None` on overflow.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(amount) => Some(Money(amount)),
            None => None,
        }
    }

    /// Sums amounts, stopping at the first overflow.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
    }

    /// Calculates tax by truncating toward negative infinity.
    ///
    /// Invoices never round tax up: `floor(amount × bps / 10000)`.
    /// Returns `None` if the tax does not fit in an i64.
    ///
    /// ## Example
    /// ```rust
    /// use innkeep_core::money::Money;
    /// use innkeep_core::types::TaxRate;
    ///
    /// let tax = Money::new(1_001).tax_floor(TaxRate::from_bps(1900)).unwrap();
    /// // 1001 × 0.19 = 190.19 → 190
    /// assert_eq!(tax.amount(), 190);
    /// ```
    pub fn tax_floor(&self, rate: TaxRate) -> Option<Money> {
        // i128 so the intermediate product cannot overflow
        let scaled = i128::from(self.0) * i128::from(rate.bps());
        i64::try_from(scaled.div_euclid(10_000)).ok().map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with dot thousands separators, e.g. `$285.600`.
///
/// For logs and receipts only; the browser formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}", sign, grouped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
