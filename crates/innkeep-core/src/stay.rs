//! # Stay Periods
//!
//! A stay is the half-open interval `[check_in, check_out)`.
//!
//! ## Overlap Test
//! ```text
//!   A: [a ─────────── b)
//!   B:           [c ─────────── d)        a < d && c < b  → overlap
//!
//!   A: [a ───── b)
//!   B:            [c ───── d)             b == c          → no overlap
//!                                         (checkout day = next check-in day)
//! ```
//!
//! ## Night Count
//! Nights are counted between calendar dates, never between timestamps, and a
//! same-day stay still bills one night:
//! ```text
//!   2024-01-01T14:00 → 2024-01-03T12:00   dates 01 → 03   = 2 nights
//!   2024-01-05T09:00 → 2024-01-05T18:00   dates 05 → 05   = 1 night (floor)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Room count assumed when a reservation does not say how many it needs.
pub const DEFAULT_ROOM_COUNT: i64 = 1;

/// Maximum number of rooms a reservation may hold.
///
/// Missing, zero, or negative counts mean one room. Every call site that
/// needs the limit goes through here.
#[inline]
pub fn room_limit(required_rooms: Option<i64>) -> i64 {
    match required_rooms {
        Some(n) if n > 0 => n,
        _ => DEFAULT_ROOM_COUNT,
    }
}

/// A half-open date range `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl StayPeriod {
    /// Creates a period, rejecting empty or inverted ranges.
    pub fn new(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Result<Self, ValidationError> {
        if check_out <= check_in {
            return Err(ValidationError::EmptyStay);
        }
        Ok(StayPeriod {
            check_in,
            check_out,
        })
    }

    /// Wraps bounds already stored in the database without re-validating.
    #[inline]
    pub fn from_bounds(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Self {
        StayPeriod {
            check_in,
            check_out,
        }
    }

    /// Half-open interval overlap.
    #[inline]
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Billable nights, floored to one.
    pub fn nights(&self) -> i64 {
        let days = (self.check_out.date_naive() - self.check_in.date_naive()).num_days();
        days.max(1)
    }

    /// Booking-time rule: the stay may not start before `today`.
    ///
    /// `today` comes from the caller's clock.
    pub fn ensure_not_in_past(&self, today: NaiveDate) -> Result<(), ValidationError> {
        let check_in = self.check_in.date_naive();
        if check_in < today {
            return Err(ValidationError::CheckInInPast { check_in, today });
        }
        Ok(())
    }

    /// True while the stay has not ended at `now`.
    #[inline]
    pub fn ends_after(&self, now: DateTime<Utc>) -> bool {
        self.check_out > now
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
