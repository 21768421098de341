//! # Room Assignment Rules
//!
//! Decides whether a room may be linked to a reservation.
//!
//! ## Assignment Flow
//! ```text
//! assign(room 204, reservation R)
//!      │
//!      ├── 204 already in R's set? ── yes ──► skip limit check (idempotent)
//!      │        │ no
//!      │        ▼
//!      │   R.assigned >= room_limit(R.required_rooms) ──► RoomLimitReached
//!      │
//!      ▼
//! for every OTHER reservation X linked to 204:
//!      X.period overlaps R.period ──► DateConflict { X.id, X dates }
//!      │
//!      ▼
//! Ok(Link | AlreadyLinked)   caller links the room and marks it Occupied
//! ```
//!
//! The database crate calls these functions while holding its write
//! transaction, with rows it has just read under that lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::stay::{self, StayPeriod};

/// Another reservation already linked to the room under consideration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LinkedStay {
    pub reservation_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl LinkedStay {
    #[inline]
    pub fn period(&self) -> StayPeriod {
        StayPeriod::from_bounds(self.check_in, self.check_out)
    }
}

/// The reservation a room is being assigned to, as seen at write time.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub reservation_id: &'a str,
    pub period: StayPeriod,
    pub required_rooms: Option<i64>,
    /// Rooms the reservation holds right now.
    pub assigned_rooms: i64,
    /// The room is already in this reservation's set.
    pub already_assigned: bool,
}

/// What the caller must write after a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Insert the link row.
    Link,
    /// The link already exists; only the room state is refreshed.
    AlreadyLinked,
}

/// Checks the room limit and date conflicts for an assignment.
pub fn check_assignment(
    room_number: &str,
    candidate: &Candidate<'_>,
    linked: &[LinkedStay],
) -> CoreResult<Assignment> {
    if !candidate.already_assigned {
        let limit = stay::room_limit(candidate.required_rooms);
        if candidate.assigned_rooms >= limit {
            return Err(CoreError::RoomLimitReached {
                reservation_id: candidate.reservation_id.to_string(),
                limit,
                current: candidate.assigned_rooms,
            });
        }
    }

    ensure_no_conflict(room_number, candidate.reservation_id, &candidate.period, linked)?;

    Ok(if candidate.already_assigned {
        Assignment::AlreadyLinked
    } else {
        Assignment::Link
    })
}

/// Fails with the first other reservation whose stay overlaps `period`.
///
/// Entries belonging to `reservation_id` itself are ignored.
pub fn ensure_no_conflict(
    room_number: &str,
    reservation_id: &str,
    period: &StayPeriod,
    linked: &[LinkedStay],
) -> CoreResult<()> {
    let conflict = linked
        .iter()
        .filter(|other| other.reservation_id != reservation_id)
        .find(|other| other.period().overlaps(period));

    match conflict {
        Some(other) => Err(CoreError::DateConflict {
            room: room_number.to_string(),
            conflicting_id: other.reservation_id.clone(),
            check_in: other.check_in,
            check_out: other.check_out,
        }),
        None => Ok(()),
    }
}

/// A new room requirement may not drop below the rooms already held.
pub fn check_room_count_change(
    reservation_id: &str,
    requested: Option<i64>,
    assigned_rooms: i64,
) -> CoreResult<()> {
    let limit = stay::room_limit(requested);
    if limit < assigned_rooms {
        return Err(CoreError::RoomCountBelowAssigned {
            reservation_id: reservation_id.to_string(),
            assigned: assigned_rooms,
            requested: limit,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn linked(id: &str, from: u32, to: u32) -> LinkedStay {
        LinkedStay {
            reservation_id: id.to_string(),
            check_in: at(from, 14),
            check_out: at(to, 12),
        }
    }

    fn candidate(assigned: i64, already: bool) -> Candidate<'static> {
        Candidate {
            reservation_id: "r-new",
            period: StayPeriod::new(at(2, 14), at(5, 12)).unwrap(),
            required_rooms: None,
            assigned_rooms: assigned,
            already_assigned: already,
        }
    }

    #[test]
    fn test_free_room_links() {
        let plan = check_assignment("101", &candidate(0, false), &[]).unwrap();
        assert_eq!(plan, Assignment::Link);
    }

    #[test]
    fn test_limit_reached() {
        let err = check_assignment("101", &candidate(1, false), &[]).unwrap_err();
        match err {
            CoreError::RoomLimitReached { limit, current, .. } => {
                assert_eq!(limit, 1);
                assert_eq!(current, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_already_assigned_skips_limit() {
        let plan = check_assignment("101", &candidate(1, true), &[linked("r-new", 2, 5)]).unwrap();
        assert_eq!(plan, Assignment::AlreadyLinked);
    }

    #[test]
    fn test_overlap_names_conflicting_reservation() {
        let err = check_assignment("204", &candidate(0, false), &[linked("r-9", 1, 4)]).unwrap_err();
        match err {
            CoreError::DateConflict {
                room,
                conflicting_id,
                ..
            } => {
                assert_eq!(room, "204");
                assert_eq!(conflicting_id, "r-9");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_back_to_back_stays_do_not_conflict() {
        // r-prev checks out on the 2nd at noon, before the new check-in at 14:00
        let plan = check_assignment("204", &candidate(0, false), &[linked("r-prev", 1, 2)]).unwrap();
        assert_eq!(plan, Assignment::Link);
    }

    #[test]
    fn test_room_count_change() {
        assert!(check_room_count_change("r", Some(2), 2).is_ok());
        assert!(check_room_count_change("r", None, 1).is_ok());
        assert!(matches!(
            check_room_count_change("r", Some(1), 2),
            Err(CoreError::RoomCountBelowAssigned { assigned: 2, requested: 1, .. })
        ));
    }
}
