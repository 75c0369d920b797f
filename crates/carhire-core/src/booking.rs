//! # Booking Rules
//!
//! Date ranges, the overlap predicate, pricing and rental status transitions.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create_rental                                   │
//! │                                                                         │
//! │  (start, end) ──► DateRange::new ──► end < start? → ValidationError     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                 quote(range, price/day)                                 │
//! │                 days  = (end − start) + 1                               │
//! │                 total = days × price/day  (checked, integer cents)      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ┌──────────────── carhire-db transaction ──────────────────────────┐  │
//! │  │  lock model row ──► active rentals ──► find_conflict ──► insert  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlap Predicate
//! Both ends are inclusive. An existing booking `[s, e]` conflicts with a
//! requested `[start, end]` when any of these holds:
//!
//! ```text
//!   s ≤ start ≤ e          requested start falls inside existing
//!   s ≤ end   ≤ e          requested end falls inside existing
//!   start ≤ s ∧ e ≤ end    requested range swallows existing
//! ```
//!
//! A booking ending on day D therefore blocks another starting on day D.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Rental, RentalStatus};

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of calendar dates with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `end < start` as an error on `end_date`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "end_date".to_string(),
                reason: "End date must be after start date.".to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of rental days; a same-day rental counts as one.
    #[inline]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The inclusive overlap test against an existing `[s, e]` booking.
    pub fn overlaps(&self, s: NaiveDate, e: NaiveDate) -> bool {
        (s <= self.start && self.start <= e)
            || (s <= self.end && self.end <= e)
            || (self.start <= s && e <= self.end)
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Day count and total for a requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalQuote {
    pub days: i64,
    pub total: Money,
}

/// Prices `range` at `price_per_day`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use carhire_core::booking::{quote, DateRange};
/// use carhire_core::money::Money;
///
/// let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let q = quote(DateRange::new(d, d).unwrap(), Money::from_cents(4000)).unwrap();
/// assert_eq!(q.days, 1);
/// assert_eq!(q.total.cents(), 4000);
/// ```
pub fn quote(range: DateRange, price_per_day: Money) -> CoreResult<RentalQuote> {
    if price_per_day.is_negative() {
        return Err(ValidationError::Negative {
            field: "price_per_day".to_string(),
        }
        .into());
    }

    let days = range.days();
    let total = price_per_day
        .checked_times(days)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "end_date".to_string(),
            reason: "rental total is too large".to_string(),
        })?;

    Ok(RentalQuote { days, total })
}

// =============================================================================
// Conflicts
// =============================================================================

/// First active rental among `existing` that overlaps `range`.
///
/// Rentals in any other status never block a booking.
pub fn find_conflict<'a>(range: &DateRange, existing: &'a [Rental]) -> Option<&'a Rental> {
    existing.iter().find(|r| {
        r.status == RentalStatus::Active && range.overlaps(r.start_date, r.end_date)
    })
}

/// Conflict error returned when [`find_conflict`] finds a match.
pub fn overlap_conflict() -> CoreError {
    CoreError::conflict("Car is already booked for the selected dates.")
}

// =============================================================================
// Status Transitions
// =============================================================================
//
//   pending ──┐
//             ├──► cancelled
//   active ───┤
//             └──► completed   (active only)

/// Fails with `InvalidState` unless the rental is pending or active.
pub fn ensure_cancellable(rental: &Rental) -> CoreResult<()> {
    match rental.status {
        RentalStatus::Pending | RentalStatus::Active => Ok(()),
        other => Err(invalid_state(rental, other, "cancel")),
    }
}

/// Fails with `InvalidState` unless the rental is active.
pub fn ensure_completable(rental: &Rental) -> CoreResult<()> {
    match rental.status {
        RentalStatus::Active => Ok(()),
        other => Err(invalid_state(rental, other, "complete")),
    }
}

fn invalid_state(rental: &Rental, status: RentalStatus, action: &str) -> CoreError {
    CoreError::InvalidState {
        entity: "Rental".to_string(),
        id: rental.id.clone(),
        status: status.to_string(),
        action: action.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn range(s: (u32, u32), e: (u32, u32)) -> DateRange {
        DateRange::new(date(s.0, s.1), date(e.0, e.1)).unwrap()
    }

    fn rental(s: (u32, u32), e: (u32, u32), status: RentalStatus) -> Rental {
        Rental {
            id: "r-1".to_string(),
            user_id: "u-1".to_string(),
            car_model_id: "m-1".to_string(),
            start_date: date(s.0, s.1),
            end_date: date(e.0, e.1),
            total_price_cents: 0,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err = DateRange::new(date(6, 3), date(6, 1)).unwrap_err();
        assert_eq!(err.field(), "end_date");
    }

    #[test]
    fn test_days_inclusive() {
        assert_eq!(range((6, 1), (6, 1)).days(), 1);
        assert_eq!(range((6, 1), (6, 3)).days(), 3);
        assert_eq!(range((2, 28), (3, 1)).days(), 3); // 2024 is a leap year
    }

    #[test]
    fn test_quote_three_days() {
        let q = quote(range((6, 1), (6, 3)), Money::from_cents(5000)).unwrap();
        assert_eq!(q.days, 3);
        assert_eq!(q.total, Money::from_cents(15000));
    }

    #[test]
    fn test_quote_is_exact_for_fractional_prices() {
        for days in 1..=60u32 {
            let r = DateRange::new(date(1, 1), date(1, 1) + chrono::Days::new(u64::from(days - 1)))
                .unwrap();
            let q = quote(r, Money::from_cents(1999)).unwrap();
            assert_eq!(q.total.cents(), 1999 * i64::from(days));
        }
    }

    #[test]
    fn test_quote_rejects_negative_and_overflow() {
        let r = range((6, 1), (6, 3));
        assert!(matches!(
            quote(r, Money::from_cents(-1)),
            Err(CoreError::Validation(ValidationError::Negative { .. }))
        ));
        assert!(matches!(
            quote(r, Money::from_cents(i64::MAX)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_overlap_cases() {
        let existing = (date(6, 1), date(6, 3));

        // start inside
        assert!(range((6, 3), (6, 5)).overlaps(existing.0, existing.1));
        // end inside
        assert!(range((5, 29), (6, 1)).overlaps(existing.0, existing.1));
        // swallows
        assert!(range((5, 30), (6, 10)).overlaps(existing.0, existing.1));
        // inside
        assert!(range((6, 2), (6, 2)).overlaps(existing.0, existing.1));
        // disjoint
        assert!(!range((6, 4), (6, 6)).overlaps(existing.0, existing.1));
        assert!(!range((5, 1), (5, 31)).overlaps(existing.0, existing.1));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let days: Vec<NaiveDate> = (1..=6).map(|d| date(7, d)).collect();
        for &a0 in &days {
            for &a1 in days.iter().filter(|d| **d >= a0) {
                for &b0 in &days {
                    for &b1 in days.iter().filter(|d| **d >= b0) {
                        let a = DateRange::new(a0, a1).unwrap();
                        let b = DateRange::new(b0, b1).unwrap();
                        assert_eq!(a.overlaps(b0, b1), b.overlaps(a0, a1));
                        assert_eq!(a.overlaps(b0, b1), a0 <= b1 && b0 <= a1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_find_conflict_ignores_non_active() {
        let existing = vec![
            rental((6, 1), (6, 3), RentalStatus::Cancelled),
            rental((6, 1), (6, 3), RentalStatus::Completed),
            rental((6, 1), (6, 3), RentalStatus::Pending),
        ];
        assert!(find_conflict(&range((6, 2), (6, 4)), &existing).is_none());

        let existing = vec![rental((6, 1), (6, 3), RentalStatus::Active)];
        assert!(find_conflict(&range((6, 3), (6, 5)), &existing).is_some());
        assert!(find_conflict(&range((6, 4), (6, 5)), &existing).is_none());
    }

    #[test]
    fn test_transitions() {
        assert!(ensure_cancellable(&rental((6, 1), (6, 3), RentalStatus::Active)).is_ok());
        assert!(ensure_cancellable(&rental((6, 1), (6, 3), RentalStatus::Pending)).is_ok());
        assert!(matches!(
            ensure_cancellable(&rental((6, 1), (6, 3), RentalStatus::Cancelled)),
            Err(CoreError::InvalidState { .. })
        ));
        assert!(ensure_completable(&rental((6, 1), (6, 3), RentalStatus::Active)).is_ok());
        assert!(ensure_completable(&rental((6, 1), (6, 3), RentalStatus::Pending)).is_err());
        assert!(ensure_completable(&rental((6, 1), (6, 3), RentalStatus::Completed)).is_err());
    }
}
