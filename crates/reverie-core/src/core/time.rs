// crates/reverie-core/src/core/time.rs
// ============================================================================
// Module: Reverie Time Model
// Description: Explicit timestamps, calendar week windows, and month math.
// Purpose: Provide deterministic time values for entitlement decisions.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Reverie uses explicit time values supplied by hosts for every entitlement
//! decision. The core never reads wall-clock time directly; the server edge
//! provides timestamps through the [`crate::interfaces::Clock`] seam.
//!
//! Week windows follow the product's fixed calendar definition: Sunday
//! 00:00:00 through the following Sunday (exclusive) at a server-configured
//! UTC offset. Report quotas and distinct-day counts are both evaluated
//! against this window.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::Duration;
use time::Month;
use time::OffsetDateTime;
use time::UtcOffset;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by calendar conversions.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TimeError {
    /// Timestamp is outside the representable calendar range.
    #[error("timestamp out of calendar range: {0}")]
    OutOfRange(i64),
    /// Calendar arithmetic produced an unrepresentable date.
    #[error("calendar arithmetic overflow")]
    ArithmeticOverflow,
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Canonical instant used across entitlement records and decisions.
///
/// # Invariants
/// - Values are unix epoch milliseconds supplied explicitly by callers.
/// - No validation is performed at construction; calendar conversions fail
///   closed via [`TimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns true when `self` is strictly before `other`.
    #[must_use]
    pub const fn is_before(self, other: Self) -> bool {
        self.0 < other.0
    }

    /// Returns the timestamp shifted by a whole number of days.
    #[must_use]
    pub const fn plus_days(self, days: i64) -> Self {
        Self(self.0 + days * MILLIS_PER_DAY)
    }

    /// Converts the timestamp to a calendar value at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] when the instant cannot be
    /// represented as a calendar date.
    pub fn to_calendar(self, offset: UtcOffset) -> Result<OffsetDateTime, TimeError> {
        let seconds = self.0.div_euclid(1_000);
        let datetime =
            OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| TimeError::OutOfRange(self.0))?;
        Ok(datetime.to_offset(offset))
    }
}

/// Milliseconds in one day.
const MILLIS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// SECTION: Week Window
// ============================================================================

/// Calendar week window (Sunday through Saturday) at a fixed offset.
///
/// # Invariants
/// - `start_date` is always a Sunday.
/// - The window is interpreted as the half-open instant range
///   `[start_instant, end_instant_exclusive)`, which is equivalent to the
///   inclusive Sunday-00:00:00 through Saturday-23:59:59 definition for any
///   millisecond instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    /// Sunday date opening the window.
    start_date: Date,
    /// Offset fixing the server-local calendar.
    offset: UtcOffset,
}

impl WeekWindow {
    /// Computes the week window containing the given instant.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the instant is outside the calendar range.
    pub fn containing(instant: Timestamp, offset: UtcOffset) -> Result<Self, TimeError> {
        let date = instant.to_calendar(offset)?.date();
        let back = i64::from(date.weekday().number_days_from_sunday());
        let start_date = date
            .checked_sub(Duration::days(back))
            .ok_or(TimeError::ArithmeticOverflow)?;
        Ok(Self { start_date, offset })
    }

    /// Returns the Sunday date opening the window.
    #[must_use]
    pub const fn start_date(self) -> Date {
        self.start_date
    }

    /// Returns the Saturday date closing the window (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::ArithmeticOverflow`] when the window end cannot
    /// be represented.
    pub fn end_date(self) -> Result<Date, TimeError> {
        self.start_date.checked_add(Duration::days(6)).ok_or(TimeError::ArithmeticOverflow)
    }

    /// Returns the opening instant of the window.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::ArithmeticOverflow`] when the instant cannot be
    /// represented.
    pub fn start_instant(self) -> Result<Timestamp, TimeError> {
        let datetime = self.start_date.midnight().assume_offset(self.offset);
        let millis =
            datetime.unix_timestamp().checked_mul(1_000).ok_or(TimeError::ArithmeticOverflow)?;
        Ok(Timestamp::from_unix_millis(millis))
    }

    /// Returns the exclusive closing instant (the next Sunday 00:00:00).
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::ArithmeticOverflow`] when the instant cannot be
    /// represented.
    pub fn end_instant_exclusive(self) -> Result<Timestamp, TimeError> {
        Ok(self.start_instant()?.plus_days(7))
    }

    /// Returns true when the given date falls inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the window end cannot be represented.
    pub fn contains_date(self, date: Date) -> Result<bool, TimeError> {
        Ok(date >= self.start_date && date <= self.end_date()?)
    }
}

// ============================================================================
// SECTION: Calendar Month Arithmetic
// ============================================================================

/// Adds whole calendar months to an instant, clamping to month end.
///
/// Billing expiries use calendar months rather than fixed-length durations,
/// so January 31 plus one month lands on the last day of February.
///
/// # Errors
///
/// Returns [`TimeError`] when the instant or the resulting date cannot be
/// represented.
pub fn add_calendar_months(
    instant: Timestamp,
    months: u32,
    offset: UtcOffset,
) -> Result<Timestamp, TimeError> {
    let datetime = instant.to_calendar(offset)?;
    let date = datetime.date();
    let zero_based = i64::from(u8::from(date.month())) - 1 + i64::from(months);
    let year_shift = zero_based.div_euclid(12);
    let month_index = zero_based.rem_euclid(12);
    let year = i32::try_from(i64::from(date.year()) + year_shift)
        .map_err(|_| TimeError::ArithmeticOverflow)?;
    let month_number = u8::try_from(month_index + 1).map_err(|_| TimeError::ArithmeticOverflow)?;
    let month = Month::try_from(month_number).map_err(|_| TimeError::ArithmeticOverflow)?;
    let day = date.day().min(time::util::days_in_year_month(year, month));
    let shifted = Date::from_calendar_date(year, month, day)
        .map_err(|_| TimeError::ArithmeticOverflow)?;
    let rebuilt = shifted.with_time(datetime.time()).assume_offset(offset);
    let millis = rebuilt
        .unix_timestamp()
        .checked_mul(1_000)
        .ok_or(TimeError::ArithmeticOverflow)?;
    Ok(Timestamp::from_unix_millis(millis))
}
