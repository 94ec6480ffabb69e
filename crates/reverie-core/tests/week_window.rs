// crates/reverie-core/tests/week_window.rs
// ============================================================================
// Module: Week Window Tests
// Description: Validate calendar week windows and month arithmetic.
// Purpose: Ensure window boundaries and billing expiries are deterministic.
// Dependencies: reverie-core, proptest, time
// ============================================================================

//! Calendar math tests, including property coverage for window placement.

use proptest::prelude::ProptestConfig;
use proptest::prop_assert;
use proptest::prop_assert_eq;
use proptest::proptest;
use reverie_core::Timestamp;
use reverie_core::WeekWindow;
use reverie_core::add_calendar_months;
use time::UtcOffset;
use time::Weekday;
use time::macros::date;
use time::macros::datetime;
use time::macros::offset;

/// Converts a calendar value into the authority's millisecond instant.
fn instant(datetime: time::OffsetDateTime) -> Timestamp {
    Timestamp::from_unix_millis(datetime.unix_timestamp() * 1_000)
}

/// Test result alias keeping assertions terse.
type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn thursday_belongs_to_the_week_opened_the_previous_sunday() -> TestResult {
    let window = WeekWindow::containing(instant(datetime!(2026-08-06 12:00 UTC)), UtcOffset::UTC)?;
    assert_eq!(window.start_date(), date!(2026 - 08 - 02));
    assert_eq!(window.end_date()?, date!(2026 - 08 - 08));
    Ok(())
}

#[test]
fn sunday_opens_its_own_window() -> TestResult {
    let window = WeekWindow::containing(instant(datetime!(2026-08-02 00:00 UTC)), UtcOffset::UTC)?;
    assert_eq!(window.start_date(), date!(2026 - 08 - 02));
    Ok(())
}

#[test]
fn saturday_night_still_belongs_to_the_closing_window() -> TestResult {
    let window = WeekWindow::containing(instant(datetime!(2026-08-08 23:59 UTC)), UtcOffset::UTC)?;
    assert_eq!(window.start_date(), date!(2026 - 08 - 02));
    assert!(window.contains_date(date!(2026 - 08 - 08))?);
    assert!(!window.contains_date(date!(2026 - 08 - 09))?);
    Ok(())
}

#[test]
fn window_instants_cover_exactly_seven_days() -> TestResult {
    let window = WeekWindow::containing(instant(datetime!(2026-08-06 12:00 UTC)), UtcOffset::UTC)?;
    let start = window.start_instant()?;
    let end = window.end_instant_exclusive()?;
    assert_eq!(start, instant(datetime!(2026-08-02 00:00 UTC)));
    assert_eq!(end, instant(datetime!(2026-08-09 00:00 UTC)));
    assert_eq!(end.as_unix_millis() - start.as_unix_millis(), 7 * 86_400_000);
    Ok(())
}

#[test]
fn offset_shifts_the_window_boundary() -> TestResult {
    // 2026-08-09 01:00 UTC is still Saturday evening at UTC-5.
    let at = instant(datetime!(2026-08-09 01:00 UTC));
    let shifted = WeekWindow::containing(at, offset!(-5))?;
    assert_eq!(shifted.start_date(), date!(2026 - 08 - 02));
    let utc = WeekWindow::containing(at, UtcOffset::UTC)?;
    assert_eq!(utc.start_date(), date!(2026 - 08 - 09));
    Ok(())
}

#[test]
fn month_addition_clamps_to_month_end() -> TestResult {
    let jan31 = instant(datetime!(2026-01-31 12:00 UTC));
    let plus_one = add_calendar_months(jan31, 1, UtcOffset::UTC)?;
    assert_eq!(plus_one, instant(datetime!(2026-02-28 12:00 UTC)));

    let leap = add_calendar_months(instant(datetime!(2028-01-31 12:00 UTC)), 1, UtcOffset::UTC)?;
    assert_eq!(leap, instant(datetime!(2028-02-29 12:00 UTC)));
    Ok(())
}

#[test]
fn month_addition_wraps_years() -> TestResult {
    let dec = instant(datetime!(2026-12-15 09:30 UTC));
    let plus_one = add_calendar_months(dec, 1, UtcOffset::UTC)?;
    assert_eq!(plus_one, instant(datetime!(2027-01-15 09:30 UTC)));

    let plus_twelve = add_calendar_months(dec, 12, UtcOffset::UTC)?;
    assert_eq!(plus_twelve, instant(datetime!(2027-12-15 09:30 UTC)));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every instant in a broad modern range maps to a window that starts on
    /// a Sunday and contains the instant's own date.
    #[test]
    fn windows_always_start_on_sunday(days in 0_i64..4_000, seconds in 0_i64..86_400) {
        let base = instant(datetime!(2020-01-01 00:00 UTC));
        let at = Timestamp::from_unix_millis(
            base.as_unix_millis() + days * 86_400_000 + seconds * 1_000,
        );
        let window = WeekWindow::containing(at, UtcOffset::UTC)
            .map_err(|error| proptest::test_runner::TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(window.start_date().weekday(), Weekday::Sunday);
        let date = at
            .to_calendar(UtcOffset::UTC)
            .map_err(|error| proptest::test_runner::TestCaseError::fail(error.to_string()))?
            .date();
        prop_assert!(window.contains_date(date).unwrap_or(false));
    }
}
