//! Wall clock access and the time formats used in reports.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Header line of every report, e.g. `Monday, 06.01.2025 14:03:59`.
const HEADER_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday], [day].[month].[year] [hour]:[minute]:[second]"
);

/// Classic `ctime` layout without the trailing newline, e.g. `Mon Jan  6 14:03:59 2025`.
const CTIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
);

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time in the offset reports should be rendered in.
    fn now(&self) -> OffsetDateTime;

    /// Returns the offset that was in effect at `instant`.
    ///
    /// Past instants are rendered in this offset, which differs from the current one when a
    /// daylight saving change lies in between.
    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset;
}

/// The system clock in the local time zone.
///
/// Falls back to UTC when the local offset cannot be determined soundly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        UtcOffset::local_offset_at(instant).unwrap_or(UtcOffset::UTC)
    }
}

/// A clock that always returns the same instant, in a zone with a single fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }

    fn offset_at(&self, _instant: OffsetDateTime) -> UtcOffset {
        self.0.offset()
    }
}

/// Formats the header line for a report rendered at `now`.
///
/// # Errors
///
/// Returns an error if the time cannot be formatted.
pub fn header(now: OffsetDateTime) -> Result<String, time::error::Format> {
    now.format(HEADER_FORMAT)
}

/// Formats `instant` like `ctime` in the given offset.
///
/// # Errors
///
/// Returns an error if the time cannot be formatted.
pub fn ctime(instant: OffsetDateTime, offset: UtcOffset) -> Result<String, time::error::Format> {
    instant.to_offset(offset).format(CTIME_FORMAT)
}

/// Returns the number of whole seconds elapsed between `since` and `now`.
#[must_use]
pub fn age_seconds(since: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (now - since).whole_seconds()
}
