//! Lossless timestamp columns.
//!
//! `TIMESTAMPTZ` keeps microseconds. The nanoseconds below that are stored in
//! a `created_at_nanos SMALLINT` column next to it, so a record reads back
//! with the exact instant it was written with.

use time::{Duration, OffsetDateTime};

/// Splits a timestamp into its whole-microsecond part and the nanoseconds
/// below it (0..1000).
#[must_use]
pub fn split(at: OffsetDateTime) -> (OffsetDateTime, i16) {
    let sub_micros = at.nanosecond() % 1_000;
    let whole = at - Duration::nanoseconds(i64::from(sub_micros));
    (whole, sub_micros as i16)
}

/// Rebuilds a timestamp from the two stored columns.
#[must_use]
pub fn join(whole: OffsetDateTime, sub_micros: i16) -> OffsetDateTime {
    whole + Duration::nanoseconds(i64::from(sub_micros))
}
