use crate::application::date_resolver::{DateResolver, local_date};
use crate::domain::models::Reservation;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Whether the reservation starts "today". Today is checked in two frames:
/// the event's own timezone and the viewer's device timezone, and a match
/// in either frame counts. The same instant can legitimately be today in
/// one frame and not the other; the UI favors calling it today whenever
/// that is true anywhere relevant to the user.
pub fn is_today(
    reservation: &Reservation,
    resolver: &DateResolver,
    now: DateTime<Utc>,
    device_offset_minutes: i32,
) -> bool {
    matches_day_at_offset(reservation, resolver, now, device_offset_minutes, 0)
}

/// Whether the reservation starts "tomorrow", with the same dual-frame OR
/// semantics as [`is_today`]. Tomorrow is one calendar day past today in
/// each frame, so month and year rollover come from date arithmetic.
pub fn is_tomorrow(
    reservation: &Reservation,
    resolver: &DateResolver,
    now: DateTime<Utc>,
    device_offset_minutes: i32,
) -> bool {
    matches_day_at_offset(reservation, resolver, now, device_offset_minutes, 1)
}

/// "What is today at the location" independent of the device timezone.
pub fn is_local_date_today(
    resolver: &DateResolver,
    local_timestamp: &str,
    explicit_offset: Option<&str>,
    location_code: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    let Some(event_date) = local_date(local_timestamp) else {
        return false;
    };
    let Some(offset) = resolver.offset_minutes(explicit_offset, location_code, now) else {
        return false;
    };
    event_date == calendar_date_at_offset(now, offset)
}

fn matches_day_at_offset(
    reservation: &Reservation,
    resolver: &DateResolver,
    now: DateTime<Utc>,
    device_offset_minutes: i32,
    days_ahead: i64,
) -> bool {
    // The comparison always uses the local (location) calendar date of the
    // start, never its UTC form.
    let Some(event_date) = local_date(&reservation.start_at) else {
        return false;
    };

    let event_frame = resolver
        .offset_minutes(
            reservation.start_offset(),
            reservation.start_location_code(),
            now,
        )
        .map(|offset| calendar_date_at_offset(now, offset) + Duration::days(days_ahead));
    if event_frame == Some(event_date) {
        return true;
    }

    // Device frame; also the only check when the event timezone cannot be
    // resolved.
    let device_target =
        calendar_date_at_offset(now, device_offset_minutes) + Duration::days(days_ahead);
    event_date == device_target
}

fn calendar_date_at_offset(now: DateTime<Utc>, offset_minutes: i32) -> NaiveDate {
    (now + Duration::minutes(i64::from(offset_minutes)))
        .naive_utc()
        .date()
}
