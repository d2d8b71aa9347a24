use crate::domain::models::FlightPhase;
use chrono::{DateTime, Duration, Utc};

/// How long the refresh collaborator may wait before fetching live status
/// again, or `None` once polling should stop. A pure lookup, not a state
/// machine: callers re-evaluate it every cycle.
pub fn polling_interval(
    now: DateTime<Utc>,
    departure: DateTime<Utc>,
    phase: Option<FlightPhase>,
    arrival: Option<DateTime<Utc>>,
) -> Option<Duration> {
    if phase.is_some_and(|phase| phase.is_terminal()) {
        return None;
    }
    if arrival.is_some_and(|arrival| now - arrival > Duration::hours(2)) {
        return None;
    }

    if phase == Some(FlightPhase::Active) {
        return Some(Duration::minutes(5));
    }

    // Compared in minutes: hour truncation would widen each tier by most
    // of an hour.
    let minutes_until_departure = (departure - now).num_minutes();
    let interval = if minutes_until_departure <= 60 {
        Duration::minutes(5)
    } else if minutes_until_departure <= 4 * 60 {
        Duration::minutes(15)
    } else if minutes_until_departure <= 24 * 60 {
        Duration::hours(1)
    } else {
        Duration::hours(6)
    };
    Some(interval)
}
