use crate::application::date_resolver::DateResolver;
use crate::domain::models::{FlightPhase, FlightStatusSnapshot};
use chrono::{DateTime, Utc};

/// Shortest flight duration we will estimate, in minutes.
const MIN_FLIGHT_MINUTES: i64 = 60;
/// No commercial flight exceeds this, in minutes.
const MAX_FLIGHT_MINUTES: i64 = 20 * 60;
/// Slack past the expected arrival before live data counts as stale.
const OVERDUE_GRACE_MINUTES: i64 = 60;

/// Derive a flight's effective phase from a possibly stale, possibly
/// contradictory tracking snapshot.
///
/// Actual timestamps are ground truth; the provider's categorical label is
/// only consulted where timestamps cannot decide, and never allowed to
/// contradict a firm timestamp-derived conclusion. A flight long overdue
/// with no arrival signal is reported as `Unknown` rather than guessed.
pub fn infer_phase(
    snapshot: &FlightStatusSnapshot,
    resolver: &DateResolver,
    now: DateTime<Utc>,
) -> FlightPhase {
    let raw = snapshot.raw_phase();
    if raw.is_definitive() {
        return raw;
    }

    if nonempty(snapshot.arrival_actual.as_deref()).is_some() {
        return FlightPhase::Landed;
    }

    if let Some(actual_departure) = nonempty(snapshot.departure_actual.as_deref()) {
        let departed_at = resolver
            .resolve_utc(
                actual_departure,
                None,
                snapshot.departure_airport.as_deref(),
            )
            .instant();
        let elapsed_minutes = (now - departed_at).num_minutes();
        let expected_minutes = expected_duration_minutes(snapshot, resolver, departed_at);
        if elapsed_minutes > expected_minutes + OVERDUE_GRACE_MINUTES {
            return FlightPhase::Unknown;
        }
        return FlightPhase::Active;
    }

    // No firm timestamps: the label is all we have.
    raw
}

/// Expected time in the air, from actual departure to the best available
/// arrival estimate, clamped to a plausible commercial-flight range. With
/// no arrival data at all the estimate collapses to the minimum, which errs
/// toward an honest `Unknown` over a confident wrong `Active`.
fn expected_duration_minutes(
    snapshot: &FlightStatusSnapshot,
    resolver: &DateResolver,
    departed_at: DateTime<Utc>,
) -> i64 {
    let estimate = snapshot
        .best_arrival()
        .map(|arrival| {
            let arrival_at = resolver
                .resolve_utc(arrival, None, snapshot.arrival_airport.as_deref())
                .instant();
            (arrival_at - departed_at).num_minutes()
        })
        .unwrap_or(0);
    estimate.clamp(MIN_FLIGHT_MINUTES, MAX_FLIGHT_MINUTES)
}

fn nonempty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
