use crate::application::date_resolver::{DateResolver, local_datetime};
use crate::application::phase::infer_phase;
use crate::domain::models::{
    CountdownColor, CountdownResult, FlightPhase, FlightStatusSnapshot, Reservation,
    ReservationType, TimeLabel,
};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Inside this many minutes before departure the countdown turns urgent,
/// the color turns amber and the flight action label becomes "Board".
const URGENT_WINDOW_MINUTES: i64 = 30;

const GLYPH_DONE: &str = "✓";
const GLYPH_CANCELLED: &str = "✕";
const GLYPH_WARNING: &str = "!";
const GLYPH_IN_FLIGHT: &str = "✈";

/// Compose the countdown shown on a reservation card. Total over all
/// inputs; callers recompute it on every render tick.
pub fn compose_countdown(
    reservation: &Reservation,
    resolver: &DateResolver,
    now: DateTime<Utc>,
) -> CountdownResult {
    if let Some(snapshot) = reservation.snapshot() {
        let phase = infer_phase(snapshot, resolver, now);
        match phase {
            FlightPhase::Landed => {
                let minutes = arrival_minutes(reservation, snapshot, resolver, now).unwrap_or(0);
                return CountdownResult {
                    display: GLYPH_DONE.to_string(),
                    action: "Landed".to_string(),
                    urgent: false,
                    minutes_to_event: minutes,
                    color: CountdownColor::Green,
                };
            }
            FlightPhase::Active => {
                return match arrival_minutes(reservation, snapshot, resolver, now) {
                    Some(minutes) if minutes > 0 => CountdownResult {
                        display: format_span(minutes),
                        action: "Arrives".to_string(),
                        urgent: false,
                        minutes_to_event: minutes,
                        color: CountdownColor::Blue,
                    },
                    Some(minutes) => CountdownResult {
                        display: "Now".to_string(),
                        action: "Arrives".to_string(),
                        urgent: false,
                        minutes_to_event: minutes,
                        color: CountdownColor::Blue,
                    },
                    None => CountdownResult {
                        display: GLYPH_IN_FLIGHT.to_string(),
                        action: "In Flight".to_string(),
                        urgent: false,
                        minutes_to_event: 0,
                        color: CountdownColor::Blue,
                    },
                };
            }
            FlightPhase::Cancelled => {
                return CountdownResult {
                    display: GLYPH_CANCELLED.to_string(),
                    action: "Cancelled".to_string(),
                    urgent: false,
                    minutes_to_event: 0,
                    color: CountdownColor::Red,
                };
            }
            FlightPhase::Diverted | FlightPhase::Incident => {
                let action = if phase == FlightPhase::Diverted {
                    "Diverted"
                } else {
                    "Incident"
                };
                return CountdownResult {
                    display: GLYPH_WARNING.to_string(),
                    action: action.to_string(),
                    urgent: true,
                    minutes_to_event: 0,
                    color: CountdownColor::Red,
                };
            }
            FlightPhase::Scheduled | FlightPhase::Boarding | FlightPhase::Unknown => {
                return departure_countdown(reservation, Some(snapshot), resolver, now);
            }
        }
    }

    departure_countdown(reservation, None, resolver, now)
}

/// Compose the contextual time label, e.g. ("Departs", "10:10 AM"). The
/// snapshot's airport-local times win over the reservation's stored time
/// when both exist: the live source is fresher and already location-local.
pub fn compose_time_label(
    reservation: &Reservation,
    resolver: &DateResolver,
    now: DateTime<Utc>,
) -> TimeLabel {
    if let Some(snapshot) = reservation.snapshot() {
        let departure_time = snapshot
            .best_departure()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| reservation.start_at.clone());

        return match infer_phase(snapshot, resolver, now) {
            FlightPhase::Landed => TimeLabel {
                label: "Landed".to_string(),
                time: format_wall_clock(
                    snapshot
                        .arrival_actual
                        .as_deref()
                        .or_else(|| snapshot.best_arrival())
                        .unwrap_or(&departure_time),
                ),
            },
            FlightPhase::Active => TimeLabel {
                label: "Est. Arrival".to_string(),
                time: snapshot
                    .best_arrival()
                    .map(format_wall_clock)
                    .unwrap_or_else(|| "--".to_string()),
            },
            FlightPhase::Cancelled => TimeLabel {
                label: "Cancelled".to_string(),
                time: format_wall_clock(&departure_time),
            },
            FlightPhase::Diverted => TimeLabel {
                label: "Diverted".to_string(),
                time: format_wall_clock(&departure_time),
            },
            FlightPhase::Incident => TimeLabel {
                label: "Incident".to_string(),
                time: format_wall_clock(&departure_time),
            },
            FlightPhase::Unknown => TimeLabel {
                label: "Status Unknown".to_string(),
                time: format_wall_clock(&departure_time),
            },
            FlightPhase::Scheduled | FlightPhase::Boarding => TimeLabel {
                label: "Departs".to_string(),
                time: format_wall_clock(&departure_time),
            },
        };
    }

    TimeLabel {
        label: action_for_type(reservation.reservation_type, false).to_string(),
        time: format_wall_clock(&reservation.start_at),
    }
}

/// Countdown to the resolved expected departure: the scheduled instant
/// shifted by any reported delay. Shared by flights without a decisive
/// phase and by every non-flight type.
fn departure_countdown(
    reservation: &Reservation,
    snapshot: Option<&FlightStatusSnapshot>,
    resolver: &DateResolver,
    now: DateTime<Utc>,
) -> CountdownResult {
    let scheduled = resolved_departure(reservation, snapshot, resolver);
    let delay_minutes = snapshot.and_then(|s| s.delay_minutes).unwrap_or(0);
    let expected = scheduled + Duration::minutes(delay_minutes);
    let minutes = (expected - now).num_minutes();

    let inside_window = minutes < URGENT_WINDOW_MINUTES;
    let action = action_for_type(reservation.reservation_type, inside_window);

    if minutes <= 0 {
        return CountdownResult {
            display: "Now".to_string(),
            action: action.to_string(),
            urgent: true,
            minutes_to_event: minutes,
            color: CountdownColor::Amber,
        };
    }

    CountdownResult {
        display: format_span(minutes),
        action: action.to_string(),
        urgent: inside_window,
        minutes_to_event: minutes,
        color: if inside_window {
            CountdownColor::Amber
        } else {
            CountdownColor::Neutral
        },
    }
}

fn resolved_departure(
    reservation: &Reservation,
    snapshot: Option<&FlightStatusSnapshot>,
    resolver: &DateResolver,
) -> DateTime<Utc> {
    if let Some(snapshot) = snapshot {
        if let Some(departure) = snapshot
            .departure_scheduled
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            let code = snapshot
                .departure_airport
                .as_deref()
                .or_else(|| reservation.start_location_code());
            return resolver
                .resolve_utc(departure, reservation.details.departure_offset.as_deref(), code)
                .instant();
        }
    }
    resolver
        .resolve_utc(
            &reservation.start_at,
            reservation.start_offset(),
            reservation.start_location_code(),
        )
        .instant()
}

fn arrival_minutes(
    reservation: &Reservation,
    snapshot: &FlightStatusSnapshot,
    resolver: &DateResolver,
    now: DateTime<Utc>,
) -> Option<i64> {
    let arrival = snapshot.best_arrival()?;
    let code = snapshot
        .arrival_airport
        .as_deref()
        .or(reservation.details.arrival_airport.as_deref());
    let arrival_at = resolver
        .resolve_utc(arrival, reservation.details.arrival_offset.as_deref(), code)
        .instant();
    Some((arrival_at - now).num_minutes())
}

fn action_for_type(reservation_type: ReservationType, inside_window: bool) -> &'static str {
    match reservation_type {
        ReservationType::Flight => {
            if inside_window {
                "Board"
            } else {
                "Departs"
            }
        }
        ReservationType::Hotel => "Check-in",
        ReservationType::Car => "Pickup",
        ReservationType::Train => "Departs",
        ReservationType::Meeting | ReservationType::Event => "Starts",
    }
}

/// Compact span rendering with floor division throughout: "2d 5h" at a day
/// or more, then "3h 20m" / "3h" / "45m".
pub(crate) fn format_span(minutes: i64) -> String {
    if minutes >= 24 * 60 {
        let days = minutes / (24 * 60);
        let hours = (minutes % (24 * 60)) / 60;
        format!("{days}d {hours}h")
    } else if minutes >= 60 {
        let hours = minutes / 60;
        let remainder = minutes % 60;
        if remainder == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {remainder}m")
        }
    } else {
        format!("{minutes}m")
    }
}

fn format_wall_clock(local_timestamp: &str) -> String {
    local_datetime(local_timestamp)
        .map(format_naive_time)
        .unwrap_or_else(|| local_timestamp.trim().to_string())
}

fn format_naive_time(naive: NaiveDateTime) -> String {
    naive.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn resolver() -> DateResolver {
        DateResolver::new(HashMap::from([
            ("SFO".to_string(), chrono_tz::America::Los_Angeles),
            ("NRT".to_string(), chrono_tz::Asia::Tokyo),
        ]))
    }

    fn bare_snapshot() -> FlightStatusSnapshot {
        FlightStatusSnapshot {
            carrier_code: "UA".to_string(),
            flight_number: "837".to_string(),
            departure_airport: None,
            departure_terminal: None,
            departure_gate: None,
            arrival_airport: None,
            arrival_terminal: None,
            arrival_gate: None,
            departure_scheduled: None,
            departure_estimated: None,
            departure_actual: None,
            arrival_scheduled: None,
            arrival_estimated: None,
            arrival_actual: None,
            delay_minutes: None,
            status: None,
            captured_at: fixed_time("2026-03-14T08:00:00Z"),
        }
    }

    fn flight_reservation(snapshot: Option<FlightStatusSnapshot>) -> Reservation {
        Reservation {
            id: "res-1".to_string(),
            trip_id: "trip-1".to_string(),
            reservation_type: ReservationType::Flight,
            start_at: "2026-03-14T10:10:00".to_string(),
            end_at: None,
            details: crate::domain::models::ReservationDetails {
                departure_offset: Some("+00:00".to_string()),
                flight_status: snapshot,
                ..Default::default()
            },
            status: crate::domain::models::ReservationStatus::Confirmed,
        }
    }

    #[test]
    fn landed_flight_shows_done_glyph() {
        let mut snapshot = bare_snapshot();
        snapshot.arrival_actual = Some("2026-03-14T18:45:00Z".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T20:00:00Z"));
        assert_eq!(result.display, "✓");
        assert_eq!(result.action, "Landed");
        assert!(!result.urgent);
        assert_eq!(result.color, CountdownColor::Green);
    }

    #[test]
    fn active_flight_counts_down_to_estimated_arrival() {
        let mut snapshot = bare_snapshot();
        snapshot.departure_actual = Some("2026-03-14T10:00:00Z".to_string());
        snapshot.arrival_estimated = Some("2026-03-14T13:30:00Z".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T11:00:00Z"));
        assert_eq!(result.display, "2h 30m");
        assert_eq!(result.action, "Arrives");
        assert_eq!(result.color, CountdownColor::Blue);
        assert_eq!(result.minutes_to_event, 150);
    }

    #[test]
    fn active_flight_without_arrival_data_shows_in_flight_glyph() {
        let mut snapshot = bare_snapshot();
        snapshot.departure_actual = Some("2026-03-14T10:00:00Z".to_string());
        snapshot.status = Some("active".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T10:30:00Z"));
        assert_eq!(result.display, "✈");
        assert_eq!(result.action, "In Flight");
    }

    #[test]
    fn cancelled_and_incident_flights_use_fixed_glyphs() {
        let mut snapshot = bare_snapshot();
        snapshot.status = Some("cancelled".to_string());
        let reservation = flight_reservation(Some(snapshot.clone()));
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T08:00:00Z"));
        assert_eq!(result.display, "✕");
        assert_eq!(result.color, CountdownColor::Red);
        assert!(!result.urgent);

        snapshot.status = Some("incident".to_string());
        let reservation = flight_reservation(Some(snapshot));
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T08:00:00Z"));
        assert_eq!(result.display, "!");
        assert!(result.urgent);
        assert_eq!(result.color, CountdownColor::Red);
    }

    #[test]
    fn delay_shifts_the_expected_departure() {
        // Scheduled 10 minutes out with a 20 minute delay: exactly 30
        // minutes to the expected departure, which sits on the non-urgent
        // side of the boundary.
        let mut snapshot = bare_snapshot();
        snapshot.departure_scheduled = Some("2026-03-14T10:10:00Z".to_string());
        snapshot.delay_minutes = Some(20);
        snapshot.status = Some("scheduled".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T10:00:00Z"));
        assert_eq!(result.minutes_to_event, 30);
        assert_eq!(result.display, "30m");
        assert!(!result.urgent);
        assert_eq!(result.action, "Departs");
        assert_eq!(result.color, CountdownColor::Neutral);
    }

    #[test]
    fn urgency_boundary_at_the_thirty_minute_window() {
        let mut snapshot = bare_snapshot();
        snapshot.departure_scheduled = Some("2026-03-14T12:00:00Z".to_string());
        snapshot.status = Some("scheduled".to_string());
        let reservation = flight_reservation(Some(snapshot));
        let resolver = resolver();

        // 31 minutes out: calm.
        let result = compose_countdown(&reservation, &resolver, fixed_time("2026-03-14T11:29:00Z"));
        assert!(!result.urgent);
        assert_eq!(result.action, "Departs");

        // Exactly 30 minutes out: still calm.
        let result = compose_countdown(&reservation, &resolver, fixed_time("2026-03-14T11:30:00Z"));
        assert!(!result.urgent);
        assert_eq!(result.action, "Departs");

        // 29 minutes out: urgent, amber, boarding.
        let result = compose_countdown(&reservation, &resolver, fixed_time("2026-03-14T11:31:00Z"));
        assert!(result.urgent);
        assert_eq!(result.action, "Board");
        assert_eq!(result.color, CountdownColor::Amber);
        assert_eq!(result.display, "29m");
    }

    #[test]
    fn past_departure_becomes_now_and_never_negative() {
        let reservation = flight_reservation(None);
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T11:00:00Z"));
        assert_eq!(result.display, "Now");
        assert!(result.urgent);
        assert_eq!(result.minutes_to_event, -50);
    }

    #[test]
    fn long_spans_compress_to_days_and_hours() {
        let reservation = flight_reservation(None);
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-12T08:10:00Z"));
        assert_eq!(result.display, "2d 2h");
        assert!(!result.urgent);
    }

    #[test]
    fn non_flight_types_use_their_own_action_labels() {
        let mut reservation = flight_reservation(None);
        reservation.reservation_type = ReservationType::Hotel;
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T08:10:00Z"));
        assert_eq!(result.action, "Check-in");
        assert_eq!(result.display, "2h");

        reservation.reservation_type = ReservationType::Car;
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T08:10:00Z"));
        assert_eq!(result.action, "Pickup");

        reservation.reservation_type = ReservationType::Meeting;
        let result = compose_countdown(&reservation, &resolver(), fixed_time("2026-03-14T09:55:00Z"));
        assert_eq!(result.action, "Starts");
        assert!(result.urgent);
    }

    #[test]
    fn time_label_prefers_snapshot_local_times() {
        let mut snapshot = bare_snapshot();
        snapshot.departure_estimated = Some("2026-03-14T10:45:00".to_string());
        snapshot.status = Some("scheduled".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let label = compose_time_label(&reservation, &resolver(), fixed_time("2026-03-14T08:00:00Z"));
        assert_eq!(label.label, "Departs");
        assert_eq!(label.time, "10:45 AM");
    }

    #[test]
    fn time_label_renders_unknown_status_distinctly() {
        // Departed 19h ago with no arrival signal: honest unknown, not a
        // fabricated "Departs".
        let mut snapshot = bare_snapshot();
        snapshot.departure_actual = Some("2026-03-14T10:00:00Z".to_string());
        snapshot.departure_scheduled = Some("2026-03-14T10:00:00".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let label = compose_time_label(&reservation, &resolver(), fixed_time("2026-03-15T05:00:00Z"));
        assert_eq!(label.label, "Status Unknown");
    }

    #[test]
    fn time_label_for_active_flight_uses_estimated_arrival() {
        let mut snapshot = bare_snapshot();
        snapshot.departure_actual = Some("2026-03-14T10:00:00Z".to_string());
        snapshot.arrival_estimated = Some("2026-03-14T18:45:00".to_string());
        let reservation = flight_reservation(Some(snapshot));

        let label = compose_time_label(&reservation, &resolver(), fixed_time("2026-03-14T12:00:00Z"));
        assert_eq!(label.label, "Est. Arrival");
        assert_eq!(label.time, "6:45 PM");
    }

    #[test]
    fn time_label_for_hotel_uses_reservation_start() {
        let mut reservation = flight_reservation(None);
        reservation.reservation_type = ReservationType::Hotel;
        reservation.start_at = "2026-03-14T15:00:00".to_string();

        let label = compose_time_label(&reservation, &resolver(), fixed_time("2026-03-14T08:00:00Z"));
        assert_eq!(label.label, "Check-in");
        assert_eq!(label.time, "3:00 PM");
    }

    proptest! {
        // Floor-division rendering: the parts re-assemble to no more than
        // the original minute count and never display a negative value.
        #[test]
        fn format_span_uses_floor_division(minutes in 1i64..(10 * 24 * 60)) {
            let rendered = format_span(minutes);
            prop_assert!(!rendered.contains('-'));
            if minutes >= 24 * 60 {
                prop_assert!(rendered.ends_with('h') && rendered.contains('d'));
            }
        }
    }
}
