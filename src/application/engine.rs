use crate::application::countdown::{compose_countdown, compose_time_label};
use crate::application::date_resolver::{DateResolver, NowProvider, ResolvedInstant};
use crate::application::day_boundary::{is_today, is_tomorrow};
use crate::application::phase::infer_phase;
use crate::application::polling::polling_interval;
use crate::domain::models::{
    CountdownResult, FlightPhase, FlightStatusSnapshot, Reservation, TimeLabel,
};
use crate::infrastructure::airport_zones::builtin_airport_zones;
use chrono::{DateTime, Duration, Local, Offset, Utc};
use std::sync::Arc;

/// Pull-based entry point the rendering layer polls each refresh.
///
/// Bundles the date resolver, the clock and the device-timezone reading so
/// every query sees one consistent "now". All queries are synchronous,
/// side-effect free and safe to call concurrently; nothing is cached
/// across snapshot updates.
pub struct TravelEngine {
    resolver: Arc<DateResolver>,
    now_provider: NowProvider,
    device_offset_minutes: Option<i32>,
}

impl TravelEngine {
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(DateResolver::new(builtin_airport_zones())))
    }

    pub fn with_resolver(resolver: Arc<DateResolver>) -> Self {
        Self {
            resolver,
            now_provider: Arc::new(Utc::now),
            device_offset_minutes: None,
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    /// Pin the device UTC offset instead of reading it from the system
    /// timezone; used by tests and by callers that track it themselves.
    pub fn with_device_offset_minutes(mut self, offset_minutes: i32) -> Self {
        self.device_offset_minutes = Some(offset_minutes);
        self
    }

    pub fn resolver(&self) -> &DateResolver {
        &self.resolver
    }

    pub fn infer_phase(&self, snapshot: &FlightStatusSnapshot) -> FlightPhase {
        infer_phase(snapshot, &self.resolver, self.now())
    }

    pub fn countdown(&self, reservation: &Reservation) -> CountdownResult {
        compose_countdown(reservation, &self.resolver, self.now())
    }

    pub fn time_label(&self, reservation: &Reservation) -> TimeLabel {
        compose_time_label(reservation, &self.resolver, self.now())
    }

    pub fn is_today(&self, reservation: &Reservation) -> bool {
        is_today(
            reservation,
            &self.resolver,
            self.now(),
            self.device_offset(),
        )
    }

    pub fn is_tomorrow(&self, reservation: &Reservation) -> bool {
        is_tomorrow(
            reservation,
            &self.resolver,
            self.now(),
            self.device_offset(),
        )
    }

    /// Refresh cadence for the reservation's live status, or `None` once
    /// polling should stop.
    pub fn polling_interval(&self, reservation: &Reservation) -> Option<Duration> {
        let now = self.now();
        let departure = self
            .resolver
            .resolve_utc(
                &reservation.start_at,
                reservation.start_offset(),
                reservation.start_location_code(),
            )
            .instant();

        let snapshot = reservation.snapshot();
        let phase = snapshot.map(|snapshot| infer_phase(snapshot, &self.resolver, now));
        let arrival = snapshot.and_then(|snapshot| {
            let arrival = snapshot
                .arrival_actual
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())?;
            // The snapshot's own airport wins: the live source already
            // knows where the flight actually ended up.
            let code = snapshot
                .arrival_airport
                .as_deref()
                .or(reservation.details.arrival_airport.as_deref());
            Some(
                self.resolver
                    .resolve_utc(arrival, reservation.details.arrival_offset.as_deref(), code)
                    .instant(),
            )
        });

        polling_interval(now, departure, phase, arrival)
    }

    pub fn resolve_start(&self, reservation: &Reservation) -> ResolvedInstant {
        self.resolver.resolve_utc(
            &reservation.start_at,
            reservation.start_offset(),
            reservation.start_location_code(),
        )
    }

    fn now(&self) -> DateTime<Utc> {
        (self.now_provider)()
    }

    fn device_offset(&self) -> i32 {
        self.device_offset_minutes
            .unwrap_or_else(|| Local::now().offset().fix().local_minus_utc() / 60)
    }
}

impl Default for TravelEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        ReservationDetails, ReservationStatus, ReservationType,
    };

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn engine(now: &str) -> TravelEngine {
        let now = fixed_time(now);
        TravelEngine::new()
            .with_now_provider(Arc::new(move || now))
            .with_device_offset_minutes(-8 * 60)
    }

    fn flight_reservation() -> Reservation {
        Reservation {
            id: "res-1".to_string(),
            trip_id: "trip-1".to_string(),
            reservation_type: ReservationType::Flight,
            start_at: "2026-03-14T10:10:00".to_string(),
            end_at: None,
            details: ReservationDetails {
                departure_airport: Some("SFO".to_string()),
                ..Default::default()
            },
            status: ReservationStatus::Confirmed,
        }
    }

    #[test]
    fn queries_share_one_injected_clock() {
        let engine = engine("2026-03-14T16:50:00Z");
        let reservation = flight_reservation();

        // 10:10 at SFO is 17:10Z (PDT, UTC-7), resolved through the
        // builtin airport table.
        let countdown = engine.countdown(&reservation);
        assert_eq!(countdown.minutes_to_event, 20);
        assert!(countdown.urgent);
        assert_eq!(countdown.action, "Board");

        assert!(engine.is_today(&reservation));
        assert!(!engine.is_tomorrow(&reservation));
    }

    #[test]
    fn polling_interval_tracks_departure_distance() {
        let reservation = flight_reservation();

        let far_out = engine("2026-03-10T17:10:00Z");
        assert_eq!(
            far_out.polling_interval(&reservation),
            Some(Duration::hours(6))
        );

        let close_in = engine("2026-03-14T16:50:00Z");
        assert_eq!(
            close_in.polling_interval(&reservation),
            Some(Duration::minutes(5))
        );
    }

    #[test]
    fn polling_resolves_arrival_in_the_snapshot_airport_zone() {
        // Diverted keeps polling until the two-hours-past-arrival rule
        // kicks in. Arrival actual is Tokyo wall-clock 20:00, i.e. 11:00Z;
        // only the snapshot names the airport, and read as UTC the arrival
        // would still be in the future and polling would continue.
        let mut reservation = flight_reservation();
        reservation.details.flight_status = Some(FlightStatusSnapshot {
            carrier_code: "UA".to_string(),
            flight_number: "837".to_string(),
            departure_airport: Some("SFO".to_string()),
            departure_terminal: None,
            departure_gate: None,
            arrival_airport: Some("NRT".to_string()),
            arrival_terminal: None,
            arrival_gate: None,
            departure_scheduled: None,
            departure_estimated: None,
            departure_actual: None,
            arrival_scheduled: None,
            arrival_estimated: None,
            arrival_actual: Some("2026-03-14T20:00:00".to_string()),
            delay_minutes: None,
            status: Some("diverted".to_string()),
            captured_at: fixed_time("2026-03-14T11:00:00Z"),
        });

        // 2.5h past the resolved arrival: polling stops.
        let engine = engine("2026-03-14T13:30:00Z");
        assert_eq!(engine.polling_interval(&reservation), None);
    }

    #[test]
    fn resolve_start_flags_fallbacks() {
        let engine = engine("2026-03-14T17:50:00Z");

        let mut reservation = flight_reservation();
        assert!(!engine.resolve_start(&reservation).is_fallback());

        reservation.details.departure_airport = None;
        assert!(engine.resolve_start(&reservation).is_fallback());
    }
}
