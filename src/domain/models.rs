use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationType {
    Flight,
    Hotel,
    Car,
    Train,
    Meeting,
    Event,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
    Delayed,
    Cancelled,
    Completed,
}

/// Effective phase of a flight, derived from live-tracking data.
///
/// Never persisted; recomputed from the latest snapshot on every query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlightPhase {
    Scheduled,
    Boarding,
    Active,
    Landed,
    Cancelled,
    Diverted,
    Incident,
    Unknown,
}

impl FlightPhase {
    /// Parse the raw phase label a tracking provider reports. Providers are
    /// inconsistent ("en route", "in air", "arrived", "canceled"), so the
    /// match is deliberately permissive; anything unrecognized is `Unknown`.
    pub fn from_provider_label(label: &str) -> FlightPhase {
        match label.trim().to_ascii_lowercase().as_str() {
            "scheduled" => FlightPhase::Scheduled,
            "boarding" => FlightPhase::Boarding,
            "active" | "en route" | "en-route" | "in air" | "airborne" => FlightPhase::Active,
            "landed" | "arrived" => FlightPhase::Landed,
            "cancelled" | "canceled" => FlightPhase::Cancelled,
            "diverted" => FlightPhase::Diverted,
            "incident" => FlightPhase::Incident,
            _ => FlightPhase::Unknown,
        }
    }

    /// Labels the provider gets to assert directly: once a flight is in one
    /// of these states no timestamp can contradict it.
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            FlightPhase::Landed
                | FlightPhase::Cancelled
                | FlightPhase::Diverted
                | FlightPhase::Incident
        )
    }

    /// States after which live-status polling should stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlightPhase::Landed | FlightPhase::Cancelled | FlightPhase::Incident
        )
    }
}

/// Last known live-tracking result for a flight reservation. Replaced
/// wholesale by the refresh collaborator; read-only to the engine.
///
/// All timestamp fields are strings as received from the provider: either
/// airport-local wall-clock time or wall-clock time with an explicit offset.
/// The date resolver decides which on a per-field basis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightStatusSnapshot {
    pub carrier_code: String,
    pub flight_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_terminal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_gate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_terminal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_gate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_scheduled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_estimated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_scheduled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_estimated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl FlightStatusSnapshot {
    pub fn raw_phase(&self) -> FlightPhase {
        self.status
            .as_deref()
            .map(FlightPhase::from_provider_label)
            .unwrap_or(FlightPhase::Unknown)
    }

    /// Best available arrival time: estimated beats scheduled.
    pub fn best_arrival(&self) -> Option<&str> {
        self.arrival_estimated
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| {
                self.arrival_scheduled
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            })
    }

    /// Best available departure time: estimated beats scheduled.
    pub fn best_departure(&self) -> Option<&str> {
        self.departure_estimated
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| {
                self.departure_scheduled
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.carrier_code, "snapshot.carrier_code")?;
        validate_non_empty(&self.flight_number, "snapshot.flight_number")?;
        Ok(())
    }
}

/// Free-form reservation detail bag. Explicit offsets, when present, are
/// authoritative over any location-code lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_status: Option<FlightStatusSnapshot>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

/// One bookable unit of travel. `start_at`/`end_at` hold wall-clock time at
/// the event's location, not the viewer's timezone; the date resolver owns
/// turning them into UTC instants. Mutated only by the reservation store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    pub id: String,
    pub trip_id: String,
    pub reservation_type: ReservationType,
    pub start_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(default)]
    pub details: ReservationDetails,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "reservation.id")?;
        validate_non_empty(&self.trip_id, "reservation.trip_id")?;
        validate_non_empty(&self.start_at, "reservation.start_at")?;
        for (value, field_name) in [
            (
                &self.details.departure_offset,
                "reservation.details.departure_offset",
            ),
            (
                &self.details.arrival_offset,
                "reservation.details.arrival_offset",
            ),
            (
                &self.details.location_offset,
                "reservation.details.location_offset",
            ),
        ] {
            if let Some(offset) = value {
                validate_offset(offset, field_name)?;
            }
        }
        if let Some(snapshot) = &self.details.flight_status {
            snapshot.validate()?;
        }
        Ok(())
    }

    /// Offset governing the reservation's start: the departure offset for
    /// flights, else the location offset.
    pub fn start_offset(&self) -> Option<&str> {
        self.details
            .departure_offset
            .as_deref()
            .or(self.details.location_offset.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Location code governing the reservation's start, for the airport
    /// timezone fallback.
    pub fn start_location_code(&self) -> Option<&str> {
        self.details
            .departure_airport
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn snapshot(&self) -> Option<&FlightStatusSnapshot> {
        if self.reservation_type != ReservationType::Flight {
            return None;
        }
        self.details.flight_status.as_ref()
    }
}

/// Lead times, in minutes before the start instant, at which local
/// reminders fire for each reservation type. Loaded from config; the
/// defaults mirror what the app ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderPolicy {
    pub flight_lead_minutes: Vec<i64>,
    pub hotel_lead_minutes: Vec<i64>,
    pub car_lead_minutes: Vec<i64>,
    pub train_lead_minutes: Vec<i64>,
    pub meeting_lead_minutes: Vec<i64>,
    pub event_lead_minutes: Vec<i64>,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            flight_lead_minutes: vec![24 * 60, 3 * 60],
            hotel_lead_minutes: vec![24 * 60],
            car_lead_minutes: vec![3 * 60],
            train_lead_minutes: vec![3 * 60],
            meeting_lead_minutes: vec![60],
            event_lead_minutes: vec![60],
        }
    }
}

impl ReminderPolicy {
    pub fn lead_minutes_for(&self, reservation_type: ReservationType) -> &[i64] {
        match reservation_type {
            ReservationType::Flight => &self.flight_lead_minutes,
            ReservationType::Hotel => &self.hotel_lead_minutes,
            ReservationType::Car => &self.car_lead_minutes,
            ReservationType::Train => &self.train_lead_minutes,
            ReservationType::Meeting => &self.meeting_lead_minutes,
            ReservationType::Event => &self.event_lead_minutes,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (leads, field_name) in [
            (&self.flight_lead_minutes, "policy.flight_lead_minutes"),
            (&self.hotel_lead_minutes, "policy.hotel_lead_minutes"),
            (&self.car_lead_minutes, "policy.car_lead_minutes"),
            (&self.train_lead_minutes, "policy.train_lead_minutes"),
            (&self.meeting_lead_minutes, "policy.meeting_lead_minutes"),
            (&self.event_lead_minutes, "policy.event_lead_minutes"),
        ] {
            if leads.iter().any(|minutes| *minutes <= 0) {
                return Err(format!("{field_name} entries must be > 0"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountdownColor {
    Green,
    Blue,
    Red,
    Amber,
    Neutral,
}

/// Derived countdown state for one reservation. Recomputed on demand;
/// callers poll it every render tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountdownResult {
    pub display: String,
    pub action: String,
    pub urgent: bool,
    pub minutes_to_event: i64,
    pub color: CountdownColor,
}

/// Contextual time label, e.g. label "Departs", time "10:10 AM".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeLabel {
    pub label: String,
    pub time: String,
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_offset(value: &str, field_name: &str) -> Result<(), String> {
    let trimmed = value.trim();
    let Some(rest) = trimmed.strip_prefix('+').or_else(|| trimmed.strip_prefix('-')) else {
        return Err(format!("{field_name} must be signed HH:MM"));
    };
    let mut split = rest.split(':');
    let (Some(hour_str), Some(minute_str), None) = (split.next(), split.next(), split.next())
    else {
        return Err(format!("{field_name} must be signed HH:MM"));
    };
    let hour = hour_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be signed HH:MM"))?;
    let minute = minute_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be signed HH:MM"))?;
    if hour > 14 || minute > 59 {
        return Err(format!("{field_name} must be signed HH:MM"));
    }
    Ok(())
}
